use chrono::{DateTime, Local};
use plant_config::ThresholdConfig;
use plant_types::{ReadingStatus, SensorKind};
use serde::{Deserialize, Serialize};

/// 告警级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// 告警实例
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// 告警类型，也是冷却期的键，例如 `MOISTURE_LOW`
    pub alert_type: String,
    pub kind: SensorKind,
    pub severity: AlertSeverity,
    pub value: f64,
    pub threshold: f64,
    pub message: String,
    pub fired_at: DateTime<Local>,
}

/// 告警规则
pub trait AlertRule: Send + Sync {
    fn alert_type(&self) -> &str;
    fn kind(&self) -> SensorKind;
    fn severity(&self) -> AlertSeverity;
    fn threshold(&self) -> f64;
    fn evaluate(&self, value: f64) -> bool;
    /// 规则命中时对应的读数状态
    fn status(&self) -> ReadingStatus;
    fn message(&self, value: f64) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterThan,
    LessThan,
}

/// 阈值告警规则
#[derive(Debug, Clone)]
pub struct ThresholdRule {
    alert_type: String,
    kind: SensorKind,
    severity: AlertSeverity,
    threshold: f64,
    comparison: Comparison,
}

impl ThresholdRule {
    pub fn new(
        alert_type: impl Into<String>,
        kind: SensorKind,
        severity: AlertSeverity,
        threshold: f64,
        comparison: Comparison,
    ) -> Self {
        Self {
            alert_type: alert_type.into(),
            kind,
            severity,
            threshold,
            comparison,
        }
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }
}

impl AlertRule for ThresholdRule {
    fn alert_type(&self) -> &str {
        &self.alert_type
    }

    fn kind(&self) -> SensorKind {
        self.kind
    }

    fn severity(&self) -> AlertSeverity {
        self.severity
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn evaluate(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::GreaterThan => value > self.threshold,
            Comparison::LessThan => value < self.threshold,
        }
    }

    fn status(&self) -> ReadingStatus {
        match self.comparison {
            Comparison::GreaterThan => ReadingStatus::High,
            Comparison::LessThan => ReadingStatus::Low,
        }
    }

    fn message(&self, value: f64) -> String {
        let direction = match self.comparison {
            Comparison::GreaterThan => "above",
            Comparison::LessThan => "below",
        };
        format!(
            "{} is {}, {} threshold {}",
            capitalize(self.kind.name()),
            self.kind.format_value(value),
            direction,
            self.kind.format_value(self.threshold)
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 静态阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub moisture_low: f64,
    pub moisture_high: f64,
    pub temperature_high: f64,
    pub humidity_low: f64,
}

impl Thresholds {
    /// 由阈值生成规则集
    pub fn rules(&self) -> Vec<ThresholdRule> {
        vec![
            ThresholdRule::new(
                "MOISTURE_LOW",
                SensorKind::Moisture,
                AlertSeverity::Warning,
                self.moisture_low,
                Comparison::LessThan,
            ),
            ThresholdRule::new(
                "MOISTURE_HIGH",
                SensorKind::Moisture,
                AlertSeverity::Warning,
                self.moisture_high,
                Comparison::GreaterThan,
            ),
            ThresholdRule::new(
                "TEMPERATURE_HIGH",
                SensorKind::Temperature,
                AlertSeverity::Critical,
                self.temperature_high,
                Comparison::GreaterThan,
            ),
            ThresholdRule::new(
                "HUMIDITY_LOW",
                SensorKind::Humidity,
                AlertSeverity::Warning,
                self.humidity_low,
                Comparison::LessThan,
            ),
        ]
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from(&ThresholdConfig::default())
    }
}

impl From<&ThresholdConfig> for Thresholds {
    fn from(config: &ThresholdConfig) -> Self {
        Self {
            moisture_low: config.moisture_low,
            moisture_high: config.moisture_high,
            temperature_high: config.temperature_high,
            humidity_low: config.humidity_low,
        }
    }
}
