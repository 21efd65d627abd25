use crate::rule::{Alert, AlertRule, Thresholds};
use plant_types::{ReadingStatus, SensorKind, SensorSnapshot};
use tracing::{debug, info};

/// 告警评估器
///
/// 无状态：同一快照总是得到同样的告警列表，去重交给冷却期处理。
pub struct AlertEvaluator {
    rules: Vec<Box<dyn AlertRule>>,
}

impl AlertEvaluator {
    pub fn new(thresholds: Thresholds) -> Self {
        let mut evaluator = Self { rules: Vec::new() };
        for rule in thresholds.rules() {
            evaluator.add_rule(Box::new(rule));
        }
        evaluator
    }

    pub fn add_rule(&mut self, rule: Box<dyn AlertRule>) {
        debug!("Adding alert rule: {}", rule.alert_type());
        self.rules.push(rule);
    }

    /// 读数分类，没有规则命中即为 OK
    pub fn classify(&self, kind: SensorKind, value: f64) -> ReadingStatus {
        self.rules
            .iter()
            .filter(|rule| rule.kind() == kind)
            .find(|rule| rule.evaluate(value))
            .map(|rule| rule.status())
            .unwrap_or(ReadingStatus::Ok)
    }

    /// 评估一次快照中所有已有读数
    pub fn evaluate(&self, snapshot: &SensorSnapshot) -> Vec<Alert> {
        let mut alerts = Vec::new();

        for rule in &self.rules {
            let Some(value) = snapshot.get(rule.kind()) else {
                continue;
            };

            if rule.evaluate(value) {
                let alert = Alert {
                    alert_type: rule.alert_type().to_string(),
                    kind: rule.kind(),
                    severity: rule.severity(),
                    value,
                    threshold: rule.threshold(),
                    message: rule.message(value),
                    fired_at: snapshot.timestamp,
                };
                info!(alert_type = %alert.alert_type, "Threshold violated: {}", alert.message);
                alerts.push(alert);
            }
        }

        alerts
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
