use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 传感器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// 土壤湿度
    Moisture,
    /// 温度
    Temperature,
    /// 空气湿度
    Humidity,
    /// 光照
    Light,
}

impl SensorKind {
    /// CSV 列顺序
    pub const ALL: [SensorKind; 4] = [
        SensorKind::Moisture,
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::Light,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SensorKind::Moisture => "moisture",
            SensorKind::Temperature => "temperature",
            SensorKind::Humidity => "humidity",
            SensorKind::Light => "light",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Moisture | SensorKind::Humidity => "%",
            SensorKind::Temperature => "C",
            SensorKind::Light => " lux",
        }
    }

    /// 带单位的显示值，例如 `42.0%`
    pub fn format_value(&self, value: f64) -> String {
        format!("{:.1}{}", value, self.unit())
    }

    fn index(&self) -> usize {
        match self {
            SensorKind::Moisture => 0,
            SensorKind::Temperature => 1,
            SensorKind::Humidity => 2,
            SensorKind::Light => 3,
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 读数状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingStatus {
    Ok,
    Low,
    High,
}

impl ReadingStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ReadingStatus::Ok)
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReadingStatus::Ok => "OK",
            ReadingStatus::Low => "LOW",
            ReadingStatus::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// 一次采集周期的全部读数
///
/// 缺失的值表示传感器不可用或读取失败。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub timestamp: DateTime<Local>,
    values: [Option<f64>; 4],
}

impl SensorSnapshot {
    pub fn new(timestamp: DateTime<Local>) -> Self {
        Self {
            timestamp,
            values: [None; 4],
        }
    }

    pub fn now() -> Self {
        Self::new(Local::now())
    }

    pub fn with(mut self, kind: SensorKind, value: f64) -> Self {
        self.set(kind, Some(value));
        self
    }

    pub fn get(&self, kind: SensorKind) -> Option<f64> {
        self.values[kind.index()]
    }

    pub fn set(&mut self, kind: SensorKind, value: Option<f64>) {
        self.values[kind.index()] = value;
    }

    /// 已有读数，按 `SensorKind::ALL` 顺序
    pub fn present(&self) -> impl Iterator<Item = (SensorKind, f64)> + '_ {
        SensorKind::ALL
            .iter()
            .filter_map(move |kind| self.get(*kind).map(|v| (*kind, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}
