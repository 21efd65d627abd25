use crate::sensor::{SensorKind, SensorSnapshot};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个传感器在统计窗口内的统计值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl SensorStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = values.iter().sum::<f64>() / values.len() as f64;

        Some(Self {
            count: values.len(),
            min,
            max,
            avg,
        })
    }
}

/// 日报数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub window_start: DateTime<Local>,
    pub window_end: DateTime<Local>,
    pub samples: usize,
    pub stats: BTreeMap<SensorKind, SensorStats>,
    /// 告警类型 -> 触发次数
    pub alert_counts: BTreeMap<String, u32>,
}

impl DailySummary {
    pub fn from_snapshots(
        window_start: DateTime<Local>,
        window_end: DateTime<Local>,
        snapshots: &[SensorSnapshot],
        alert_counts: BTreeMap<String, u32>,
    ) -> Self {
        let mut stats = BTreeMap::new();
        for kind in SensorKind::ALL {
            let values: Vec<f64> = snapshots.iter().filter_map(|s| s.get(kind)).collect();
            if let Some(s) = SensorStats::from_values(&values) {
                stats.insert(kind, s);
            }
        }

        Self {
            window_start,
            window_end,
            samples: snapshots.len(),
            stats,
            alert_counts,
        }
    }

    pub fn total_alerts(&self) -> u32 {
        self.alert_counts.values().sum()
    }

    /// 窗口内没有任何数据的传感器
    pub fn silent_sensors(&self) -> Vec<SensorKind> {
        SensorKind::ALL
            .into_iter()
            .filter(|k| !self.stats.contains_key(k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_stats_from_values() {
        let stats = SensorStats::from_values(&[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        assert!((stats.avg - 20.0).abs() < 1e-9);

        assert!(SensorStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_summary_from_snapshots() {
        let end = Local::now();
        let start = end - Duration::hours(24);
        let snapshots = vec![
            SensorSnapshot::new(end).with(SensorKind::Moisture, 40.0),
            SensorSnapshot::new(end)
                .with(SensorKind::Moisture, 60.0)
                .with(SensorKind::Temperature, 22.0),
        ];
        let mut alerts = BTreeMap::new();
        alerts.insert("MOISTURE_LOW".to_string(), 2);

        let summary = DailySummary::from_snapshots(start, end, &snapshots, alerts);

        assert_eq!(summary.samples, 2);
        assert_eq!(summary.stats[&SensorKind::Moisture].avg, 50.0);
        assert_eq!(summary.stats[&SensorKind::Temperature].count, 1);
        assert_eq!(summary.total_alerts(), 2);
        assert_eq!(
            summary.silent_sensors(),
            vec![SensorKind::Humidity, SensorKind::Light]
        );
    }
}
