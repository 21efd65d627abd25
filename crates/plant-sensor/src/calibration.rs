use plant_config::SensorConfig;
use std::time::Duration;

/// 土壤湿度校准：多次采样取平均
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoistureCalibration {
    /// 每次读数的采样次数，至少为 1
    pub readings: u32,
    /// 两次采样之间的间隔
    pub sample_delay: Duration,
}

impl MoistureCalibration {
    pub fn new(readings: u32, sample_delay: Duration) -> Self {
        Self {
            readings: readings.max(1),
            sample_delay,
        }
    }

    /// 数字电平转换为百分比：干燥 0%，湿润 100%
    #[inline]
    pub fn to_percent(level: bool) -> f64 {
        (1.0 - f64::from(u8::from(level))) * 100.0
    }

    /// 算术平均，空输入返回 None
    pub fn average(samples: &[f64]) -> Option<f64> {
        if samples.is_empty() {
            return None;
        }
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

impl Default for MoistureCalibration {
    fn default() -> Self {
        Self::from(&SensorConfig::default())
    }
}

impl From<&SensorConfig> for MoistureCalibration {
    fn from(config: &SensorConfig) -> Self {
        Self::new(
            config.calibration_readings,
            Duration::from_millis(config.calibration_delay_ms),
        )
    }
}
