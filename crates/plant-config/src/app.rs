use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// 应用配置
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub sensor: SensorConfig,
    pub thresholds: ThresholdConfig,
    pub email: EmailConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
    pub system: SystemConfig,
}

/// 传感器驱动
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorDriver {
    /// GPIO 字符设备 + IIO
    #[serde(alias = "sysfs")]
    Linux,
    /// 模拟数据，用于没有硬件的开发机
    Simulated,
}

/// DHT 传感器型号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum DhtType {
    #[serde(rename = "DHT11")]
    Dht11,
    #[serde(rename = "DHT22")]
    Dht22,
}

impl DhtType {
    /// 温度量程（°C）
    pub fn temperature_range(&self) -> RangeInclusive<f64> {
        match self {
            DhtType::Dht11 => 0.0..=50.0,
            DhtType::Dht22 => -40.0..=80.0,
        }
    }

    /// 相对湿度量程（%）
    pub fn humidity_range(&self) -> RangeInclusive<f64> {
        match self {
            DhtType::Dht11 => 20.0..=90.0,
            DhtType::Dht22 => 0.0..=100.0,
        }
    }
}

/// 传感器配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SensorConfig {
    pub driver: SensorDriver,

    /// 土壤湿度传感器所在的 GPIO 线（BCM 编号即 gpiochip0 的 offset）
    pub moisture_pin: u32,
    /// GPIO 字符设备
    pub gpio_chip: PathBuf,
    /// 决定温湿度的有效量程；数据线由设备树 overlay 交给内核 dht11 驱动
    pub dht_type: DhtType,

    /// DHT 对应的 IIO 设备目录
    pub dht_iio_device: PathBuf,
    /// BH1750 对应的 IIO 设备目录
    pub light_iio_device: PathBuf,

    /// 采集间隔（秒）
    pub collection_interval_secs: u64,
    /// 每次土壤湿度读数的采样次数
    pub calibration_readings: u32,
    /// 采样间隔（毫秒）
    pub calibration_delay_ms: u64,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            driver: SensorDriver::Linux,
            moisture_pin: 17,
            gpio_chip: PathBuf::from("/dev/gpiochip0"),
            dht_type: DhtType::Dht22,
            dht_iio_device: PathBuf::from("/sys/bus/iio/devices/iio:device0"),
            light_iio_device: PathBuf::from("/sys/bus/iio/devices/iio:device1"),
            collection_interval_secs: 300,
            calibration_readings: 5,
            calibration_delay_ms: 100,
        }
    }
}

/// 告警阈值
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub moisture_low: f64,
    pub moisture_high: f64,
    pub temperature_high: f64,
    pub humidity_low: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            moisture_low: 30.0,
            moisture_high: 80.0,
            temperature_high: 35.0,
            humidity_low: 40.0,
        }
    }
}

/// 邮件配置
///
/// 密码一般通过环境变量 `PLANT__EMAIL__SENDER_PASSWORD` 提供。
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
    pub receiver_email: String,
    /// 同类告警最小间隔（秒）
    pub alert_cooldown_secs: u64,
    /// 日报发送时间，本地时间 HH:MM
    pub daily_report_time: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_server: "smtp.163.com".to_string(),
            smtp_port: 465,
            sender_email: String::new(),
            sender_password: String::new(),
            receiver_email: String::new(),
            alert_cooldown_secs: 3600,
            daily_report_time: "08:00".to_string(),
        }
    }
}

/// 数据文件配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    pub raw_data_file: PathBuf,
    /// 数据保留天数
    pub max_data_days: u32,
    /// 清理前是否备份
    pub backup_enabled: bool,
    /// 每日清理时间，本地时间 HH:MM
    pub cleanup_time: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_data_file: PathBuf::from("data/sensor_data.csv"),
            max_data_days: 30,
            backup_enabled: true,
            cleanup_time: "02:00".to_string(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: PathBuf,
    pub file_prefix: String,
    pub console_output: bool,
    /// 单个日志文件上限（字节）
    pub max_file_size: u64,
    pub backup_count: u32,
    /// 文件日志使用 JSON 格式
    pub json: bool,
}

impl LoggingConfig {
    /// 按月分文件：`logs/monitor_202401.log`
    pub fn file_path(&self, now: DateTime<Local>) -> PathBuf {
        self.directory
            .join(format!("{}_{}.log", self.file_prefix, now.format("%Y%m")))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: PathBuf::from("logs"),
            file_prefix: "monitor".to_string(),
            console_output: true,
            max_file_size: 10 * 1024 * 1024,
            backup_count: 5,
            json: false,
        }
    }
}

/// 主机健康检查配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SystemConfig {
    pub cpu_temp_warning: f64,
    /// 内存使用率告警（百分比）
    pub memory_warning: f64,
    pub check_interval_secs: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            cpu_temp_warning: 70.0,
            memory_warning: 85.0,
            check_interval_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.sensor.collection_interval_secs, 300);
        assert_eq!(config.sensor.calibration_readings, 5);
        assert_eq!(config.thresholds.moisture_low, 30.0);
        assert_eq!(config.email.alert_cooldown_secs, 3600);
        assert_eq!(config.email.daily_report_time, "08:00");
        assert_eq!(config.data.max_data_days, 30);
        assert_eq!(config.system.memory_warning, 85.0);
    }

    #[test]
    fn test_log_file_path() {
        let config = LoggingConfig::default();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(
            config.file_path(now),
            PathBuf::from("logs").join("monitor_202403.log")
        );
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
[sensor]
driver = "simulated"
dht_type = "DHT11"

[thresholds]
temperature_high = 30.0
"#,
        )
        .unwrap();

        assert_eq!(config.sensor.driver, SensorDriver::Simulated);
        assert_eq!(config.sensor.dht_type, DhtType::Dht11);
        assert_eq!(config.sensor.moisture_pin, 17);
        assert_eq!(config.thresholds.temperature_high, 30.0);
        assert_eq!(config.thresholds.humidity_low, 40.0);
    }

    #[test]
    fn test_sysfs_driver_alias() {
        let config: AppConfig = toml::from_str(
            r#"
[sensor]
driver = "sysfs"
"#,
        )
        .unwrap();
        assert_eq!(config.sensor.driver, SensorDriver::Linux);
        assert_eq!(config.sensor.gpio_chip, PathBuf::from("/dev/gpiochip0"));
    }

    #[test]
    fn test_dht_ranges() {
        assert!(DhtType::Dht11.temperature_range().contains(&25.0));
        assert!(!DhtType::Dht11.temperature_range().contains(&-5.0));
        assert!(DhtType::Dht22.temperature_range().contains(&-5.0));
        assert!(!DhtType::Dht11.humidity_range().contains(&95.0));
        assert!(DhtType::Dht22.humidity_range().contains(&95.0));
    }
}
