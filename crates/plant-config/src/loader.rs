use anyhow::{anyhow, Result};
use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

use crate::{AppConfig, ReportTime};

const DEFAULT_ENV_PREFIX: &str = "PLANT";

/// 可接受的日志级别，不区分大小写
const LOG_LEVELS: [&str; 7] = [
    "trace", "debug", "info", "warn", "warning", "error", "critical",
];

/// 冷却期上限：一年
pub const MAX_ALERT_COOLDOWN_SECS: u64 = 365 * 24 * 3600;

/// 数据保留上限：一百年
pub const MAX_DATA_DAYS: u32 = 36_500;

/// 配置加载器
///
/// 先读取 TOML 文件（可不存在），再用 `PLANT__<SECTION>__<KEY>` 环境变量覆盖。
pub struct ConfigLoader {
    config_path: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// 加载配置
    pub fn load(&self) -> Result<AppConfig> {
        let path = self
            .config_path
            .to_str()
            .ok_or_else(|| anyhow!("Invalid config path"))?;

        let config = Config::builder()
            .add_source(File::new(path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// 加载并验证
    pub fn load_validated(&self) -> Result<AppConfig> {
        let config = self.load()?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<()> {
        let sensor = &config.sensor;
        if sensor.calibration_readings == 0 {
            return Err(anyhow!("calibration_readings must be greater than 0"));
        }
        if sensor.collection_interval_secs == 0 {
            return Err(anyhow!("collection_interval_secs must be greater than 0"));
        }

        let thresholds = &config.thresholds;
        if thresholds.moisture_low >= thresholds.moisture_high {
            return Err(anyhow!(
                "moisture_low ({}) must be less than moisture_high ({})",
                thresholds.moisture_low,
                thresholds.moisture_high
            ));
        }

        config.email.daily_report_time.parse::<ReportTime>()?;
        config.data.cleanup_time.parse::<ReportTime>()?;

        let email = &config.email;
        if email.enabled {
            if email.smtp_server.is_empty() {
                return Err(anyhow!("email.smtp_server is required when email is enabled"));
            }
            if email.sender_email.is_empty() || email.receiver_email.is_empty() {
                return Err(anyhow!(
                    "email.sender_email and email.receiver_email are required when email is enabled"
                ));
            }
        }

        if email.alert_cooldown_secs > MAX_ALERT_COOLDOWN_SECS {
            return Err(anyhow!(
                "email.alert_cooldown_secs must be at most {}",
                MAX_ALERT_COOLDOWN_SECS
            ));
        }

        if config.data.max_data_days > MAX_DATA_DAYS {
            return Err(anyhow!(
                "data.max_data_days must be at most {}",
                MAX_DATA_DAYS
            ));
        }

        let level = config.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(anyhow!(
                "logging.level '{}' is not one of DEBUG, INFO, WARNING, ERROR, CRITICAL",
                config.logging.level
            ));
        }

        if config.system.check_interval_secs == 0 {
            return Err(anyhow!("system.check_interval_secs must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SensorDriver;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_defaults_when_missing() {
        let temp_dir = tempdir().unwrap();
        let loader = ConfigLoader::new(temp_dir.path().join("missing.toml"))
            .with_env_prefix("PLANT_TEST_MISSING");

        let config = loader.load().unwrap();
        assert_eq!(config.sensor.collection_interval_secs, 300);
        assert_eq!(config.email.smtp_port, 465);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("plant-monitor.toml");
        fs::write(
            &path,
            r#"
[sensor]
driver = "simulated"
collection_interval_secs = 60

[email]
enabled = false
alert_cooldown_secs = 120

[data]
max_data_days = 7
"#,
        )
        .unwrap();

        let loader = ConfigLoader::new(&path).with_env_prefix("PLANT_TEST_FILE");
        let config = loader.load_validated().unwrap();

        assert_eq!(config.sensor.driver, SensorDriver::Simulated);
        assert_eq!(config.sensor.collection_interval_secs, 60);
        assert!(!config.email.enabled);
        assert_eq!(config.email.alert_cooldown_secs, 120);
        assert_eq!(config.data.max_data_days, 7);
        assert_eq!(config.thresholds.moisture_high, 80.0);
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("PLANT_TEST_ENV__EMAIL__SENDER_PASSWORD", "secret");
        std::env::set_var("PLANT_TEST_ENV__SENSOR__CALIBRATION_READINGS", "3");

        let temp_dir = tempdir().unwrap();
        let loader = ConfigLoader::new(temp_dir.path().join("none.toml"))
            .with_env_prefix("PLANT_TEST_ENV");
        let config = loader.load().unwrap();

        assert_eq!(config.email.sender_password, "secret");
        assert_eq!(config.sensor.calibration_readings, 3);

        std::env::remove_var("PLANT_TEST_ENV__EMAIL__SENDER_PASSWORD");
        std::env::remove_var("PLANT_TEST_ENV__SENSOR__CALIBRATION_READINGS");
    }

    #[test]
    fn test_validate_config() {
        let mut config = AppConfig::default();
        config.email.enabled = false;
        assert!(ConfigLoader::validate(&config).is_ok());

        config.thresholds.moisture_low = 90.0;
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.email.enabled = false;
        config.sensor.calibration_readings = 0;
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.email.enabled = false;
        config.email.daily_report_time = "25:00".to_string();
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_logging_level() {
        let mut config = AppConfig::default();
        config.email.enabled = false;

        for level in ["WARNING", "critical", "Info", "DEBUG"] {
            config.logging.level = level.to_string();
            assert!(ConfigLoader::validate(&config).is_ok(), "{}", level);
        }

        config.logging.level = "loud".to_string();
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_upper_bounds() {
        let mut config = AppConfig::default();
        config.email.enabled = false;
        config.email.alert_cooldown_secs = u64::MAX / 2;
        assert!(ConfigLoader::validate(&config).is_err());

        let mut config = AppConfig::default();
        config.email.enabled = false;
        config.data.max_data_days = u32::MAX;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_validate_email_addresses() {
        let mut config = AppConfig::default();
        assert!(ConfigLoader::validate(&config).is_err());

        config.email.sender_email = "monitor@example.com".to_string();
        config.email.receiver_email = "alerts@example.com".to_string();
        assert!(ConfigLoader::validate(&config).is_ok());
    }
}
