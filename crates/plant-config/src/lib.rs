pub mod app;
pub mod loader;
pub mod schedule;

pub use app::{
    AppConfig, DataConfig, DhtType, EmailConfig, LoggingConfig, SensorConfig, SensorDriver,
    SystemConfig, ThresholdConfig,
};
pub use loader::{ConfigLoader, MAX_ALERT_COOLDOWN_SECS, MAX_DATA_DAYS};
pub use schedule::ReportTime;
