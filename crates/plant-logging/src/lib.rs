pub mod events;
pub mod init;
pub mod rotation;

pub use events::{log_alert, log_sensor_reading, log_system_status, LogLevel};
pub use init::{build_subscriber, init_logging, level_filter, LoggingError};
pub use rotation::RotatingFileWriter;
