use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, error, info, trace, warn};

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::ERROR => LogLevel::Error,
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "critical" => Ok(LogLevel::Error),
            other => Err(format!("Unknown log level: {}", other)),
        }
    }
}

/// 记录一次传感器读数
///
/// 输出格式：`SENSOR_READING - MOISTURE: 42.0% - Status: OK`
pub fn log_sensor_reading(sensor_type: &str, value: impl Display, status: impl Display) {
    let sensor_type = sensor_type.to_uppercase();
    info!(
        sensor = %sensor_type,
        value = %value,
        status = %status,
        "SENSOR_READING - {}: {} - Status: {}",
        sensor_type,
        value,
        status
    );
}

/// 记录告警事件（不发送邮件）
pub fn log_alert(alert_type: &str, message: impl Display, level: LogLevel) {
    match level {
        LogLevel::Trace => trace!(alert_type, "ALERT - {}: {}", alert_type, message),
        LogLevel::Debug => debug!(alert_type, "ALERT - {}: {}", alert_type, message),
        LogLevel::Info => info!(alert_type, "ALERT - {}: {}", alert_type, message),
        LogLevel::Warn => warn!(alert_type, "ALERT - {}: {}", alert_type, message),
        LogLevel::Error => error!(alert_type, "ALERT - {}: {}", alert_type, message),
    }
}

/// 记录主机健康指标
pub fn log_system_status(cpu_temp: Option<f64>, memory_usage: f64, disk_usage: f64) {
    let cpu = cpu_temp
        .map(|t| format!("{:.1}C", t))
        .unwrap_or_else(|| "n/a".to_string());
    debug!(
        cpu_temp = ?cpu_temp,
        memory_usage,
        disk_usage,
        "SYSTEM_STATUS - CPU: {}, Memory: {:.1}%, Disk: {:.1}%",
        cpu,
        memory_usage,
        disk_usage
    );
}
