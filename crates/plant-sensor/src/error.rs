use std::path::PathBuf;
use thiserror::Error;

/// 传感器错误类型
#[derive(Error, Debug)]
pub enum SensorError {
    /// 传感器未初始化
    #[error("Sensor not initialized: {0}")]
    NotInitialized(String),

    /// 读取失败
    #[error("Failed to read sensor: {0}")]
    ReadFailed(String),

    /// 数据无效
    #[error("Invalid sensor data: {0}")]
    InvalidData(String),

    /// GPIO 字符设备操作失败
    #[error("GPIO error: {0}")]
    Gpio(#[from] gpio_cdev::Error),

    /// 设备文件访问失败
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SensorError>;

impl SensorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SensorError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn read_failed(msg: impl Into<String>) -> Self {
        SensorError::ReadFailed(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        SensorError::InvalidData(msg.into())
    }
}
