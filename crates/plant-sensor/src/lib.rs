//! 传感器读取
//!
//! 硬件访问通过 [`ports`] 中的 trait 抽象，[`adapters`] 提供 GPIO 字符设备、IIO
//! 与模拟实现，[`SensorManager`] 负责初始化、多次采样平均和日志。

pub mod adapters;
pub mod calibration;
pub mod error;
pub mod manager;
pub mod ports;

pub use calibration::MoistureCalibration;
pub use error::{Result, SensorError};
pub use manager::{SensorManager, SensorProbes};
pub use ports::{ClimateProbe, ClimateSample, LightProbe, MoistureProbe};
