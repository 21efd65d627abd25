//! 植物监控服务
//!
//! 定时读取传感器、写入 CSV、检查阈值并发送邮件告警，每天发送一次日报。

pub mod app;
pub mod collector;
pub mod health;
pub mod shutdown;

pub use app::App;
pub use collector::{CollectionLoop, CycleReport};
pub use health::{HealthStatus, SystemHealth};
pub use shutdown::{ShutdownHandle, ShutdownSignal};
