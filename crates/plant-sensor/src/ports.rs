//! 硬件端口
//!
//! 管理器只依赖这些 trait，不关心具体是 GPIO 字符设备、IIO 还是模拟数据。

use crate::error::Result;
use async_trait::async_trait;

/// 土壤湿度探头（FC-28 数字输出）
#[async_trait]
pub trait MoistureProbe: Send {
    async fn init(&mut self) -> Result<()>;

    /// 读取数字电平，`true` 表示干燥
    async fn read_level(&mut self) -> Result<bool>;

    /// 释放硬件资源
    async fn release(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// 一次温湿度读数，两个字段可能单独缺失
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimateSample {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// 温湿度传感器（DHT11/DHT22）
#[async_trait]
pub trait ClimateProbe: Send {
    async fn init(&mut self) -> Result<()>;

    async fn read(&mut self) -> Result<ClimateSample>;

    fn name(&self) -> &str;
}

/// 光照传感器（BH1750）
#[async_trait]
pub trait LightProbe: Send {
    async fn init(&mut self) -> Result<()>;

    async fn read_lux(&mut self) -> Result<f64>;

    fn name(&self) -> &str;
}
