//! Linux IIO 适配器
//!
//! DHT 和 BH1750 由内核驱动（dht11、bh1750）暴露为 IIO 设备，这里只读取属性文件。

use crate::error::{Result, SensorError};
use crate::ports::{ClimateProbe, ClimateSample, LightProbe};
use async_trait::async_trait;
use plant_config::DhtType;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

async fn read_attr(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map(|s| s.trim().to_string())
        .map_err(|e| SensorError::io(path, e))
}

async fn read_number(path: &Path) -> Result<f64> {
    let raw = read_attr(path).await?;
    raw.parse::<f64>()
        .map_err(|_| SensorError::invalid_data(format!("{}: '{}'", path.display(), raw)))
}

/// IIO 温湿度传感器（内核 dht11 驱动，同时支持 DHT11/DHT22）
///
/// 超出型号量程的值按读取失败处理。
pub struct IioClimateSensor {
    device_dir: PathBuf,
    dht_type: DhtType,
}

impl IioClimateSensor {
    pub fn new(device_dir: impl Into<PathBuf>, dht_type: DhtType) -> Self {
        Self {
            device_dir: device_dir.into(),
            dht_type,
        }
    }
}

fn within(value: Result<f64>, range: RangeInclusive<f64>, what: &str) -> Result<f64> {
    let value = value?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(SensorError::invalid_data(format!(
            "{} {} outside {:?}",
            what, value, range
        )))
    }
}

#[async_trait]
impl ClimateProbe for IioClimateSensor {
    async fn init(&mut self) -> Result<()> {
        if !self.device_dir.is_dir() {
            return Err(SensorError::NotInitialized(format!(
                "IIO device {} not found",
                self.device_dir.display()
            )));
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<ClimateSample> {
        // 单位是千分之一摄氏度 / 千分之一百分比
        let temperature = read_number(&self.device_dir.join("in_temp_input"))
            .await
            .map(|v| v / 1000.0);
        let humidity = read_number(&self.device_dir.join("in_humidityrelative_input"))
            .await
            .map(|v| v / 1000.0);
        let temperature = within(temperature, self.dht_type.temperature_range(), "temperature");
        let humidity = within(humidity, self.dht_type.humidity_range(), "humidity");

        match (temperature, humidity) {
            (Err(e), Err(_)) => Err(e),
            (temperature, humidity) => {
                if let Err(e) = &temperature {
                    warn!(error = %e, "DHT temperature unavailable");
                }
                if let Err(e) = &humidity {
                    warn!(error = %e, "DHT humidity unavailable");
                }
                Ok(ClimateSample {
                    temperature: temperature.ok(),
                    humidity: humidity.ok(),
                })
            }
        }
    }

    fn name(&self) -> &str {
        "iio-dht"
    }
}

/// IIO 光照传感器（内核 bh1750 驱动）
pub struct IioLightSensor {
    device_dir: PathBuf,
}

impl IioLightSensor {
    pub fn new(device_dir: impl Into<PathBuf>) -> Self {
        Self {
            device_dir: device_dir.into(),
        }
    }
}

#[async_trait]
impl LightProbe for IioLightSensor {
    async fn init(&mut self) -> Result<()> {
        if !self.device_dir.is_dir() {
            return Err(SensorError::NotInitialized(format!(
                "IIO device {} not found",
                self.device_dir.display()
            )));
        }
        Ok(())
    }

    async fn read_lux(&mut self) -> Result<f64> {
        let input = self.device_dir.join("in_illuminance_input");
        if input.exists() {
            return read_number(&input).await;
        }

        let raw = read_number(&self.device_dir.join("in_illuminance_raw")).await?;
        let scale_path = self.device_dir.join("in_illuminance_scale");
        let scale = if scale_path.exists() {
            read_number(&scale_path).await?
        } else {
            1.0
        };
        Ok(raw * scale)
    }

    fn name(&self) -> &str {
        "iio-bh1750"
    }
}
