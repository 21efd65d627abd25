//! 模拟传感器
//!
//! 没有硬件的开发机使用随机数据；测试使用预设脚本，`None` 表示该次读取失败。

use crate::error::{Result, SensorError};
use crate::ports::{ClimateProbe, ClimateSample, LightProbe, MoistureProbe};
use async_trait::async_trait;
use rand::Rng;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 数据来源
enum Source<T> {
    /// 循环播放的脚本
    Scripted { values: VecDeque<Option<T>> },
    Random,
}

impl<T: Clone> Source<T> {
    fn scripted(values: Vec<Option<T>>) -> Self {
        Source::Scripted {
            values: values.into(),
        }
    }

    /// 取下一个脚本值并放回队尾；随机源返回 `Ok(None)`
    fn next_scripted(&mut self) -> Result<Option<T>> {
        match self {
            Source::Scripted { values } => {
                let value = values
                    .pop_front()
                    .ok_or_else(|| SensorError::read_failed("empty script"))?;
                values.push_back(value.clone());
                value
                    .map(Some)
                    .ok_or_else(|| SensorError::read_failed("simulated read failure"))
            }
            Source::Random => Ok(None),
        }
    }
}

fn init_result(fail: bool, name: &str) -> Result<()> {
    if fail {
        Err(SensorError::NotInitialized(format!("{} unavailable", name)))
    } else {
        Ok(())
    }
}

/// 模拟土壤湿度探头
pub struct SimulatedMoisture {
    source: Source<bool>,
    wet_probability: f64,
    fail_init: bool,
    released: Arc<AtomicBool>,
}

impl SimulatedMoisture {
    pub fn random(wet_probability: f64) -> Self {
        Self {
            source: Source::Random,
            wet_probability: wet_probability.clamp(0.0, 1.0),
            fail_init: false,
            released: Arc::default(),
        }
    }

    pub fn scripted(levels: Vec<Option<bool>>) -> Self {
        Self {
            source: Source::scripted(levels),
            wet_probability: 0.5,
            fail_init: false,
            released: Arc::default(),
        }
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::random(0.5)
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    /// 探头交给管理器后仍可观察释放状态
    pub fn release_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

#[async_trait]
impl MoistureProbe for SimulatedMoisture {
    async fn init(&mut self) -> Result<()> {
        init_result(self.fail_init, self.name())
    }

    async fn read_level(&mut self) -> Result<bool> {
        match self.source.next_scripted()? {
            Some(level) => Ok(level),
            None => Ok(!rand::thread_rng().gen_bool(self.wet_probability)),
        }
    }

    async fn release(&mut self) -> Result<()> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "simulated-moisture"
    }
}

/// 模拟温湿度传感器
pub struct SimulatedClimate {
    source: Source<ClimateSample>,
    last: ClimateSample,
    fail_init: bool,
}

impl SimulatedClimate {
    pub fn random() -> Self {
        Self {
            source: Source::Random,
            last: ClimateSample {
                temperature: Some(22.0),
                humidity: Some(55.0),
            },
            fail_init: false,
        }
    }

    pub fn scripted(samples: Vec<Option<ClimateSample>>) -> Self {
        Self {
            source: Source::scripted(samples),
            ..Self::random()
        }
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::random()
        }
    }
}

#[async_trait]
impl ClimateProbe for SimulatedClimate {
    async fn init(&mut self) -> Result<()> {
        init_result(self.fail_init, self.name())
    }

    async fn read(&mut self) -> Result<ClimateSample> {
        if let Some(sample) = self.source.next_scripted()? {
            return Ok(sample);
        }

        // 随机游走
        let mut rng = rand::thread_rng();
        let temperature = self.last.temperature.unwrap_or(22.0) + rng.gen_range(-0.5..0.5);
        let humidity = self.last.humidity.unwrap_or(55.0) + rng.gen_range(-2.0..2.0);
        self.last = ClimateSample {
            temperature: Some(temperature.clamp(-10.0, 50.0)),
            humidity: Some(humidity.clamp(0.0, 100.0)),
        };
        Ok(self.last)
    }

    fn name(&self) -> &str {
        "simulated-dht"
    }
}

/// 模拟光照传感器
pub struct SimulatedLight {
    source: Source<f64>,
    fail_init: bool,
}

impl SimulatedLight {
    pub fn random() -> Self {
        Self {
            source: Source::Random,
            fail_init: false,
        }
    }

    pub fn scripted(values: Vec<Option<f64>>) -> Self {
        Self {
            source: Source::scripted(values),
            fail_init: false,
        }
    }

    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::random()
        }
    }
}

#[async_trait]
impl LightProbe for SimulatedLight {
    async fn init(&mut self) -> Result<()> {
        init_result(self.fail_init, self.name())
    }

    async fn read_lux(&mut self) -> Result<f64> {
        match self.source.next_scripted()? {
            Some(lux) => Ok(lux),
            None => Ok(rand::thread_rng().gen_range(50.0..2000.0)),
        }
    }

    fn name(&self) -> &str {
        "simulated-bh1750"
    }
}
