use crate::adapters::{
    CdevGpioInput, IioClimateSensor, IioLightSensor, SimulatedClimate, SimulatedLight,
    SimulatedMoisture,
};
use crate::calibration::MoistureCalibration;
use crate::error::Result;
use crate::ports::{ClimateProbe, LightProbe, MoistureProbe};
use chrono::Local;
use plant_alert::AlertEvaluator;
use plant_config::{SensorConfig, SensorDriver};
use plant_logging::{log_alert, log_sensor_reading, LogLevel};
use plant_types::{ReadingStatus, SensorKind, SensorSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// 一组待初始化的探头
pub struct SensorProbes {
    pub moisture: Box<dyn MoistureProbe>,
    pub climate: Box<dyn ClimateProbe>,
    pub light: Box<dyn LightProbe>,
}

impl SensorProbes {
    /// 按配置选择驱动
    pub fn from_config(config: &SensorConfig) -> Self {
        match config.driver {
            SensorDriver::Linux => Self {
                moisture: Box::new(CdevGpioInput::new(&config.gpio_chip, config.moisture_pin)),
                climate: Box::new(IioClimateSensor::new(
                    &config.dht_iio_device,
                    config.dht_type,
                )),
                light: Box::new(IioLightSensor::new(&config.light_iio_device)),
            },
            SensorDriver::Simulated => Self::simulated(),
        }
    }

    pub fn simulated() -> Self {
        Self {
            moisture: Box::new(SimulatedMoisture::random(0.6)),
            climate: Box::new(SimulatedClimate::random()),
            light: Box::new(SimulatedLight::random()),
        }
    }
}

/// 传感器管理器
///
/// 初始化失败的传感器标记为不可用，之后的读取直接返回 `None`。
pub struct SensorManager {
    moisture: Mutex<Box<dyn MoistureProbe>>,
    climate: Mutex<Box<dyn ClimateProbe>>,
    light: Mutex<Box<dyn LightProbe>>,
    available: HashMap<SensorKind, bool>,
    calibration: MoistureCalibration,
    evaluator: Arc<AlertEvaluator>,
}

impl SensorManager {
    /// 初始化所有探头，单个失败不影响其他
    pub async fn initialize(
        mut probes: SensorProbes,
        calibration: MoistureCalibration,
        evaluator: Arc<AlertEvaluator>,
    ) -> Self {
        let mut available: HashMap<SensorKind, bool> =
            SensorKind::ALL.iter().map(|k| (*k, false)).collect();

        match probes.moisture.init().await {
            Ok(()) => {
                available.insert(SensorKind::Moisture, true);
                info!(probe = probes.moisture.name(), "Soil moisture sensor initialized");
            }
            Err(e) => log_alert(
                "SENSOR_INIT",
                format!("Moisture sensor failed: {}", e),
                LogLevel::Warn,
            ),
        }

        // DHT 同时提供温度和湿度
        match probes.climate.init().await {
            Ok(()) => {
                available.insert(SensorKind::Temperature, true);
                available.insert(SensorKind::Humidity, true);
                info!(probe = probes.climate.name(), "DHT sensor initialized");
            }
            Err(e) => log_alert(
                "SENSOR_INIT",
                format!("DHT sensor failed: {}", e),
                LogLevel::Warn,
            ),
        }

        match probes.light.init().await {
            Ok(()) => {
                available.insert(SensorKind::Light, true);
                info!(probe = probes.light.name(), "Light sensor initialized");
            }
            Err(e) => log_alert(
                "SENSOR_INIT",
                format!("Light sensor failed: {}", e),
                LogLevel::Warn,
            ),
        }

        Self {
            moisture: Mutex::new(probes.moisture),
            climate: Mutex::new(probes.climate),
            light: Mutex::new(probes.light),
            available,
            calibration,
            evaluator,
        }
    }

    pub fn is_available(&self, kind: SensorKind) -> bool {
        self.available.get(&kind).copied().unwrap_or(false)
    }

    pub fn available_count(&self) -> usize {
        self.available.values().filter(|v| **v).count()
    }

    fn log_reading(&self, kind: SensorKind, value: f64) -> ReadingStatus {
        let status = self.evaluator.classify(kind, value);
        log_sensor_reading(kind.name(), kind.format_value(value), status);
        status
    }

    /// 多次采样后的土壤湿度百分比
    pub async fn read_moisture(&self) -> Option<f64> {
        if !self.is_available(SensorKind::Moisture) {
            return None;
        }

        match self.sample_moisture().await {
            Ok(Some(avg)) => {
                self.log_reading(SensorKind::Moisture, avg);
                Some(avg)
            }
            Ok(None) => None,
            Err(e) => {
                log_alert(
                    "MOISTURE_READ",
                    format!("Error reading moisture: {}", e),
                    LogLevel::Warn,
                );
                None
            }
        }
    }

    async fn sample_moisture(&self) -> Result<Option<f64>> {
        let mut probe = self.moisture.lock().await;
        let readings = self.calibration.readings;
        let mut samples = Vec::with_capacity(readings as usize);

        for i in 0..readings {
            let level = probe.read_level().await?;
            samples.push(MoistureCalibration::to_percent(level));
            if i + 1 < readings && !self.calibration.sample_delay.is_zero() {
                tokio::time::sleep(self.calibration.sample_delay).await;
            }
        }

        Ok(MoistureCalibration::average(&samples))
    }

    /// 温度和湿度，一次 DHT 读取
    pub async fn read_temperature_humidity(&self) -> (Option<f64>, Option<f64>) {
        if !self.is_available(SensorKind::Temperature) {
            return (None, None);
        }

        let result = self.climate.lock().await.read().await;
        match result {
            Ok(sample) => {
                if let Some(temperature) = sample.temperature {
                    self.log_reading(SensorKind::Temperature, temperature);
                }
                if let Some(humidity) = sample.humidity {
                    self.log_reading(SensorKind::Humidity, humidity);
                }
                (sample.temperature, sample.humidity)
            }
            Err(e) => {
                log_alert(
                    "DHT_READ",
                    format!("Error reading DHT sensor: {}", e),
                    LogLevel::Warn,
                );
                (None, None)
            }
        }
    }

    /// 光照强度（lux）
    pub async fn read_light_intensity(&self) -> Option<f64> {
        if !self.is_available(SensorKind::Light) {
            return None;
        }

        let result = self.light.lock().await.read_lux().await;
        match result {
            Ok(lux) => {
                self.log_reading(SensorKind::Light, lux);
                Some(lux)
            }
            Err(e) => {
                log_alert(
                    "LIGHT_READ",
                    format!("Error reading light sensor: {}", e),
                    LogLevel::Warn,
                );
                None
            }
        }
    }

    /// 读取全部传感器
    pub async fn read_all(&self) -> SensorSnapshot {
        let mut snapshot = SensorSnapshot::new(Local::now());

        snapshot.set(SensorKind::Moisture, self.read_moisture().await);
        let (temperature, humidity) = self.read_temperature_humidity().await;
        snapshot.set(SensorKind::Temperature, temperature);
        snapshot.set(SensorKind::Humidity, humidity);
        snapshot.set(SensorKind::Light, self.read_light_intensity().await);

        snapshot
    }

    /// 归还 GPIO 线
    pub async fn cleanup(&self) {
        if let Err(e) = self.moisture.lock().await.release().await {
            warn!(error = %e, "Failed to release moisture sensor");
        }
        info!("Sensor manager cleanup completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ClimateSample;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn calibration(readings: u32) -> MoistureCalibration {
        MoistureCalibration::new(readings, Duration::ZERO)
    }

    async fn manager(probes: SensorProbes, readings: u32) -> SensorManager {
        SensorManager::initialize(
            probes,
            calibration(readings),
            Arc::new(AlertEvaluator::default()),
        )
        .await
    }

    fn climate(temperature: f64, humidity: f64) -> Option<ClimateSample> {
        Some(ClimateSample {
            temperature: Some(temperature),
            humidity: Some(humidity),
        })
    }

    #[tokio::test]
    async fn test_moisture_averaging() {
        let probes = SensorProbes {
            // 干 干 湿 湿 湿 -> 60%
            moisture: Box::new(SimulatedMoisture::scripted(vec![
                Some(true),
                Some(true),
                Some(false),
                Some(false),
                Some(false),
            ])),
            climate: Box::new(SimulatedClimate::random()),
            light: Box::new(SimulatedLight::random()),
        };
        let manager = manager(probes, 5).await;

        assert_eq!(manager.read_moisture().await, Some(60.0));
    }

    #[tokio::test]
    async fn test_moisture_read_failure_returns_none() {
        let probes = SensorProbes {
            moisture: Box::new(SimulatedMoisture::scripted(vec![Some(true), None])),
            climate: Box::new(SimulatedClimate::random()),
            light: Box::new(SimulatedLight::random()),
        };
        let manager = manager(probes, 3).await;

        assert!(manager.is_available(SensorKind::Moisture));
        assert_eq!(manager.read_moisture().await, None);
    }

    #[tokio::test]
    async fn test_failed_init_marks_unavailable() {
        let probes = SensorProbes {
            moisture: Box::new(SimulatedMoisture::random(0.5)),
            climate: Box::new(SimulatedClimate::failing_init()),
            light: Box::new(SimulatedLight::failing_init()),
        };
        let manager = manager(probes, 1).await;

        assert!(manager.is_available(SensorKind::Moisture));
        assert!(!manager.is_available(SensorKind::Temperature));
        assert!(!manager.is_available(SensorKind::Humidity));
        assert!(!manager.is_available(SensorKind::Light));
        assert_eq!(manager.available_count(), 1);

        assert_eq!(manager.read_temperature_humidity().await, (None, None));
        assert_eq!(manager.read_light_intensity().await, None);
    }

    #[tokio::test]
    async fn test_read_all_reads_dht_once() {
        let probes = SensorProbes {
            moisture: Box::new(SimulatedMoisture::scripted(vec![Some(false)])),
            // 第二个样本只有在读了两次时才会出现
            climate: Box::new(SimulatedClimate::scripted(vec![
                climate(24.0, 50.0),
                climate(99.0, 1.0),
            ])),
            light: Box::new(SimulatedLight::scripted(vec![Some(450.0)])),
        };
        let manager = manager(probes, 1).await;

        let snapshot = manager.read_all().await;
        assert_eq!(snapshot.get(SensorKind::Moisture), Some(100.0));
        assert_eq!(snapshot.get(SensorKind::Temperature), Some(24.0));
        assert_eq!(snapshot.get(SensorKind::Humidity), Some(50.0));
        assert_eq!(snapshot.get(SensorKind::Light), Some(450.0));

        let snapshot = manager.read_all().await;
        assert_eq!(snapshot.get(SensorKind::Temperature), Some(99.0));
    }

    #[tokio::test]
    async fn test_dht_failure_returns_none_pair() {
        let probes = SensorProbes {
            moisture: Box::new(SimulatedMoisture::random(0.5)),
            climate: Box::new(SimulatedClimate::scripted(vec![None])),
            light: Box::new(SimulatedLight::scripted(vec![None])),
        };
        let manager = manager(probes, 1).await;

        let snapshot = manager.read_all().await;
        assert!(snapshot.get(SensorKind::Moisture).is_some());
        assert_eq!(snapshot.get(SensorKind::Temperature), None);
        assert_eq!(snapshot.get(SensorKind::Humidity), None);
        assert_eq!(snapshot.get(SensorKind::Light), None);
    }

    #[tokio::test]
    async fn test_cleanup_releases_moisture_sensor() {
        let moisture = SimulatedMoisture::random(0.5);
        let released = moisture.release_flag();
        let probes = SensorProbes {
            moisture: Box::new(moisture),
            climate: Box::new(SimulatedClimate::random()),
            light: Box::new(SimulatedLight::random()),
        };
        let manager = manager(probes, 1).await;

        assert!(!released.load(Ordering::SeqCst));
        manager.cleanup().await;
        assert!(released.load(Ordering::SeqCst));

        // 重复清理不报错
        manager.cleanup().await;
        assert!(released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cleanup_without_gpio_line() {
        let mut config = SensorConfig::default();
        config.gpio_chip = "/nonexistent/gpiochip0".into();
        config.dht_iio_device = "/nonexistent/iio:device0".into();
        config.light_iio_device = "/nonexistent/iio:device1".into();
        let manager = manager(SensorProbes::from_config(&config), 1).await;

        assert_eq!(manager.available_count(), 0);
        assert_eq!(manager.read_moisture().await, None);
        manager.cleanup().await;
    }

    #[tokio::test]
    async fn test_simulated_driver_from_config() {
        let mut config = SensorConfig::default();
        config.driver = SensorDriver::Simulated;
        let manager = manager(SensorProbes::from_config(&config), 1).await;

        assert_eq!(manager.available_count(), 4);
        let snapshot = manager.read_all().await;
        assert!(snapshot.present().count() == 4);
    }
}
