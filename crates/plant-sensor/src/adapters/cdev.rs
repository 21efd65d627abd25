//! GPIO 字符设备适配器
//!
//! 通过 `/dev/gpiochipN` 申请输入线，offset 与 BCM 编号一致，不受内核 GPIO
//! 全局编号基址的影响。

use crate::error::{Result, SensorError};
use crate::ports::MoistureProbe;
use async_trait::async_trait;
use gpio_cdev::{Chip, LineHandle, LineRequestFlags};
use std::path::PathBuf;
use tracing::debug;

const CONSUMER: &str = "plant-monitor";

/// GPIO 数字输入
pub struct CdevGpioInput {
    chip_path: PathBuf,
    offset: u32,
    handle: Option<LineHandle>,
}

impl CdevGpioInput {
    pub fn new(chip_path: impl Into<PathBuf>, offset: u32) -> Self {
        Self {
            chip_path: chip_path.into(),
            offset,
            handle: None,
        }
    }

    /// 是否持有这条线
    pub fn is_requested(&self) -> bool {
        self.handle.is_some()
    }
}

#[async_trait]
impl MoistureProbe for CdevGpioInput {
    async fn init(&mut self) -> Result<()> {
        let mut chip = Chip::new(&self.chip_path)?;
        if self.offset >= chip.num_lines() {
            return Err(SensorError::NotInitialized(format!(
                "{} has {} lines, GPIO{} out of range",
                self.chip_path.display(),
                chip.num_lines(),
                self.offset
            )));
        }

        let handle = chip
            .get_line(self.offset)?
            .request(LineRequestFlags::INPUT, 0, CONSUMER)?;
        debug!(chip = %self.chip_path.display(), line = self.offset, "GPIO line requested");
        self.handle = Some(handle);
        Ok(())
    }

    async fn read_level(&mut self) -> Result<bool> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| SensorError::NotInitialized(self.name().to_string()))?;

        match handle.get_value()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(SensorError::invalid_data(format!(
                "GPIO{} value {}",
                self.offset, other
            ))),
        }
    }

    async fn release(&mut self) -> Result<()> {
        // 关闭 handle 即归还这条线
        if self.handle.take().is_some() {
            debug!(line = self.offset, "GPIO line released");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "gpio-moisture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_chip_fails_init() {
        let dir = tempdir().unwrap();
        let mut gpio = CdevGpioInput::new(dir.path().join("gpiochip9"), 17);

        assert!(matches!(gpio.init().await, Err(SensorError::Gpio(_))));
        assert!(!gpio.is_requested());
    }

    #[tokio::test]
    async fn test_regular_file_is_not_a_chip() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("gpiochip0");
        std::fs::write(&fake, "").unwrap();

        let mut gpio = CdevGpioInput::new(&fake, 17);
        assert!(gpio.init().await.is_err());
    }

    #[tokio::test]
    async fn test_read_before_init() {
        let mut gpio = CdevGpioInput::new("/dev/gpiochip0", 17);
        assert!(matches!(
            gpio.read_level().await,
            Err(SensorError::NotInitialized(_))
        ));

        // 没有申请过线，释放也应成功
        gpio.release().await.unwrap();
        assert!(!gpio.is_requested());
    }
}
