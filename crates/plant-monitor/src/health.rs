//! 主机健康检查：CPU 温度、内存和磁盘使用率

use plant_config::SystemConfig;
use plant_logging::log_system_status;
use serde::{Deserialize, Serialize};
use sysinfo::{Components, Disks, System};
use tracing::debug;

/// 一次健康检查的结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// 没有温度传感器的主机为 `None`
    pub cpu_temp: Option<f64>,
    pub memory_usage: f64,
    pub disk_usage: f64,
}

impl HealthStatus {
    /// 超出阈值的项，返回 (告警类型, 描述)
    pub fn alerts(&self, config: &SystemConfig) -> Vec<(String, String)> {
        let mut alerts = Vec::new();

        if let Some(temp) = self.cpu_temp {
            if temp >= config.cpu_temp_warning {
                alerts.push((
                    "CPU_TEMP_HIGH".to_string(),
                    format!(
                        "CPU temperature is {:.1}C, warning at {:.1}C",
                        temp, config.cpu_temp_warning
                    ),
                ));
            }
        }

        if self.memory_usage >= config.memory_warning {
            alerts.push((
                "MEMORY_HIGH".to_string(),
                format!(
                    "Memory usage is {:.1}%, warning at {:.1}%",
                    self.memory_usage, config.memory_warning
                ),
            ));
        }

        alerts
    }
}

pub struct SystemHealth {
    system: System,
    components: Components,
    disks: Disks,
}

impl SystemHealth {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            components: Components::new_with_refreshed_list(),
            disks: Disks::new_with_refreshed_list(),
        }
    }

    pub fn check(&mut self) -> HealthStatus {
        self.system.refresh_memory();
        self.components.refresh();
        self.disks.refresh();

        let total = self.system.total_memory();
        let memory_usage = if total == 0 {
            0.0
        } else {
            self.system.used_memory() as f64 / total as f64 * 100.0
        };

        let status = HealthStatus {
            cpu_temp: self.cpu_temperature(),
            memory_usage,
            disk_usage: self.root_disk_usage(),
        };

        log_system_status(status.cpu_temp, status.memory_usage, status.disk_usage);
        status
    }

    // 优先取 CPU 相关的传感器，没有就取最高温度
    fn cpu_temperature(&self) -> Option<f64> {
        let list = self.components.list();
        let cpu = list.iter().find(|c| {
            let label = c.label().to_lowercase();
            label.contains("cpu") || label.contains("soc") || label.contains("package")
        });

        match cpu {
            Some(component) => Some(component.temperature() as f64),
            None => list
                .iter()
                .map(|c| c.temperature() as f64)
                .filter(|t| t.is_finite())
                .fold(None, |max, t| Some(max.map_or(t, |m: f64| m.max(t)))),
        }
    }

    fn root_disk_usage(&self) -> f64 {
        let list = self.disks.list();
        let disk = list
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| list.first());

        match disk {
            Some(disk) if disk.total_space() > 0 => {
                let used = disk.total_space().saturating_sub(disk.available_space());
                used as f64 / disk.total_space() as f64 * 100.0
            }
            _ => {
                debug!("No disk information available");
                0.0
            }
        }
    }
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alerts_at_thresholds() {
        let config = SystemConfig::default();
        let status = HealthStatus {
            cpu_temp: Some(70.0),
            memory_usage: 85.0,
            disk_usage: 40.0,
        };

        let types: Vec<_> = status.alerts(&config).into_iter().map(|(t, _)| t).collect();
        assert_eq!(types, vec!["CPU_TEMP_HIGH", "MEMORY_HIGH"]);
    }

    #[test]
    fn test_no_alerts_when_healthy() {
        let config = SystemConfig::default();
        let status = HealthStatus {
            cpu_temp: None,
            memory_usage: 30.0,
            disk_usage: 90.0,
        };
        assert!(status.alerts(&config).is_empty());
    }

    #[test]
    fn test_check_reports_percentages() {
        let mut health = SystemHealth::new();
        let status = health.check();
        assert!((0.0..=100.0).contains(&status.memory_usage));
        assert!((0.0..=100.0).contains(&status.disk_usage));
    }
}
