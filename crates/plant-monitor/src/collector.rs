use crate::health::{HealthStatus, SystemHealth};
use crate::shutdown::ShutdownSignal;
use plant_alert::AlertEvaluator;
use plant_config::SystemConfig;
use plant_logging::{log_alert, LogLevel};
use plant_notify::{AlertOutcome, EmailNotifier};
use plant_sensor::SensorManager;
use plant_storage::CsvDataLog;
use plant_types::SensorSnapshot;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// 一轮采集的结果
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub snapshot: SensorSnapshot,
    pub stored: bool,
    /// (告警类型, 发送结果)
    pub alerts: Vec<(String, AlertOutcome)>,
}

impl CycleReport {
    pub fn alert_types(&self) -> Vec<&str> {
        self.alerts.iter().map(|(t, _)| t.as_str()).collect()
    }
}

/// 主机健康检查设置
struct HealthCheck {
    probe: Mutex<SystemHealth>,
    config: SystemConfig,
}

/// 采集循环
pub struct CollectionLoop {
    sensors: Arc<SensorManager>,
    data_log: Arc<CsvDataLog>,
    evaluator: Arc<AlertEvaluator>,
    notifier: EmailNotifier,
    interval: Duration,
    health: Option<HealthCheck>,
    // 自上次日报以来的告警计数
    alert_counts: Mutex<BTreeMap<String, u32>>,
}

impl CollectionLoop {
    pub fn new(
        sensors: Arc<SensorManager>,
        data_log: Arc<CsvDataLog>,
        evaluator: Arc<AlertEvaluator>,
        notifier: EmailNotifier,
        interval: Duration,
    ) -> Self {
        Self {
            sensors,
            data_log,
            evaluator,
            notifier,
            interval,
            health: None,
            alert_counts: Mutex::new(BTreeMap::new()),
        }
    }

    /// 启用主机健康检查
    pub fn with_health_check(mut self, config: SystemConfig) -> Self {
        self.health = Some(HealthCheck {
            probe: Mutex::new(SystemHealth::new()),
            config,
        });
        self
    }

    pub fn notifier(&self) -> &EmailNotifier {
        &self.notifier
    }

    async fn count_alert(&self, alert_type: &str) {
        *self
            .alert_counts
            .lock()
            .await
            .entry(alert_type.to_string())
            .or_insert(0) += 1;
    }

    /// 当前告警计数
    pub async fn alert_counts(&self) -> BTreeMap<String, u32> {
        self.alert_counts.lock().await.clone()
    }

    /// 把未能发出的计数加回去
    pub async fn restore_alert_counts(&self, counts: BTreeMap<String, u32>) {
        let mut current = self.alert_counts.lock().await;
        for (alert_type, count) in counts {
            *current.entry(alert_type).or_insert(0) += count;
        }
    }

    /// 取出并清零告警计数（日报使用）
    pub async fn take_alert_counts(&self) -> BTreeMap<String, u32> {
        std::mem::take(&mut *self.alert_counts.lock().await)
    }

    /// 执行一轮采集
    pub async fn run_cycle(&self) -> CycleReport {
        let snapshot = self.sensors.read_all().await;

        if snapshot.is_empty() {
            warn!("No sensor values available in this cycle");
        }

        // 写入失败不影响告警
        let stored = match self.data_log.append(&snapshot).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to store sensor data");
                false
            }
        };

        let mut alerts = Vec::new();
        for alert in self.evaluator.evaluate(&snapshot) {
            log_alert(&alert.alert_type, &alert.message, LogLevel::Warn);
            self.count_alert(&alert.alert_type).await;

            let outcome = self.notifier.notify(&alert, Some(&snapshot)).await;
            debug!(alert_type = %alert.alert_type, outcome = %outcome, "Alert processed");
            alerts.push((alert.alert_type, outcome));
        }

        CycleReport {
            snapshot,
            stored,
            alerts,
        }
    }

    /// 主机健康检查，未启用时返回 `None`
    pub async fn check_health(&self) -> Option<HealthStatus> {
        let health = self.health.as_ref()?;
        let status = health.probe.lock().await.check();

        for (alert_type, message) in status.alerts(&health.config) {
            log_alert(&alert_type, &message, LogLevel::Warn);
            self.count_alert(&alert_type).await;
            self.notifier.send_alert(&alert_type, &message, None).await;
        }

        Some(status)
    }

    /// 按固定间隔采集，直到收到关闭信号
    pub async fn run(&self, mut shutdown: broadcast::Receiver<ShutdownSignal>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let health_period = self
            .health
            .as_ref()
            .map(|h| Duration::from_secs(h.config.check_interval_secs.max(1)))
            .unwrap_or(Duration::from_secs(3600));
        let mut health_ticker = interval(health_period);
        health_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = self.interval.as_secs(), "Collection loop started");

        let mut cycles: u64 = 0;
        loop {
            tokio::select! {
                // 第一次 tick 立即返回
                _ = ticker.tick() => {
                    cycles += 1;
                    let report = self.run_cycle().await;
                    info!(
                        cycle = cycles,
                        values = report.snapshot.present().count(),
                        alerts = report.alerts.len(),
                        stored = report.stored,
                        "Collection cycle completed"
                    );
                }
                _ = health_ticker.tick(), if self.health.is_some() => {
                    self.check_health().await;
                }
                reason = shutdown.recv() => {
                    info!(?reason, cycles, "Collection loop stopping");
                    break;
                }
            }
        }
    }
}
