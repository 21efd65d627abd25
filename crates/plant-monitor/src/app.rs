use crate::collector::{CollectionLoop, CycleReport};
use crate::shutdown::ShutdownHandle;
use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Utc};
use plant_alert::{AlertEvaluator, Thresholds};
use plant_config::{AppConfig, ReportTime};
use plant_notify::{DailyScheduler, EmailNotifier};
use plant_sensor::{MoistureCalibration, SensorManager, SensorProbes};
use plant_storage::{CsvDataLog, PruneStats};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// 日报统计窗口
const REPORT_WINDOW_HOURS: i64 = 24;

/// 组装好的监控服务
#[derive(Clone)]
pub struct App {
    config: Arc<AppConfig>,
    sensors: Arc<SensorManager>,
    data_log: Arc<CsvDataLog>,
    collector: Arc<CollectionLoop>,
}

impl App {
    /// 按配置构建，邮件通道由配置决定
    pub async fn build(config: AppConfig, probes: SensorProbes) -> Result<Self> {
        let notifier = EmailNotifier::from_config(&config.email)
            .context("Failed to configure email notifier")?;
        Self::build_with_notifier(config, probes, notifier).await
    }

    pub async fn build_with_notifier(
        config: AppConfig,
        probes: SensorProbes,
        notifier: EmailNotifier,
    ) -> Result<Self> {
        let evaluator = Arc::new(AlertEvaluator::new(Thresholds::from(&config.thresholds)));

        let sensors = Arc::new(
            SensorManager::initialize(
                probes,
                MoistureCalibration::from(&config.sensor),
                evaluator.clone(),
            )
            .await,
        );
        info!(
            available = sensors.available_count(),
            "Sensors initialized"
        );

        let data_log = Arc::new(
            CsvDataLog::open(&config.data.raw_data_file)
                .await
                .with_context(|| {
                    format!(
                        "Failed to open data file {}",
                        config.data.raw_data_file.display()
                    )
                })?,
        );

        let collector = CollectionLoop::new(
            sensors.clone(),
            data_log.clone(),
            evaluator,
            notifier,
            Duration::from_secs(config.sensor.collection_interval_secs),
        )
        .with_health_check(config.system.clone());

        Ok(Self {
            config: Arc::new(config),
            sensors,
            data_log,
            collector: Arc::new(collector),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn collector(&self) -> &CollectionLoop {
        &self.collector
    }

    pub fn data_log(&self) -> &CsvDataLog {
        &self.data_log
    }

    pub fn notifier(&self) -> &EmailNotifier {
        self.collector.notifier()
    }

    /// 汇总最近 24 小时并发送日报
    ///
    /// 发送失败时告警计数保留到下一次日报。
    pub async fn send_daily_report(&self) -> bool {
        let counts = self.collector.take_alert_counts().await;
        let summary = match self
            .data_log
            .summarize(ChronoDuration::hours(REPORT_WINDOW_HOURS), counts.clone())
            .await
        {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, "Daily summary unavailable");
                None
            }
        };

        let sent = self.notifier().send_daily_report(summary.as_ref()).await;
        if !sent || summary.is_none() {
            self.collector.restore_alert_counts(counts).await;
        }
        sent
    }

    /// 清理过期数据和冷却记录
    pub async fn cleanup_data(&self) -> Result<PruneStats> {
        self.notifier()
            .cooldown()
            .cleanup_expired(Utc::now())
            .await;

        let stats = self
            .data_log
            .prune(self.config.data.max_data_days, self.config.data.backup_enabled)
            .await?;
        Ok(stats)
    }

    /// 注册日报和数据清理任务
    pub async fn schedule_jobs(&self) -> Result<DailyScheduler> {
        let mut scheduler = DailyScheduler::new().await?;

        if self.notifier().is_enabled() {
            let report_at: ReportTime = self.config.email.daily_report_time.parse()?;
            let app = self.clone();
            scheduler
                .add_daily("daily-report", report_at, move || {
                    let app = app.clone();
                    async move {
                        app.send_daily_report().await;
                    }
                })
                .await?;
        }

        let cleanup_at: ReportTime = self.config.data.cleanup_time.parse()?;
        let app = self.clone();
        scheduler
            .add_daily("data-cleanup", cleanup_at, move || {
                let app = app.clone();
                async move {
                    if let Err(e) = app.cleanup_data().await {
                        error!(error = %e, "Data cleanup failed");
                    }
                }
            })
            .await?;

        Ok(scheduler)
    }

    /// 只采集一轮
    pub async fn run_once(&self) -> CycleReport {
        let report = self.collector.run_cycle().await;
        self.sensors.cleanup().await;
        report
    }

    /// 运行到收到关闭信号
    pub async fn run(&self, shutdown: ShutdownHandle) -> Result<()> {
        let mut scheduler = self.schedule_jobs().await?;
        scheduler.start().await?;

        let shutdown_rx = shutdown.subscribe();
        let signals = shutdown.clone();
        let signal_task = tokio::spawn(async move {
            if let Err(e) = signals.wait_for_system_signal().await {
                error!(error = %e, "Failed to install signal handlers");
            }
        });

        self.collector.run(shutdown_rx).await;

        signal_task.abort();
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "Scheduler shutdown failed");
        }
        self.sensors.cleanup().await;
        info!("Plant monitor stopped");
        Ok(())
    }
}
