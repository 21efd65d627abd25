use crate::error::Result;
use chrono::Local;
use plant_config::ReportTime;
use std::future::Future;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

/// 每日定时任务（本地时间）
pub struct DailyScheduler {
    scheduler: JobScheduler,
    jobs: Vec<(String, ReportTime)>,
}

impl DailyScheduler {
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            scheduler,
            jobs: Vec::new(),
        })
    }

    /// 添加每日任务
    pub async fn add_daily<F, Fut>(&mut self, name: &str, at: ReportTime, task: F) -> Result<()>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = Arc::new(task);
        let task_name = name.to_string();

        let job = Job::new_async_tz(at.cron_expression().as_str(), Local, move |_uuid, _l| {
            let task = task.clone();
            let task_name = task_name.clone();
            Box::pin(async move {
                info!(task = %task_name, "Executing daily task");
                task().await;
            })
        })?;

        let job_id = self.scheduler.add(job).await?;
        info!(
            task = %name,
            at = %at,
            cron = %at.cron_expression(),
            job_id = %job_id,
            "Daily task scheduled"
        );

        self.jobs.push((name.to_string(), at));
        Ok(())
    }

    pub fn jobs(&self) -> &[(String, ReportTime)] {
        &self.jobs
    }

    pub async fn start(&self) -> Result<()> {
        self.scheduler.start().await?;
        info!(jobs = self.jobs.len(), "Daily scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        info!("Daily scheduler stopped");
        Ok(())
    }
}
