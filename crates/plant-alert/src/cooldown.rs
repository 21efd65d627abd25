use chrono::{DateTime, Duration, Utc};
use plant_config::MAX_ALERT_COOLDOWN_SECS;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 告警冷却期
///
/// 按告警类型记录最后一次成功发送的时间，冷却期内同类告警被抑制。
#[derive(Clone)]
pub struct AlertCooldown {
    // 告警类型 -> 最后一次发送时间
    last_alert_time: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    cooldown: Duration,
}

impl AlertCooldown {
    /// 超过上限的冷却期按上限处理
    pub fn new(cooldown_secs: u64) -> Self {
        let secs = cooldown_secs.min(MAX_ALERT_COOLDOWN_SECS) as i64;
        Self {
            last_alert_time: Arc::new(RwLock::new(HashMap::new())),
            cooldown: Duration::try_seconds(secs).unwrap_or_else(Duration::zero),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// 检查告警是否处于冷却期
    pub async fn should_suppress(&self, alert_type: &str, now: DateTime<Utc>) -> bool {
        let last_times = self.last_alert_time.read().await;

        if let Some(last_time) = last_times.get(alert_type) {
            let elapsed = now - *last_time;
            if elapsed < self.cooldown {
                debug!(
                    "Alert {} suppressed (last sent {} seconds ago)",
                    alert_type,
                    elapsed.num_seconds()
                );
                return true;
            }
        }

        false
    }

    /// 记录告警发送时间
    pub async fn record(&self, alert_type: &str, now: DateTime<Utc>) {
        let mut last_times = self.last_alert_time.write().await;
        last_times.insert(alert_type.to_string(), now);
    }

    /// 距离冷却期结束的剩余时间
    pub async fn remaining(&self, alert_type: &str, now: DateTime<Utc>) -> Option<Duration> {
        let last_times = self.last_alert_time.read().await;
        let last_time = last_times.get(alert_type)?;
        let remaining = self.cooldown - (now - *last_time);
        (remaining > Duration::zero()).then_some(remaining)
    }

    pub async fn last_sent(&self, alert_type: &str) -> Option<DateTime<Utc>> {
        self.last_alert_time.read().await.get(alert_type).copied()
    }

    /// 清理过期记录
    pub async fn cleanup_expired(&self, now: DateTime<Utc>) {
        let mut last_times = self.last_alert_time.write().await;
        let expiry_threshold = self.cooldown * 2;

        last_times.retain(|_, last_time| now - *last_time < expiry_threshold);

        info!("Cleaned up expired cooldown records, remaining: {}", last_times.len());
    }

    pub async fn len(&self) -> usize {
        self.last_alert_time.read().await.len()
    }
}
