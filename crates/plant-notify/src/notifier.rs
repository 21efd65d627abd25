use crate::error::Result;
use crate::mailer::{Mailer, SmtpMailer};
use crate::templates;
use chrono::{Local, Utc};
use plant_alert::{Alert, AlertCooldown};
use plant_config::EmailConfig;
use plant_logging::{log_alert, LogLevel};
use plant_types::{DailySummary, SensorSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// 告警发送结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertOutcome {
    /// 邮件通知已关闭
    Disabled,
    /// 处于冷却期
    Suppressed,
    Sent,
    Failed,
}

impl AlertOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, AlertOutcome::Sent)
    }
}

impl fmt::Display for AlertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertOutcome::Disabled => "disabled",
            AlertOutcome::Suppressed => "suppressed",
            AlertOutcome::Sent => "sent",
            AlertOutcome::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// 邮件通知器
///
/// 冷却时间只在发送成功后记录，发送失败的告警下一轮仍会重试。
#[derive(Clone)]
pub struct EmailNotifier {
    mailer: Option<Arc<dyn Mailer>>,
    cooldown: AlertCooldown,
}

impl EmailNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, cooldown_secs: u64) -> Self {
        Self {
            mailer: Some(mailer),
            cooldown: AlertCooldown::new(cooldown_secs),
        }
    }

    pub fn disabled(cooldown_secs: u64) -> Self {
        Self {
            mailer: None,
            cooldown: AlertCooldown::new(cooldown_secs),
        }
    }

    /// 按配置创建，关闭时不构建 SMTP 连接
    pub fn from_config(config: &EmailConfig) -> Result<Self> {
        if !config.enabled {
            info!("Email notifications disabled");
            return Ok(Self::disabled(config.alert_cooldown_secs));
        }

        let mailer = SmtpMailer::new(config)?;
        Ok(Self::new(Arc::new(mailer), config.alert_cooldown_secs))
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    pub fn cooldown(&self) -> &AlertCooldown {
        &self.cooldown
    }

    /// 发送告警邮件
    pub async fn send_alert(
        &self,
        alert_type: &str,
        message: &str,
        snapshot: Option<&SensorSnapshot>,
    ) -> AlertOutcome {
        let Some(mailer) = &self.mailer else {
            return AlertOutcome::Disabled;
        };

        let now = Utc::now();
        if self.cooldown.should_suppress(alert_type, now).await {
            return AlertOutcome::Suppressed;
        }

        let email = templates::alert_email(alert_type, message, snapshot, Local::now());
        match mailer.send(&email).await {
            Ok(()) => {
                self.cooldown.record(alert_type, now).await;
                info!(alert_type, "Alert email sent: {}", alert_type);
                AlertOutcome::Sent
            }
            Err(e) => {
                log_alert(
                    "EMAIL_SEND",
                    format!("Failed to send alert {}: {}", alert_type, e),
                    LogLevel::Error,
                );
                AlertOutcome::Failed
            }
        }
    }

    pub async fn notify(&self, alert: &Alert, snapshot: Option<&SensorSnapshot>) -> AlertOutcome {
        self.send_alert(&alert.alert_type, &alert.message, snapshot)
            .await
    }

    /// 发送日报
    pub async fn send_daily_report(&self, summary: Option<&DailySummary>) -> bool {
        let Some(mailer) = &self.mailer else {
            return false;
        };

        let email = templates::daily_report_email(summary, Local::now());
        match mailer.send(&email).await {
            Ok(()) => {
                info!("Daily report email sent successfully");
                true
            }
            Err(e) => {
                log_alert(
                    "EMAIL_REPORT",
                    format!("Failed to send daily report: {}", e),
                    LogLevel::Error,
                );
                false
            }
        }
    }

    /// 发送测试邮件
    pub async fn test_connection(&self) -> bool {
        let Some(mailer) = &self.mailer else {
            warn!("Email notifications are disabled");
            return false;
        };

        match mailer.send(&templates::test_email()).await {
            Ok(()) => {
                info!(mailer = mailer.name(), "Email test successful");
                true
            }
            Err(e) => {
                log_alert(
                    "EMAIL_TEST",
                    format!("Email test failed: {}", e),
                    LogLevel::Error,
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;
    use crate::message::EmailMessage;
    use async_trait::async_trait;
    use plant_types::SensorKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<EmailMessage>>,
        fail: AtomicBool,
    }

    impl RecordingMailer {
        fn subjects(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.subject.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &EmailMessage) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(NotifyError::Build("connection refused".to_string()));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn notifier() -> (EmailNotifier, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer::default());
        (EmailNotifier::new(mailer.clone(), 3600), mailer)
    }

    #[tokio::test]
    async fn test_cooldown_per_alert_type() {
        let (notifier, mailer) = notifier();
        let snapshot = SensorSnapshot::now().with(SensorKind::Moisture, 10.0);

        assert_eq!(
            notifier
                .send_alert("MOISTURE_LOW", "dry", Some(&snapshot))
                .await,
            AlertOutcome::Sent
        );
        assert_eq!(
            notifier.send_alert("MOISTURE_LOW", "dry", None).await,
            AlertOutcome::Suppressed
        );
        // 其他类型不受影响
        assert_eq!(
            notifier.send_alert("HUMIDITY_LOW", "air", None).await,
            AlertOutcome::Sent
        );

        assert_eq!(
            mailer.subjects(),
            vec![
                "PLANT MONITOR ALERT: MOISTURE_LOW".to_string(),
                "PLANT MONITOR ALERT: HUMIDITY_LOW".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_send_does_not_start_cooldown() {
        let (notifier, mailer) = notifier();
        mailer.fail.store(true, Ordering::SeqCst);

        assert_eq!(
            notifier.send_alert("TEMPERATURE_HIGH", "hot", None).await,
            AlertOutcome::Failed
        );
        assert!(notifier.cooldown().last_sent("TEMPERATURE_HIGH").await.is_none());

        mailer.fail.store(false, Ordering::SeqCst);
        assert_eq!(
            notifier.send_alert("TEMPERATURE_HIGH", "hot", None).await,
            AlertOutcome::Sent
        );
    }

    #[tokio::test]
    async fn test_zero_cooldown_never_suppresses() {
        let mailer = Arc::new(RecordingMailer::default());
        let notifier = EmailNotifier::new(mailer.clone(), 0);

        for _ in 0..3 {
            assert!(notifier.send_alert("MOISTURE_HIGH", "wet", None).await.is_sent());
        }
        assert_eq!(mailer.subjects().len(), 3);
    }

    #[tokio::test]
    async fn test_disabled_notifier() {
        let notifier = EmailNotifier::disabled(3600);
        assert!(!notifier.is_enabled());
        assert_eq!(
            notifier.send_alert("MOISTURE_LOW", "dry", None).await,
            AlertOutcome::Disabled
        );
        assert!(!notifier.send_daily_report(None).await);
        assert!(!notifier.test_connection().await);
    }

    #[tokio::test]
    async fn test_disabled_from_config() {
        let config = EmailConfig {
            enabled: false,
            ..EmailConfig::default()
        };
        let notifier = EmailNotifier::from_config(&config).unwrap();
        assert!(!notifier.is_enabled());
    }

    #[tokio::test]
    async fn test_daily_report_and_test_email() {
        let (notifier, mailer) = notifier();

        assert!(notifier.send_daily_report(None).await);
        assert!(notifier.test_connection().await);

        let subjects = mailer.subjects();
        assert!(subjects[0].starts_with("Plant Monitoring Daily Report - "));
        assert_eq!(subjects[1], "Plant Monitor Test Email");

        mailer.fail.store(true, Ordering::SeqCst);
        assert!(!notifier.send_daily_report(None).await);
        assert!(!notifier.test_connection().await);
    }
}
