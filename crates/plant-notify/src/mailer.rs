use crate::error::{NotifyError, Result};
use crate::message::EmailMessage;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use plant_config::EmailConfig;
use tracing::{debug, info};

/// 隐式 TLS 端口，其他端口使用 STARTTLS
const SMTPS_PORT: u16 = 465;

/// 邮件发送通道
#[async_trait]
pub trait Mailer: Send + Sync {
    /// 发送邮件
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    /// 通道名称
    fn name(&self) -> &str;
}

/// 基于 lettre 的 SMTP 发送
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    server: String,
}

impl SmtpMailer {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config.sender_email.parse()?;
        let to: Mailbox = config.receiver_email.parse()?;

        let builder = if config.smtp_port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)?
        };

        let transport = builder
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ))
            .build();

        debug!(
            server = %config.smtp_server,
            port = config.smtp_port,
            "SMTP transport configured"
        );

        Ok(Self {
            transport,
            from,
            to,
            server: config.smtp_server.clone(),
        })
    }

    fn build(&self, message: &EmailMessage) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| NotifyError::Build(e.to_string()))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = self.build(message)?;
        self.transport.send(email).await?;

        info!(
            server = %self.server,
            to = %self.to,
            subject = %message.subject,
            "Email sent"
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
