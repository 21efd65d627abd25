use thiserror::Error;

/// 通知错误
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Email notifications are disabled")]
    Disabled,

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

pub type Result<T> = std::result::Result<T, NotifyError>;
