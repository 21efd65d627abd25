use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// 纯文本邮件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub body: String,
    pub created_at: DateTime<Local>,
}

impl EmailMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            created_at: Local::now(),
        }
    }
}
