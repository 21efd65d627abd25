use anyhow::{anyhow, Result};
use chrono::{NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// 每日任务时间（本地时间，精确到分钟）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportTime {
    hour: u32,
    minute: u32,
}

impl ReportTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(anyhow!("Invalid time of day: {:02}:{:02}", hour, minute));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// 6 字段 cron 表达式（秒 分 时 日 月 周）
    pub fn cron_expression(&self) -> String {
        format!("0 {} {} * * *", self.minute, self.hour)
    }
}

impl FromStr for ReportTime {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|e| anyhow!("Invalid time '{}', expected HH:MM: {}", s, e))?;
        Self::new(time.hour(), time.minute())
    }
}

impl fmt::Display for ReportTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
