//! 邮件模板

use crate::message::EmailMessage;
use chrono::{DateTime, Local};
use plant_types::{DailySummary, SensorSnapshot};
use std::fmt::Write;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn alert_subject(alert_type: &str) -> String {
    format!("PLANT MONITOR ALERT: {}", alert_type)
}

pub fn alert_email(
    alert_type: &str,
    message: &str,
    snapshot: Option<&SensorSnapshot>,
    now: DateTime<Local>,
) -> EmailMessage {
    let mut body = String::new();
    let _ = writeln!(body, "Plant Monitoring System Alert");
    let _ = writeln!(body);
    let _ = writeln!(body, "Alert Type: {}", alert_type);
    let _ = writeln!(body, "Time: {}", now.format(TIME_FORMAT));
    let _ = writeln!(body, "Message: {}", message);
    let _ = writeln!(body);
    let _ = writeln!(body, "Current Sensor Readings:");

    if let Some(snapshot) = snapshot {
        for (kind, value) in snapshot.present() {
            let _ = writeln!(
                body,
                "{}: {}",
                kind.name().to_uppercase(),
                kind.format_value(value)
            );
        }
    }

    let _ = writeln!(body);
    let _ = writeln!(body, "Please check your plant monitoring system.");

    EmailMessage::new(alert_subject(alert_type), body)
}

pub fn report_subject(now: DateTime<Local>) -> String {
    format!("Plant Monitoring Daily Report - {}", now.format(DATE_FORMAT))
}

pub fn daily_report_email(summary: Option<&DailySummary>, now: DateTime<Local>) -> EmailMessage {
    let mut body = String::new();
    let _ = writeln!(body, "Plant Monitoring System - Daily Report");
    let _ = writeln!(body);
    let _ = writeln!(body, "Date: {}", now.format(DATE_FORMAT));
    let _ = writeln!(body, "System Status: Operational");
    let _ = writeln!(body);

    match summary {
        Some(summary) => {
            let _ = writeln!(
                body,
                "Window: {} - {} ({} samples)",
                summary.window_start.format(TIME_FORMAT),
                summary.window_end.format(TIME_FORMAT),
                summary.samples
            );
            let _ = writeln!(body);
            let _ = writeln!(body, "Sensor Statistics:");
            for (kind, stats) in &summary.stats {
                let _ = writeln!(
                    body,
                    "- {}: avg {}, min {}, max {} ({} readings)",
                    kind.name().to_uppercase(),
                    kind.format_value(stats.avg),
                    kind.format_value(stats.min),
                    kind.format_value(stats.max),
                    stats.count
                );
            }
            for kind in summary.silent_sensors() {
                let _ = writeln!(body, "- {}: no data", kind.name().to_uppercase());
            }

            let _ = writeln!(body);
            if summary.alert_counts.is_empty() {
                let _ = writeln!(body, "Recent Alerts: none");
            } else {
                let _ = writeln!(body, "Recent Alerts ({} total):", summary.total_alerts());
                for (alert_type, count) in &summary.alert_counts {
                    let _ = writeln!(body, "- {}: {}", alert_type, count);
                }
            }
        }
        None => {
            let _ = writeln!(body, "Sensor Statistics: unavailable");
            let _ = writeln!(body, "Check system logs for detailed alert history.");
        }
    }

    EmailMessage::new(report_subject(now), body)
}

pub fn test_email() -> EmailMessage {
    EmailMessage::new(
        "Plant Monitor Test Email",
        "This is a test email from your Plant Monitoring System.",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use plant_types::SensorKind;
    use std::collections::BTreeMap;

    fn at(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 3, hour, 15, 0).unwrap()
    }

    #[test]
    fn test_alert_email() {
        let snapshot = SensorSnapshot::new(at(9))
            .with(SensorKind::Moisture, 12.0)
            .with(SensorKind::Temperature, 24.0);

        let email = alert_email("MOISTURE_LOW", "Soil is dry", Some(&snapshot), at(9));
        assert_eq!(email.subject, "PLANT MONITOR ALERT: MOISTURE_LOW");
        assert!(email.body.contains("Time: 2024-06-03 09:15:00"));
        assert!(email.body.contains("Message: Soil is dry"));
        assert!(email.body.contains("MOISTURE: 12.0%"));
        assert!(email.body.contains("TEMPERATURE: 24.0C"));
        assert!(!email.body.contains("LIGHT:"));
    }

    #[test]
    fn test_daily_report_with_summary() {
        let snapshots = vec![
            SensorSnapshot::new(at(1)).with(SensorKind::Moisture, 20.0),
            SensorSnapshot::new(at(2)).with(SensorKind::Moisture, 40.0),
        ];
        let mut counts = BTreeMap::new();
        counts.insert("MOISTURE_LOW".to_string(), 3);
        let summary = DailySummary::from_snapshots(at(0), at(8), &snapshots, counts);

        let email = daily_report_email(Some(&summary), at(8));
        assert_eq!(email.subject, "Plant Monitoring Daily Report - 2024-06-03");
        assert!(email.body.contains("MOISTURE: avg 30.0%, min 20.0%, max 40.0% (2 readings)"));
        assert!(email.body.contains("LIGHT: no data"));
        assert!(email.body.contains("Recent Alerts (3 total):"));
        assert!(email.body.contains("- MOISTURE_LOW: 3"));
    }

    #[test]
    fn test_daily_report_without_summary() {
        let email = daily_report_email(None, at(8));
        assert!(email.body.contains("Sensor Statistics: unavailable"));
    }
}
