//! CSV 行格式
//!
//! `timestamp,moisture,temperature,humidity,light`，时间为本地时间，缺失值留空。

use crate::error::{Result, StorageError};
use chrono::{Local, NaiveDateTime, TimeZone};
use plant_types::{SensorKind, SensorSnapshot};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn header() -> String {
    let mut columns = vec!["timestamp"];
    columns.extend(SensorKind::ALL.iter().map(|k| k.name()));
    columns.join(",")
}

pub fn format_row(snapshot: &SensorSnapshot) -> String {
    let mut fields = vec![snapshot.timestamp.format(TIMESTAMP_FORMAT).to_string()];
    for kind in SensorKind::ALL {
        fields.push(
            snapshot
                .get(kind)
                .map(|v| format!("{:.2}", v))
                .unwrap_or_default(),
        );
    }
    fields.join(",")
}

pub fn parse_row(line: &str) -> Result<SensorSnapshot> {
    let fields: Vec<&str> = line.trim_end().split(',').collect();
    if fields.len() != SensorKind::ALL.len() + 1 {
        return Err(StorageError::Parse(format!(
            "expected {} fields, got {}",
            SensorKind::ALL.len() + 1,
            fields.len()
        )));
    }

    let naive = NaiveDateTime::parse_from_str(fields[0], TIMESTAMP_FORMAT)
        .map_err(|e| StorageError::Parse(format!("timestamp '{}': {}", fields[0], e)))?;
    let timestamp = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| StorageError::Parse(format!("nonexistent local time '{}'", fields[0])))?;

    let mut snapshot = SensorSnapshot::new(timestamp);
    for (kind, field) in SensorKind::ALL.iter().zip(&fields[1..]) {
        if field.is_empty() {
            continue;
        }
        let value = field
            .parse::<f64>()
            .map_err(|_| StorageError::Parse(format!("{} value '{}'", kind, field)))?;
        snapshot.set(*kind, Some(value));
    }

    Ok(snapshot)
}
