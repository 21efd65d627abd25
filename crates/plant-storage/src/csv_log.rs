use crate::error::{Result, StorageError};
use crate::row::{format_row, header, parse_row};
use chrono::{DateTime, Duration, Local};
use plant_types::{DailySummary, SensorSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// 清理统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneStats {
    pub kept_rows: usize,
    pub removed_rows: usize,
    pub backed_up: bool,
}

/// 追加写入的 CSV 数据文件
pub struct CsvDataLog {
    path: PathBuf,
    // 追加与清理互斥
    write_lock: Mutex<()>,
}

impl CsvDataLog {
    /// 打开数据文件，必要时创建目录并写入表头
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::io(parent, e))?;
            }
        }

        let needs_header = match fs::metadata(&path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(StorageError::io(&path, e)),
        };

        if needs_header {
            fs::write(&path, format!("{}\n", header()))
                .await
                .map_err(|e| StorageError::io(&path, e))?;
            info!(path = %path.display(), "Created sensor data file");
        }

        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 追加一行
    pub async fn append(&self, snapshot: &SensorSnapshot) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        let line = format!("{}\n", format_row(snapshot));
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        debug!(row = %line.trim_end(), "Sensor data appended");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<SensorSnapshot>> {
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        let mut snapshots = Vec::new();
        for (line_no, line) in content.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line) {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => warn!(line = line_no + 1, error = %e, "Skipping malformed data row"),
            }
        }
        Ok(snapshots)
    }

    /// 读取 `cutoff` 之后（含）的所有记录
    pub async fn read_since(&self, cutoff: DateTime<Local>) -> Result<Vec<SensorSnapshot>> {
        let mut snapshots = self.read_all().await?;
        snapshots.retain(|s| s.timestamp >= cutoff);
        Ok(snapshots)
    }

    /// 最近 `window` 时间内的统计
    pub async fn summarize(
        &self,
        window: Duration,
        alert_counts: BTreeMap<String, u32>,
    ) -> Result<DailySummary> {
        let end = Local::now();
        let start = end - window;
        let snapshots = self.read_since(start).await?;
        Ok(DailySummary::from_snapshots(
            start,
            end,
            &snapshots,
            alert_counts,
        ))
    }

    /// 删除超过保留期的记录
    pub async fn prune(&self, max_days: u32, backup: bool) -> Result<PruneStats> {
        let _guard = self.write_lock.lock().await;

        // 超出可表示范围时没有行会过期
        let cutoff = Duration::try_days(i64::from(max_days))
            .and_then(|retention| Local::now().checked_sub_signed(retention));
        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        let mut kept = vec![header()];
        let mut removed_rows = 0;
        for line in content.lines().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            match parse_row(line) {
                Ok(snapshot) if cutoff.is_some_and(|c| snapshot.timestamp < c) => {
                    removed_rows += 1
                }
                // 无法解析的行保留原样，不做静默删除
                _ => kept.push(line.to_string()),
            }
        }
        let kept_rows = kept.len() - 1;

        if removed_rows == 0 {
            return Ok(PruneStats {
                kept_rows,
                removed_rows,
                backed_up: false,
            });
        }

        if backup {
            let backup_path = self.backup_path();
            fs::copy(&self.path, &backup_path)
                .await
                .map_err(|e| StorageError::io(&backup_path, e))?;
        }

        let tmp_path = self.tmp_path();
        let mut body = kept.join("\n");
        body.push('\n');
        fs::write(&tmp_path, body)
            .await
            .map_err(|e| StorageError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        info!(
            path = %self.path.display(),
            kept_rows,
            removed_rows,
            backup,
            "Sensor data pruned"
        );

        Ok(PruneStats {
            kept_rows,
            removed_rows,
            backed_up: backup,
        })
    }

    fn sibling_with_suffix(&self, suffix: &str) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.sibling_with_suffix(".bak")
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling_with_suffix(".tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::TIMESTAMP_FORMAT;
    use plant_types::SensorKind;
    use std::fs as std_fs;
    use tempfile::tempdir;

    fn snapshot_at(timestamp: DateTime<Local>, moisture: f64) -> SensorSnapshot {
        SensorSnapshot::new(timestamp).with(SensorKind::Moisture, moisture)
    }

    #[tokio::test]
    async fn test_open_writes_header_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("sensor_data.csv");

        let log = CsvDataLog::open(&path).await.unwrap();
        log.append(&snapshot_at(Local::now(), 42.0)).await.unwrap();

        // 再次打开不重复写表头
        let log = CsvDataLog::open(&path).await.unwrap();
        log.append(&snapshot_at(Local::now(), 43.0)).await.unwrap();

        let content = std_fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "timestamp,moisture,temperature,humidity,light");
        assert!(lines[1].ends_with(",42.00,,,"));
    }

    #[tokio::test]
    async fn test_read_since_skips_malformed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sensor_data.csv");
        let log = CsvDataLog::open(&path).await.unwrap();

        let now = Local::now();
        log.append(&snapshot_at(now - Duration::hours(30), 10.0))
            .await
            .unwrap();
        log.append(&snapshot_at(now - Duration::hours(2), 20.0))
            .await
            .unwrap();
        {
            let mut content = std_fs::read_to_string(&path).unwrap();
            content.push_str("garbage line\n");
            std_fs::write(&path, content).unwrap();
        }
        log.append(&snapshot_at(now, 30.0)).await.unwrap();

        let recent = log.read_since(now - Duration::hours(24)).await.unwrap();
        let values: Vec<_> = recent
            .iter()
            .filter_map(|s| s.get(SensorKind::Moisture))
            .collect();
        assert_eq!(values, vec![20.0, 30.0]);
    }

    #[tokio::test]
    async fn test_summarize() {
        let dir = tempdir().unwrap();
        let log = CsvDataLog::open(dir.path().join("sensor_data.csv"))
            .await
            .unwrap();

        let now = Local::now();
        log.append(&snapshot_at(now - Duration::hours(1), 20.0))
            .await
            .unwrap();
        log.append(&snapshot_at(now - Duration::minutes(5), 40.0))
            .await
            .unwrap();

        let mut counts = BTreeMap::new();
        counts.insert("MOISTURE_LOW".to_string(), 1);
        let summary = log.summarize(Duration::hours(24), counts).await.unwrap();

        assert_eq!(summary.samples, 2);
        let moisture = summary.stats[&SensorKind::Moisture];
        assert_eq!(moisture.min, 20.0);
        assert_eq!(moisture.max, 40.0);
        assert_eq!(moisture.avg, 30.0);
        assert_eq!(summary.total_alerts(), 1);
    }

    #[tokio::test]
    async fn test_prune_with_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sensor_data.csv");
        let log = CsvDataLog::open(&path).await.unwrap();

        let now = Local::now();
        log.append(&snapshot_at(now - Duration::days(40), 10.0))
            .await
            .unwrap();
        log.append(&snapshot_at(now - Duration::days(31), 11.0))
            .await
            .unwrap();
        log.append(&snapshot_at(now - Duration::days(1), 12.0))
            .await
            .unwrap();

        let stats = log.prune(30, true).await.unwrap();
        assert_eq!(stats.removed_rows, 2);
        assert_eq!(stats.kept_rows, 1);
        assert!(stats.backed_up);

        let backup = std_fs::read_to_string(log.backup_path()).unwrap();
        assert_eq!(backup.lines().count(), 4);

        let content = std_fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let expected = (now - Duration::days(1)).format(TIMESTAMP_FORMAT).to_string();
        assert!(lines[1].starts_with(&expected));

        // 清理后仍可追加
        log.append(&snapshot_at(now, 13.0)).await.unwrap();
        assert_eq!(std_fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[tokio::test]
    async fn test_prune_with_huge_retention_keeps_everything() {
        let dir = tempdir().unwrap();
        let log = CsvDataLog::open(dir.path().join("sensor_data.csv"))
            .await
            .unwrap();
        log.append(&snapshot_at(Local::now() - Duration::days(400), 5.0))
            .await
            .unwrap();

        let stats = log.prune(u32::MAX, false).await.unwrap();
        assert_eq!(stats.removed_rows, 0);
        assert_eq!(stats.kept_rows, 1);
    }

    #[tokio::test]
    async fn test_prune_nothing_to_remove() {
        let dir = tempdir().unwrap();
        let log = CsvDataLog::open(dir.path().join("sensor_data.csv"))
            .await
            .unwrap();
        log.append(&snapshot_at(Local::now(), 50.0)).await.unwrap();

        let stats = log.prune(30, true).await.unwrap();
        assert_eq!(stats.removed_rows, 0);
        assert!(!stats.backed_up);
        assert!(!log.backup_path().exists());
    }
}
