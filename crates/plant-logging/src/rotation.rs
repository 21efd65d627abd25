use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// 按大小滚动的日志文件
///
/// 当前文件超过 `max_bytes` 时依次改名为 `.1`, `.2` ...，最多保留 `backup_count` 个。
#[derive(Clone)]
pub struct RotatingFileWriter {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    backup_count: u32,
}

impl RotatingFileWriter {
    pub fn open<P: AsRef<Path>>(path: P, max_bytes: u64, backup_count: u32) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = open_append(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                path,
                file,
                written,
                max_bytes,
                backup_count,
            })),
        })
    }

    pub fn path(&self) -> PathBuf {
        match self.inner.lock() {
            Ok(inner) => inner.path.clone(),
            Err(poisoned) => poisoned.into_inner().path.clone(),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn backup_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

impl Inner {
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backup_count == 0 {
            self.file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = backup_path(&self.path, self.backup_count);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.backup_count).rev() {
            let from = backup_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, index + 1))?;
            }
        }
        fs::rename(&self.path, backup_path(&self.path, 1))?;

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;

        if inner.max_bytes > 0
            && inner.written > 0
            && inner.written + buf.len() as u64 > inner.max_bytes
        {
            inner.rotate()?;
        }

        let n = inner.file.write(buf)?;
        inner.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        inner.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
