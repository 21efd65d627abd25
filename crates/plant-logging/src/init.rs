use crate::events::LogLevel;
use crate::rotation::RotatingFileWriter;
use chrono::Local;
use plant_config::LoggingConfig;
use std::path::PathBuf;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log level: {0}")]
    Level(String),

    #[error("Failed to install subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 配置中的级别（DEBUG/INFO/WARNING/ERROR/CRITICAL，不区分大小写）转换为过滤器
pub fn level_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    let level: LogLevel = level.parse().map_err(LoggingError::Level)?;
    let level = LevelFilter::from_level(level.into());
    Ok(EnvFilter::default().add_directive(level.into()))
}

/// 按配置组装订阅器，不安装为全局
pub fn build_subscriber(
    config: &LoggingConfig,
    filter: EnvFilter,
) -> Result<(impl Subscriber + Send + Sync + 'static, PathBuf), LoggingError> {
    let path = config.file_path(Local::now());
    let writer = RotatingFileWriter::open(&path, config.max_file_size, config.backup_count)
        .map_err(|source| LoggingError::OpenFile {
            path: path.clone(),
            source,
        })?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()));
    if config.json {
        layers.push(file_layer.json().boxed());
    } else {
        layers.push(file_layer.with_target(true).boxed());
    }

    if config.console_output {
        layers.push(
            fmt::layer()
                .with_target(false)
                .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
                .boxed(),
        );
    }

    let subscriber = tracing_subscriber::registry().with(layers).with(filter);
    Ok((subscriber, path))
}

/// 初始化全局日志
///
/// `RUST_LOG` 优先于配置中的 `level`。返回当前日志文件路径。
pub fn init_logging(config: &LoggingConfig) -> Result<PathBuf, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(&config.level)?,
    };

    let (subscriber, path) = build_subscriber(config, filter)?;
    subscriber.try_init()?;

    tracing::info!(log_file = %path.display(), "Plant monitor logger initialized");
    Ok(path)
}
