pub mod csv_log;
pub mod error;
pub mod row;

pub use csv_log::{CsvDataLog, PruneStats};
pub use error::{Result, StorageError};
