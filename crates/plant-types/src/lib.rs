pub mod sensor;
pub mod summary;

pub use sensor::{ReadingStatus, SensorKind, SensorSnapshot};
pub use summary::{DailySummary, SensorStats};
