pub mod cooldown;
pub mod evaluator;
pub mod rule;

pub use cooldown::AlertCooldown;
pub use evaluator::AlertEvaluator;
pub use rule::{Alert, AlertRule, AlertSeverity, Comparison, ThresholdRule, Thresholds};
