// datacheck-core/src/domain/quality/mod.rs

pub mod predicate;
pub mod sampler;
pub mod threshold;

pub use predicate::ColumnPredicate;
pub use sampler::{RowSampler, display_value};
pub use threshold::{Severity, Thresholds, violation_rate};
