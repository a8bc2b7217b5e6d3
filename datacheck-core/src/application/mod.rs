// datacheck-core/src/application/mod.rs

pub mod accessor;
pub mod engine;
pub mod evaluators;

// --- RE-EXPORTS (FACADE) ---
// `use datacheck_core::application::{ValidationEngine, EvaluatorRegistry};`

pub use accessor::{LiveTableAccessor, PreviewSampleAccessor};
pub use engine::{EngineDeps, RunTicket, ValidationEngine};
pub use evaluators::{CheckEvaluator, CheckTarget, EvaluatorRegistry};
