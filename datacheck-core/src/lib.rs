// datacheck-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts the engine needs: dataset accessors, relational gateway, stores.
pub mod ports;

// 2. Domain
// Check definitions, outcomes, thresholds, sampling, identifier safety.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure (Adapters)
// DuckDB gateway, metadata store, CSV ingestion, settings.
pub mod infrastructure;

// 4. Application (Use Cases)
// Accessors, check evaluators and the validation engine.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use application::{EngineDeps, EvaluatorRegistry, RunTicket, ValidationEngine};
pub use error::DataCheckError;
