//! Cyber Risk Register: FAIR risk quantification
//!
//! This is the root crate that provides benchmark and integration-test access
//! to the internal crates. For actual functionality, use them directly:
//!
//! - `register-core`: FAIR data model, numeric ingestion, configuration
//! - `fair-engine`: Susceptibility, frequency, loss, controls, cache policy
//! - `risk-calc`: Command-line calculator

// Re-export for benchmarks
pub use fair_engine as engine;
pub use register_core as core;
