//! Risk Register Core Library
//!
//! Shared FAIR data model, lenient numeric ingestion, and configuration for
//! the cyber-risk quantification engine.

pub mod config;
pub mod error;
pub mod ingest;
pub mod numeric;
pub mod types;

pub use config::EngineConfig;
pub use error::{Error, Result};
