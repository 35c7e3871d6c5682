//! Core domain types for the FAIR risk register.

pub mod asset;
pub mod control;
pub mod cost_module;
pub mod record;
pub mod risk;
pub mod triangular;

pub use asset::*;
pub use control::*;
pub use cost_module::*;
pub use record::*;
pub use risk::*;
pub use triangular::*;
