//! Per-command handler implementations
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod goals;

pub use goals::GoalsHandler;
