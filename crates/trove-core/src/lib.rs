//! # trove-core
//!
//! Core types, traits, and abstractions for the trove knowledge base.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other trove crates depend on.

pub mod defaults;
pub mod error;
pub mod ids;
pub mod logging;
pub mod models;
pub mod telemetry;
pub mod temporal;
pub mod text;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use ids::new_v7;
pub use models::*;
pub use telemetry::InMemoryTelemetry;
pub use temporal::{resolve_period, DatePeriod};
pub use text::{excerpt, truncate_chars};
pub use traits::*;
