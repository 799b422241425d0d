//! Burnsub Common Utilities
//!
//! Shared infrastructure for all Burnsub crates:
//! - Error taxonomy and result aliases
//! - Timecode formatting for every delivery grammar
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timecode;

pub use config::*;
pub use error::*;
pub use timecode::*;
