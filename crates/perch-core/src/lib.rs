//! # perch-core
//!
//! Core types for the Perch CLI: the data model shared between the
//! API clients and the login orchestrator, the unified error type, and
//! client configuration.
//!
//! Nothing in this crate performs I/O; it only defines the vocabulary
//! the other crates speak.

mod config;
mod error;
mod types;

pub use config::ApiConfig;
pub use error::{Error, Result};
pub use types::*;
