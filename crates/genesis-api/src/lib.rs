//! genesis-api: Typed client for the Genesis multi-agent chat backend
//!
//! This crate owns the wire contract (`/health`, `/chat`), the HTTP client that
//! speaks it, and the error taxonomy used to classify transport failures.

pub mod client;
pub mod error;
pub mod types;

pub use client::{Backend, HttpBackend};
pub use error::{ChatErrorKind, Error, Result};
pub use types::*;
