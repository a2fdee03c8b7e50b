//! Library exports.
//!
//! Keeping modules in the library crate (rather than only in the binary)
//! allows:
//! - Reuse from additional binaries
//! - Cleaner integration tests
//! - A single source of truth for the types shared between them

pub mod config;
pub mod export;
pub mod handlers;
pub mod models;
pub mod server;
pub mod storage;
pub mod telemetry;

pub use server::run;
