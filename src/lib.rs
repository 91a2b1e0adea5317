//! Volray - Interactive volume viewer
//!
//! Library surface of the application crate. The binary in `main.rs`
//! owns the event loop; this module exposes the configuration layer so
//! integration tests can exercise it.

pub mod config;

pub use config::AppConfig;
