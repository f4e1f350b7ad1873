//! Shared utilities for adviser-rs
//!
//! Currently just the tracing bootstrap used by the CLI; library crates
//! only emit through the `tracing` macros and never install a subscriber
//! themselves.

pub mod logging;

pub use logging::{init_tracing, init_tracing_with};
