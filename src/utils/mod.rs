//! Logging and process setup helpers

pub mod logging;

pub use logging::*;
