//! Error handling for the engine

pub mod bot_error;

pub use bot_error::*;
