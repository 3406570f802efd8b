//! Configuration management for the engine

pub mod settings;
pub mod environment;

pub use settings::*;
pub use environment::*;
