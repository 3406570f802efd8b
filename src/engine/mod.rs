//! Engine orchestration

pub mod core;

pub use core::*;
