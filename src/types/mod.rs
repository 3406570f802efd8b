//! Core data types and structures

pub mod token;
pub mod opportunity;
pub mod execution;
pub mod stats;

pub use token::*;
pub use opportunity::*;
pub use execution::*;
pub use stats::*;
