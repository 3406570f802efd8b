//! Pending-transaction intake for sandwich scanning

pub mod buffer;
pub mod decoder;

pub use buffer::*;
pub use decoder::*;
