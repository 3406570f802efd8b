//! Scan and execution counters

pub mod collector;

pub use collector::*;
