//! Opportunity execution pipeline

pub mod coordinator;
pub mod submitter;

pub use coordinator::*;
pub use submitter::*;
