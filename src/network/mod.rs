//! Gas pricing and network retry helpers

pub mod gas;
pub mod retry;

pub use gas::*;
pub use retry::*;
