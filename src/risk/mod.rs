//! Capital protection limits

pub mod guard;

pub use guard::*;
