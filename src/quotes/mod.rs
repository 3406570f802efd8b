//! Quote aggregation across venues

pub mod venue;
pub mod aggregator;
pub mod simulated;

pub use venue::*;
pub use aggregator::*;
pub use simulated::*;
