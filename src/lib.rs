//! Booking service library
//!
//! Project modules wired into the kernel registry, plus the stores backing
//! them.

pub mod modules;

/// Re-export commonly used types
pub use modules::*;
