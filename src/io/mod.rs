//! Input/output helpers.
//!
//! - raw observation dumps (`dump`)

pub mod dump;

pub use dump::*;
