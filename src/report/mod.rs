//! Reporting utilities: terminal summaries for the CLI.

pub mod format;

pub use format::*;
