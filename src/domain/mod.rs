//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations and the normalized series (`Observation`, `SeriesPair`)
//! - ladder filtering (`GameTypeFilter`)
//! - HTTP-facing records (`TrendResponse`, `PlayerSummary`)
//! - runtime configuration (`TrendConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
