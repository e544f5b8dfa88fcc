//! `ladder-trend` library crate.
//!
//! The binary (`trend`) is a thin wrapper around this library so that:
//!
//! - the fetch/normalize pipeline is testable without spawning processes
//! - the HTTP server and the CLI share one implementation
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod io;
pub mod normalize;
pub mod plot;
pub mod report;
pub mod search;
pub mod server;
