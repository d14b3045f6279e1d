//! `bid-tools` library crate.
//!
//! The binary (`bids`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or calling the network
//! - the memo and keyword pipelines share one row-streaming layer
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod keywords;
pub mod memo;
pub mod report;
pub mod stream;
pub mod validate;
