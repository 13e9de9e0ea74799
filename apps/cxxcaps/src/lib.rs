//! # cxxcaps
//!
//! Command-line front end of the cxxcaps toolchain capability resolver.
//!
//! The binary in `main.rs` only sets up logging and calls [`cli::execute`];
//! everything else lives here so that integration tests can reach it.

pub mod cli;
pub mod report;
