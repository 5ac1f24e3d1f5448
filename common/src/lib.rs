//! Shared building blocks for the pingsweep workspace.
//!
//! Holds the subnet model, the scan configuration, the error types that cross
//! crate boundaries and the interface lookup used before a sweep starts.

pub mod config;
pub mod error;
pub mod log;
pub mod network;
pub mod utils;

pub use error::SweepError;
