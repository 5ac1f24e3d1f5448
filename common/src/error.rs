//! Errors that abort a sweep before any probe is sent.
//!
//! Per-address probe failures are not represented here; they never abort a
//! scan and live next to the probe capability in `pingsweep-core`.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum SweepError {
    /// The named interface does not exist or the interface list could not be read.
    #[error("could not resolve interface '{name}': {reason}")]
    InterfaceLookup { name: String, reason: String },

    /// The interface exists but none of its IPv4 addresses lies in the subnet.
    #[error("interface '{interface}' has no IPv4 address in {subnet}")]
    NoAddressInSubnet { interface: String, subnet: String },

    /// The subnet text is malformed or the prefix leaves no usable hosts.
    #[error("invalid subnet {subnet}: {reason}")]
    InvalidSubnet { subnet: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A worker or dispatcher task could not be joined.
    #[error("scan engine failure: {0}")]
    Engine(String),
}
