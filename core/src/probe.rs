//! The reachability check behind every worker.
//!
//! A [`Prober`] answers one question for one address: how many echo requests
//! went out and how many came back. It is synchronous and may block for up to
//! [`ProbeParams::budget`], so the engine runs it on the blocking pool.

use std::net::Ipv4Addr;
use std::time::Duration;

use pingsweep_common::config::PoolConfig;
use thiserror::Error;

mod icmp;

pub use icmp::IcmpProber;

/// Per-probe settings taken from the [`PoolConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeParams {
    pub attempts: u32,
    pub interval: Duration,
    pub timeout: Duration,
}

impl ProbeParams {
    /// Worst case time a single worker spends on one host.
    pub fn budget(&self) -> Duration {
        self.timeout * self.attempts + self.interval * self.attempts.saturating_sub(1)
    }
}

impl From<&PoolConfig> for ProbeParams {
    fn from(cfg: &PoolConfig) -> Self {
        Self {
            attempts: cfg.attempts(),
            interval: cfg.probe_interval(),
            timeout: cfg.probe_timeout(),
        }
    }
}

/// Packet counters of a finished probe.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStats {
    pub sent: u32,
    pub received: u32,
}

impl ProbeStats {
    pub fn is_reachable(&self) -> bool {
        self.sent > 0 && self.received > 0
    }
}

/// Failure confined to a single address. Never aborts a scan.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("could not set up prober: {0}")]
    Construction(String),

    #[error("probe I/O failed: {0}")]
    Io(String),

    #[error("probe panicked: {0}")]
    Panicked(String),
}

/// A probe error together with the address it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeFailure {
    pub addr: Ipv4Addr,
    pub error: ProbeError,
}

pub trait Prober: Send + Sync {
    fn probe(&self, addr: Ipv4Addr, params: &ProbeParams) -> Result<ProbeStats, ProbeError>;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
