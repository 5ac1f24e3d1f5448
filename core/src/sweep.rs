//! # Subnet Sweep Service
//!
//! Implements the "which hosts on this subnet answer a ping" use case.
//!
//! Orchestrates the sweep by:
//! 1. validating the subnet and enumerating its hosts,
//! 2. resolving the local interface and the address it holds in the subnet,
//! 3. delegating the probing to the [`engine`](crate::engine).
//!
//! Steps 1 and 2 fail fast, before a single probe is sent.

use std::sync::Arc;

use pingsweep_common::SweepError;
use pingsweep_common::config::PoolConfig;
use pingsweep_common::network::interface::{self, InterfaceRepository, SourceAddress};
use pingsweep_common::network::subnet::Subnet;
use tracing::info;

use crate::engine::{self, FixedRate, ScanResult, Throttle};
use crate::probe::Prober;

/// Result of [`SweepService::scan_subnet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetSweep {
    /// Local address found on the interface. Informational only.
    pub source: SourceAddress,
    pub result: ScanResult,
}

pub struct SweepService {
    config: Arc<PoolConfig>,
    interfaces: Box<dyn InterfaceRepository>,
    prober: Arc<dyn Prober>,
    throttle: Arc<dyn Throttle>,
}

impl SweepService {
    /// Dispatch is throttled at the configured dispatch interval unless
    /// [`with_throttle`](Self::with_throttle) replaces the policy.
    pub fn new(
        config: Arc<PoolConfig>,
        interfaces: Box<dyn InterfaceRepository>,
        prober: Arc<dyn Prober>,
    ) -> Self {
        let throttle: Arc<dyn Throttle> = Arc::new(FixedRate::new(config.dispatch_interval()));
        Self {
            config,
            interfaces,
            prober,
            throttle,
        }
    }

    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    /// Sweeps `subnet` from the interface called `interface`.
    ///
    /// Fatal errors (`InvalidSubnet`, `InterfaceLookup`, `NoAddressInSubnet`)
    /// are returned before the worker pool starts. Per-address probe failures
    /// end up in [`ScanResult::failures`].
    pub async fn scan_subnet(
        &self,
        subnet: &Subnet,
        interface: &str,
    ) -> Result<SubnetSweep, SweepError> {
        let hosts = subnet.hosts()?;
        let source: SourceAddress =
            interface::resolve_source(self.interfaces.as_ref(), interface, subnet)?;

        info!(%subnet, %source, hosts = hosts.len(), "sweeping subnet");

        let result = engine::run_scan(
            hosts,
            Arc::clone(&self.config),
            Arc::clone(&self.prober),
            Arc::clone(&self.throttle),
        )
        .await?;

        Ok(SubnetSweep { source, result })
    }

    /// Sweeps `subnet` without resolving a local interface.
    pub async fn scan_hosts(&self, subnet: &Subnet) -> Result<ScanResult, SweepError> {
        let hosts = subnet.hosts()?;
        engine::run_scan(
            hosts,
            Arc::clone(&self.config),
            Arc::clone(&self.prober),
            Arc::clone(&self.throttle),
        )
        .await
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
