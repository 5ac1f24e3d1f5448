//! The concurrent probing engine.
//!
//! ```text
//! HostRange -> dispatcher -> intake queue -> worker pool -> result queue -> aggregator
//! ```
//!
//! The dispatcher and the workers run in parallel while the caller drains the
//! result queue. Shutdown is ordered: the dispatcher closes the intake queue
//! after the last address, every worker terminates once the intake is drained
//! and drops its result sender, and only then does the result queue close and
//! the aggregator return.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;

use pingsweep_common::SweepError;
use pingsweep_common::config::PoolConfig;
use pingsweep_common::network::subnet::HostRange;
use tokio::sync::mpsc;
use tracing::info;

use crate::probe::{ProbeFailure, ProbeParams, Prober};

mod aggregate;
mod dispatch;
mod pool;
pub mod throttle;

pub use throttle::{FixedRate, Throttle, Unthrottled};

/// What a worker publishes for one address. Unreachable hosts publish nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable(Ipv4Addr),
    Failed(ProbeFailure),
}

/// Outcome of one scan.
///
/// `reachable` is in completion order, which varies between runs; treat it
/// as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub reachable: Vec<Ipv4Addr>,
    pub failures: Vec<ProbeFailure>,
    pub dispatched: u64,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.reachable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reachable.is_empty()
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.reachable.contains(&addr)
    }

    pub fn sorted(&self) -> Vec<Ipv4Addr> {
        let mut hosts = self.reachable.clone();
        hosts.sort_unstable();
        hosts
    }

    pub fn into_set(self) -> BTreeSet<Ipv4Addr> {
        self.reachable.into_iter().collect()
    }
}

/// Probes every address of `hosts` and collects the responsive ones.
///
/// Both queues are bounded by the worker count. Returns an error only if a
/// task of the engine itself could not be joined.
pub async fn run_scan(
    hosts: HostRange,
    config: Arc<PoolConfig>,
    prober: Arc<dyn Prober>,
    throttle: Arc<dyn Throttle>,
) -> Result<ScanResult, SweepError> {
    let workers: usize = config.worker_count();
    let total: usize = hosts.len();
    let start: Instant = Instant::now();

    let params = ProbeParams::from(config.as_ref());

    info!(
        hosts = total,
        workers,
        per_host_ms = params.budget().as_millis() as u64,
        "starting scan"
    );

    let (intake_tx, intake_rx) = mpsc::channel::<Ipv4Addr>(workers);
    let (result_tx, result_rx) = mpsc::channel::<ProbeOutcome>(workers);

    let pool = pool::spawn_workers(
        workers,
        intake_rx,
        result_tx,
        prober,
        params,
    );
    let dispatcher = tokio::spawn(dispatch::dispatch(hosts, intake_tx, throttle));

    let mut result: ScanResult = aggregate::collect(result_rx, pool).await?;
    result.dispatched = dispatcher
        .await
        .map_err(|e| SweepError::Engine(format!("dispatcher task failed: {e}")))?;

    info!(
        reachable = result.len(),
        failed = result.failures.len(),
        dispatched = result.dispatched,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scan finished"
    );

    Ok(result)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
