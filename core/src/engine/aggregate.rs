use pingsweep_common::SweepError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{ProbeOutcome, ScanResult};

/// Drains the result queue until every worker has dropped its sender, then
/// joins the workers.
///
/// Draining while the pool is still running keeps a full result queue from
/// stalling the workers.
pub(super) async fn collect(
    mut results: mpsc::Receiver<ProbeOutcome>,
    workers: Vec<JoinHandle<u64>>,
) -> Result<ScanResult, SweepError> {
    let mut scan = ScanResult::default();

    while let Some(outcome) = results.recv().await {
        match outcome {
            ProbeOutcome::Reachable(addr) => scan.reachable.push(addr),
            ProbeOutcome::Failed(failure) => scan.failures.push(failure),
        }
    }

    let mut probed: u64 = 0;
    for handle in workers {
        probed += handle
            .await
            .map_err(|e| SweepError::Engine(format!("worker task failed: {e}")))?;
    }

    debug!(probed, reachable = scan.reachable.len(), "result queue drained");
    Ok(scan)
}
