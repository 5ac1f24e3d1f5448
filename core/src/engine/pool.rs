//! Fixed-size pool of probe workers sharing one intake queue.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use super::ProbeOutcome;
use crate::probe::{ProbeError, ProbeFailure, ProbeParams, Prober};

type SharedIntake = Arc<Mutex<mpsc::Receiver<Ipv4Addr>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Idle,
    Probing,
    Terminated,
}

struct Worker {
    id: usize,
    state: WorkerState,
    intake: SharedIntake,
    results: mpsc::Sender<ProbeOutcome>,
    prober: Arc<dyn Prober>,
    params: ProbeParams,
}

/// Spawns `count` workers. Each one owns a clone of `results`; the original
/// is dropped here so the result queue closes with the last worker.
pub(super) fn spawn_workers(
    count: usize,
    intake: mpsc::Receiver<Ipv4Addr>,
    results: mpsc::Sender<ProbeOutcome>,
    prober: Arc<dyn Prober>,
    params: ProbeParams,
) -> Vec<JoinHandle<u64>> {
    let intake: SharedIntake = Arc::new(Mutex::new(intake));

    (0..count)
        .map(|id| {
            let worker = Worker {
                id,
                state: WorkerState::Idle,
                intake: Arc::clone(&intake),
                results: results.clone(),
                prober: Arc::clone(&prober),
                params,
            };
            tokio::spawn(worker.run())
        })
        .collect()
}

impl Worker {
    /// Returns the number of addresses this worker probed.
    async fn run(mut self) -> u64 {
        let mut probed: u64 = 0;

        while let Some(addr) = self.next_address().await {
            self.transition(WorkerState::Probing);
            probed += 1;

            if let Some(outcome) = self.probe(addr).await {
                if self.results.send(outcome).await.is_err() {
                    warn!(worker = self.id, "result queue closed, stopping worker");
                    break;
                }
            }
            self.transition(WorkerState::Idle);
        }

        self.transition(WorkerState::Terminated);
        debug!(worker = self.id, probed, "worker terminated");
        probed
    }

    /// `None` once the intake queue is closed and drained.
    async fn next_address(&self) -> Option<Ipv4Addr> {
        self.intake.lock().await.recv().await
    }

    async fn probe(&self, addr: Ipv4Addr) -> Option<ProbeOutcome> {
        let prober = Arc::clone(&self.prober);
        let params = self.params;

        let joined = tokio::task::spawn_blocking(move || prober.probe(addr, &params)).await;

        let error = match joined {
            Ok(Ok(stats)) if stats.is_reachable() => {
                debug!(%addr, sent = stats.sent, received = stats.received, "host reachable");
                return Some(ProbeOutcome::Reachable(addr));
            }
            Ok(Ok(stats)) => {
                trace!(%addr, sent = stats.sent, "no reply");
                return None;
            }
            Ok(Err(e)) => e,
            Err(e) => ProbeError::Panicked(e.to_string()),
        };

        warn!(%addr, error = %error, "probe failed");
        Some(ProbeOutcome::Failed(ProbeFailure { addr, error }))
    }

    fn transition(&mut self, next: WorkerState) {
        trace!(worker = self.id, from = ?self.state, to = ?next, "worker state");
        self.state = next;
    }
}
