use std::net::Ipv4Addr;
use std::sync::Arc;

use pingsweep_common::network::subnet::HostRange;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::throttle::Throttle;

/// Feeds `hosts` into the intake queue in enumeration order.
///
/// Blocks on a full queue and on the throttle. Dropping the sender at the end
/// closes the intake; it does not wait for the workers.
pub(super) async fn dispatch(
    hosts: HostRange,
    intake: mpsc::Sender<Ipv4Addr>,
    throttle: Arc<dyn Throttle>,
) -> u64 {
    let mut dispatched: u64 = 0;

    for addr in hosts {
        if intake.send(addr).await.is_err() {
            warn!(%addr, dispatched, "intake queue closed before dispatch finished");
            break;
        }
        dispatched += 1;
        throttle.pause().await;
    }

    drop(intake);
    debug!(dispatched, "dispatch finished, intake queue closed");
    dispatched
}
