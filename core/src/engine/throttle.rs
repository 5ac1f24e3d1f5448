//! Dispatch rate policies.

use std::time::Duration;

use async_trait::async_trait;

/// Called by the dispatcher after every enqueued address.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self);
}

/// Constant delay between two dispatches, independent of worker speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRate {
    interval: Duration,
}

impl FixedRate {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl Throttle for FixedRate {
    async fn pause(&self) {
        if !self.interval.is_zero() {
            tokio::time::sleep(self.interval).await;
        }
    }
}

/// Dispatch as fast as the intake queue accepts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unthrottled;

#[async_trait]
impl Throttle for Unthrottled {
    async fn pause(&self) {}
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
