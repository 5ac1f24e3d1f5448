//! Scan tunables.
//!
//! A [`PoolConfig`] is built once at process start, validated, and then only
//! ever read. The engine receives it behind an `Arc` so tests can inject
//! their own values (e.g. zero intervals) without touching shared state.

use std::num::NonZeroUsize;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(250);
pub const DEFAULT_ATTEMPTS: u32 = 1;
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Echo sequence numbers are 16 bits wide.
pub const MAX_ATTEMPTS: u32 = u16::MAX as u32;
pub const MAX_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    #[error("worker count must be greater than zero")]
    ZeroWorkers,
    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,
    #[error("at least one probe attempt per host is required")]
    ZeroAttempts,
    #[error("probe timeout may not exceed {} s", MAX_PROBE_TIMEOUT.as_secs())]
    TimeoutTooLong,
    #[error("at most {} probe attempts per host are supported", MAX_ATTEMPTS)]
    TooManyAttempts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    worker_count: usize,
    probe_timeout: Duration,
    attempts: u32,
    probe_interval: Duration,
    dispatch_interval: Duration,
}

impl PoolConfig {
    pub fn new(
        worker_count: usize,
        probe_timeout: Duration,
        attempts: u32,
        probe_interval: Duration,
        dispatch_interval: Duration,
    ) -> Result<Self, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if probe_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if probe_timeout > MAX_PROBE_TIMEOUT {
            return Err(ConfigError::TimeoutTooLong);
        }
        if attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if attempts > MAX_ATTEMPTS {
            return Err(ConfigError::TooManyAttempts);
        }

        Ok(Self {
            worker_count,
            probe_timeout,
            attempts,
            probe_interval,
            dispatch_interval,
        })
    }

    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::default()
    }

    /// Number of concurrent probe workers.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Upper bound on the wait for a single echo reply.
    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Echo requests sent to every host.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Spacing between the attempts sent to the same host.
    pub fn probe_interval(&self) -> Duration {
        self.probe_interval
    }

    /// Spacing between two addresses handed to the worker pool.
    pub fn dispatch_interval(&self) -> Duration {
        self.dispatch_interval
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
            probe_interval: DEFAULT_PROBE_INTERVAL,
            dispatch_interval: DEFAULT_DISPATCH_INTERVAL,
        }
    }
}

/// Twice the hardware parallelism, or two workers when it cannot be queried.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        * 2
}

/// Starts from the defaults and overrides whatever is set.
#[derive(Debug, Default, Clone)]
pub struct PoolConfigBuilder {
    worker_count: Option<usize>,
    probe_timeout: Option<Duration>,
    attempts: Option<u32>,
    probe_interval: Option<Duration>,
    dispatch_interval: Option<Duration>,
}

impl PoolConfigBuilder {
    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = Some(worker_count);
        self
    }

    pub fn probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = Some(probe_timeout);
        self
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn probe_interval(mut self, probe_interval: Duration) -> Self {
        self.probe_interval = Some(probe_interval);
        self
    }

    pub fn dispatch_interval(mut self, dispatch_interval: Duration) -> Self {
        self.dispatch_interval = Some(dispatch_interval);
        self
    }

    pub fn build(self) -> Result<PoolConfig, ConfigError> {
        PoolConfig::new(
            self.worker_count.unwrap_or_else(default_worker_count),
            self.probe_timeout.unwrap_or(DEFAULT_PROBE_TIMEOUT),
            self.attempts.unwrap_or(DEFAULT_ATTEMPTS),
            self.probe_interval.unwrap_or(DEFAULT_PROBE_INTERVAL),
            self.dispatch_interval.unwrap_or(DEFAULT_DISPATCH_INTERVAL),
        )
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
