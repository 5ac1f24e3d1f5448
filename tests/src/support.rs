use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use pingsweep_common::SweepError;
use pingsweep_common::config::PoolConfig;
use pingsweep_common::network::interface::InterfaceRepository;
use pingsweep_core::probe::{ProbeError, ProbeParams, ProbeStats, Prober};
use pingsweep_core::sweep::SweepService;
use pnet::datalink::{MacAddr, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network, Ipv6Network};

pub fn ni(name: &str, index: u32, mac: Option<MacAddr>, ips: &[IpNetwork], flags: u32) -> NetworkInterface {
    NetworkInterface {
        name: name.into(),
        description: "".into(),
        index,
        mac,
        ips: ips.to_vec(),
        flags,
    }
}

pub fn v4(a: u8, b: u8, c: u8, d: u8, p: u8) -> IpNetwork {
    IpNetwork::V4(Ipv4Network::new(Ipv4Addr::new(a, b, c, d), p).unwrap())
}

pub fn v6(s: &str, p: u8) -> IpNetwork {
    IpNetwork::V6(Ipv6Network::new(s.parse::<Ipv6Addr>().unwrap(), p).unwrap())
}

/// A fixed interface table.
pub struct StaticInterfaces(pub Vec<NetworkInterface>);

impl InterfaceRepository for StaticInterfaces {
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, SweepError> {
        Ok(self.0.clone())
    }
}

/// `eth0` with 10.0.0.5/24 and 192.168.1.2/24, plus a link-local IPv6.
pub fn eth0() -> StaticInterfaces {
    StaticInterfaces(vec![
        ni("lo", 1, None, &[v4(127, 0, 0, 1, 8)], 0),
        ni(
            "eth0",
            2,
            Some(MacAddr::new(0x02, 0, 0, 0, 0, 0x05)),
            &[v6("fe80::5", 64), v4(10, 0, 0, 5, 24), v4(192, 168, 1, 2, 24)],
            0,
        ),
    ])
}

/// Which addresses a [`MockProber`] answers for.
#[derive(Clone)]
pub enum Reply {
    All,
    Nothing,
    Only(HashSet<Ipv4Addr>),
}

/// Deterministic prober. Optionally sleeps to simulate a blocking probe and
/// tracks how many probes run at once.
pub struct MockProber {
    reply: Reply,
    failing: HashSet<Ipv4Addr>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockProber {
    pub fn new(reply: Reply) -> Self {
        Self {
            reply,
            failing: HashSet::new(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn only(addrs: &[Ipv4Addr]) -> Self {
        Self::new(Reply::Only(addrs.iter().copied().collect()))
    }

    pub fn failing(mut self, addrs: &[Ipv4Addr]) -> Self {
        self.failing = addrs.iter().copied().collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

impl Prober for MockProber {
    fn probe(&self, addr: Ipv4Addr, params: &ProbeParams) -> Result<ProbeStats, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&addr) {
            return Err(ProbeError::Construction(format!("cannot probe {addr}")));
        }

        let answers = match &self.reply {
            Reply::All => true,
            Reply::Nothing => false,
            Reply::Only(set) => set.contains(&addr),
        };

        Ok(ProbeStats {
            sent: params.attempts,
            received: if answers { params.attempts } else { 0 },
        })
    }
}

/// Zero intervals so tests run unthrottled.
pub fn test_config(workers: usize) -> Arc<PoolConfig> {
    Arc::new(
        PoolConfig::builder()
            .worker_count(workers)
            .probe_timeout(Duration::from_millis(10))
            .probe_interval(Duration::ZERO)
            .dispatch_interval(Duration::ZERO)
            .build()
            .unwrap(),
    )
}

pub fn service(workers: usize, prober: Arc<MockProber>) -> SweepService {
    SweepService::new(test_config(workers), Box::new(eth0()), prober)
}
