//! IPv4 subnets and the enumeration of their usable host addresses.

use std::fmt;
use std::iter::FusedIterator;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::SweepError;

/// Largest prefix that still leaves a usable host between network and broadcast.
pub const MAX_HOST_PREFIX: u8 = 30;

/// An IPv4 network, normalised to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    network: Ipv4Network,
}

impl Subnet {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, SweepError> {
        let invalid = |e: pnet::ipnetwork::IpNetworkError| SweepError::InvalidSubnet {
            subnet: format!("{addr}/{prefix}"),
            reason: e.to_string(),
        };

        let raw = Ipv4Network::new(addr, prefix).map_err(invalid)?;
        let network = Ipv4Network::new(raw.network(), prefix).map_err(invalid)?;

        Ok(Self { network })
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        self.network.broadcast()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.network.contains(addr)
    }

    /// `2^(32 - prefix) - 2`, or zero for /31 and /32.
    pub fn host_count(&self) -> u64 {
        match self.prefix() {
            p if p > MAX_HOST_PREFIX => 0,
            p => (1u64 << (32 - u32::from(p))) - 2,
        }
    }

    /// Every address strictly between the network and broadcast address, ascending.
    ///
    /// Prefixes that leave no such address are a caller error rather than an
    /// empty sweep.
    pub fn hosts(&self) -> Result<HostRange, SweepError> {
        if self.host_count() == 0 {
            return Err(SweepError::InvalidSubnet {
                subnet: self.to_string(),
                reason: format!("a /{} prefix has no usable host addresses", self.prefix()),
            });
        }

        let network = u64::from(u32::from(self.network()));
        let broadcast = u64::from(u32::from(self.broadcast()));

        Ok(HostRange {
            front: network + 1,
            back: broadcast,
        })
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix())
    }
}

impl FromStr for Subnet {
    type Err = SweepError;

    /// Parses CIDR notation like "192.168.1.0/24". Host bits are cleared.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| SweepError::InvalidSubnet {
            subnet: s.to_string(),
            reason,
        };

        let Some((ip_str, prefix_str)) = s.trim().split_once('/') else {
            return Err(invalid("expected CIDR notation like 10.0.0.0/24".to_string()));
        };

        let addr = ip_str
            .parse::<Ipv4Addr>()
            .map_err(|e| invalid(format!("invalid IPv4 address '{ip_str}': {e}")))?;

        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|e| invalid(format!("invalid prefix '{prefix_str}': {e}")))?;

        Subnet::new(addr, prefix)
    }
}

/// Lazy, restartable walk over a subnet's host addresses.
///
/// Cloning yields an independent cursor at the same position, so the same
/// subnet always produces the same sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRange {
    // Half-open [front, back) kept in u64 so a /0 cannot overflow.
    front: u64,
    back: u64,
}

impl Iterator for HostRange {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let addr = Ipv4Addr::from(self.front as u32);
        self.front += 1;
        Some(addr)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back.saturating_sub(self.front);
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for HostRange {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(Ipv4Addr::from(self.back as u32))
    }
}

impl ExactSizeIterator for HostRange {}

impl FusedIterator for HostRange {}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
