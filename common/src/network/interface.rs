//! Resolves the local interface a sweep is issued from.
//!
//! The selected address is diagnostic only: the probing engine never binds
//! to it, but callers report it next to the results.

use std::fmt;

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::Ipv4Network;
use tracing::debug;

use crate::error::SweepError;
use crate::network::subnet::Subnet;
use crate::utils::interface::NetworkInterfaceExtension;

/// Source of the host's network interfaces.
pub trait InterfaceRepository: Send + Sync {
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, SweepError>;
}

/// Reads interfaces from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInterfaces;

impl InterfaceRepository for SystemInterfaces {
    fn interfaces(&self) -> Result<Vec<NetworkInterface>, SweepError> {
        Ok(datalink::interfaces())
    }
}

/// The local address picked for a sweep and the interface carrying it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAddress {
    pub interface: String,
    pub address: Ipv4Network,
}

impl fmt::Display for SourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.address, self.interface)
    }
}

pub fn lookup_interface(
    repo: &dyn InterfaceRepository,
    name: &str,
) -> Result<NetworkInterface, SweepError> {
    let interfaces: Vec<NetworkInterface> = repo.interfaces().map_err(|e| match e {
        SweepError::InterfaceLookup { .. } => e,
        other => SweepError::InterfaceLookup {
            name: name.to_string(),
            reason: other.to_string(),
        },
    })?;

    interfaces
        .into_iter()
        .find(|intf| intf.name == name)
        .ok_or_else(|| SweepError::InterfaceLookup {
            name: name.to_string(),
            reason: "no such interface".to_string(),
        })
}

/// Picks the first IPv4 address on `intf` that lies inside `subnet`.
pub fn select_source_address(
    intf: &NetworkInterface,
    subnet: &Subnet,
) -> Result<SourceAddress, SweepError> {
    let address = intf
        .first_ipv4_in(subnet)
        .ok_or_else(|| SweepError::NoAddressInSubnet {
            interface: intf.name.clone(),
            subnet: subnet.to_string(),
        })?;

    debug!(interface = %intf.name, %address, %subnet, "selected source address");

    Ok(SourceAddress {
        interface: intf.name.clone(),
        address,
    })
}

/// Convenience wrapper: lookup followed by selection.
pub fn resolve_source(
    repo: &dyn InterfaceRepository,
    name: &str,
    subnet: &Subnet,
) -> Result<SourceAddress, SweepError> {
    let intf = lookup_interface(repo, name)?;
    select_source_address(&intf, subnet)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
