use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::network::subnet::Subnet;

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn first_ipv4_in(&self, subnet: &Subnet) -> Option<Ipv4Network>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    fn first_ipv4_in(&self, subnet: &Subnet) -> Option<Ipv4Network> {
        // Configuration order, IPv6 skipped
        self.get_ipv4_nets()
            .into_iter()
            .find(|net| subnet.contains(net.ip()))
    }
}
