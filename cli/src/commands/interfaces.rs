use pnet::datalink::NetworkInterface;

use pingsweep_common::network::interface::{InterfaceRepository, SystemInterfaces};

use crate::terminal::{format, print};

pub fn interfaces() -> anyhow::Result<()> {
    let interfaces: Vec<NetworkInterface> = SystemInterfaces.interfaces()?;

    if interfaces.is_empty() {
        print::no_results();
        return Ok(());
    }

    for (idx, intf) in interfaces.iter().enumerate() {
        format::print_interface(intf, idx);
    }
    Ok(())
}
