//! ICMPv4 echo prober.
//!
//! Each probe opens its own raw layer-4 channel, which requires root or
//! `CAP_NET_RAW`. Raw ICMP sockets see every echo reply on the host, so
//! replies are matched on source address, identifier and sequence.

use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::{
    self, IcmpTransportChannelIterator, TransportChannelType, TransportProtocol, TransportReceiver,
    TransportSender,
};
use tracing::{trace, warn};

use pingsweep_protocols::icmp;

use super::{ProbeError, ProbeParams, ProbeStats, Prober};

const TRANSPORT_BUFFER_SIZE: usize = 4096;
const CHANNEL_TYPE_ICMP: TransportChannelType =
    TransportChannelType::Layer4(TransportProtocol::Ipv4(IpNextHeaderProtocols::Icmp));
const DEFAULT_PAYLOAD: &[u8] = b"pingsweep";

#[derive(Debug, Clone)]
pub struct IcmpProber {
    payload: Vec<u8>,
}

impl Default for IcmpProber {
    fn default() -> Self {
        Self::with_payload(DEFAULT_PAYLOAD.to_vec())
    }
}

impl IcmpProber {
    pub fn with_payload(payload: Vec<u8>) -> Self {
        Self { payload }
    }
}

impl Prober for IcmpProber {
    fn probe(&self, addr: Ipv4Addr, params: &ProbeParams) -> Result<ProbeStats, ProbeError> {
        let (tx, mut rx) = open_channel().map_err(|e| ProbeError::Construction(e.to_string()))?;
        let mut session = IcmpSession {
            tx,
            replies: transport::icmp_packet_iter(&mut rx),
            addr,
            identifier: rand::random(),
            payload: &self.payload,
        };

        let stats = run_attempts(&mut session, addr, params)?;
        trace!(%addr, sent = stats.sent, received = stats.received, "icmp probe finished");
        Ok(stats)
    }
}

/// One echo exchange at a time with a single host.
trait EchoChannel {
    fn send(&mut self, sequence: u16) -> Result<(), ProbeError>;

    /// `Ok(false)` when no matching reply arrived within `timeout`.
    fn wait(&mut self, sequence: u16, timeout: Duration) -> Result<bool, ProbeError>;
}

/// Sends `params.attempts` echo requests and counts the answered ones.
///
/// The first error ends the exchange. It is returned only while no reply has
/// been counted; once the host answered, it stays reachable.
fn run_attempts<C: EchoChannel>(
    channel: &mut C,
    addr: Ipv4Addr,
    params: &ProbeParams,
) -> Result<ProbeStats, ProbeError> {
    let attempts: u16 = u16::try_from(params.attempts).map_err(|_| {
        ProbeError::Construction(format!(
            "{} attempts exceed the echo sequence space",
            params.attempts
        ))
    })?;
    let mut stats = ProbeStats::default();

    for sequence in 0..attempts {
        let exchange = channel.send(sequence).and_then(|()| {
            stats.sent += 1;
            channel.wait(sequence, params.timeout)
        });

        match exchange {
            Ok(true) => stats.received += 1,
            Ok(false) => {}
            Err(e) if stats.received > 0 => {
                warn!(%addr, sequence, error = %e, "echo exchange failed after a reply, keeping host");
                break;
            }
            Err(e) => return Err(e),
        }

        if sequence + 1 < attempts && !params.interval.is_zero() {
            std::thread::sleep(params.interval);
        }
    }

    Ok(stats)
}

struct IcmpSession<'a> {
    tx: TransportSender,
    replies: IcmpTransportChannelIterator<'a>,
    addr: Ipv4Addr,
    identifier: u16,
    payload: &'a [u8],
}

impl EchoChannel for IcmpSession<'_> {
    fn send(&mut self, sequence: u16) -> Result<(), ProbeError> {
        let request = icmp::build_echo_request(self.identifier, sequence, self.payload)
            .map_err(|e| ProbeError::Construction(e.to_string()))?;
        let packet = IcmpPacket::new(&request)
            .ok_or_else(|| ProbeError::Construction("echo request too short".to_string()))?;

        self.tx
            .send_to(packet, IpAddr::V4(self.addr))
            .map(|_| ())
            .map_err(|e| ProbeError::Io(e.to_string()))
    }

    fn wait(&mut self, sequence: u16, timeout: Duration) -> Result<bool, ProbeError> {
        await_reply(&mut self.replies, self.addr, self.identifier, sequence, timeout)
    }
}

fn open_channel() -> std::io::Result<(TransportSender, TransportReceiver)> {
    transport::transport_channel(TRANSPORT_BUFFER_SIZE, CHANNEL_TYPE_ICMP)
}

/// Reads until the matching reply arrives or `timeout` runs out.
fn await_reply(
    replies: &mut IcmpTransportChannelIterator<'_>,
    addr: Ipv4Addr,
    identifier: u16,
    sequence: u16,
    timeout: Duration,
) -> Result<bool, ProbeError> {
    let deadline = Instant::now()
        .checked_add(timeout)
        .ok_or_else(|| ProbeError::Construction(format!("reply timeout {timeout:?} out of range")))?;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(false);
        }

        match replies.next_with_timeout(remaining) {
            Ok(Some((packet, source))) => {
                if source != IpAddr::V4(addr) {
                    continue;
                }
                let matches = icmp::parse_echo_reply(packet.packet())
                    .is_some_and(|reply| reply.identifier == identifier && reply.sequence == sequence);
                if matches {
                    return Ok(true);
                }
            }
            Ok(None) => return Ok(false),
            Err(e) => return Err(ProbeError::Io(e.to_string())),
        }
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
