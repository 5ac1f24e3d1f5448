use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use colored::*;
use tracing::warn;

use pingsweep_common::config::{self, PoolConfig};
use pingsweep_common::network::interface::SystemInterfaces;
use pingsweep_common::network::subnet::Subnet;
use pingsweep_common::success;
use pingsweep_core::probe::IcmpProber;
use pingsweep_core::sweep::{SubnetSweep, SweepService};
use pingsweep_core::engine::Unthrottled;

use crate::terminal::{colors, print};

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Subnet in CIDR notation, e.g. 192.168.1.0/24
    pub subnet: Subnet,

    /// Interface holding an address inside the subnet
    #[arg(short, long)]
    pub interface: String,

    /// Wait bound for each echo reply, in milliseconds
    #[arg(
        long,
        default_value_t = config::DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..=config::MAX_PROBE_TIMEOUT.as_millis() as u64)
    )]
    pub timeout_ms: u64,

    /// Echo requests per host
    #[arg(
        short,
        long,
        default_value_t = config::DEFAULT_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(config::MAX_ATTEMPTS))
    )]
    pub attempts: u32,

    /// Concurrent probe workers [default: 2 x available parallelism]
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Spacing between the attempts sent to one host, in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_PROBE_INTERVAL.as_millis() as u64)]
    pub probe_interval_ms: u64,

    /// Spacing between two dispatched hosts, in milliseconds
    #[arg(long, default_value_t = config::DEFAULT_DISPATCH_INTERVAL.as_millis() as u64)]
    pub dispatch_interval_ms: u64,

    /// Dispatch hosts as fast as the workers accept them
    #[arg(long)]
    pub no_throttle: bool,
}

impl SweepArgs {
    pub fn pool_config(&self) -> anyhow::Result<PoolConfig> {
        let mut builder = PoolConfig::builder()
            .probe_timeout(Duration::from_millis(self.timeout_ms))
            .attempts(self.attempts)
            .probe_interval(Duration::from_millis(self.probe_interval_ms))
            .dispatch_interval(Duration::from_millis(self.dispatch_interval_ms));

        if let Some(workers) = self.workers {
            builder = builder.worker_count(workers);
        }

        builder.build().context("invalid sweep settings")
    }
}

pub async fn sweep(args: SweepArgs, quiet: u8) -> anyhow::Result<()> {
    let cfg: Arc<PoolConfig> = Arc::new(args.pool_config()?);

    if !is_root::is_root() {
        warn!("Raw ICMP sockets usually need root or CAP_NET_RAW; probes may fail");
    }

    print_settings(&args, &cfg, quiet);

    let mut service = SweepService::new(
        Arc::clone(&cfg),
        Box::new(SystemInterfaces),
        Arc::new(IcmpProber::default()),
    );
    if args.no_throttle {
        service = service.with_throttle(Arc::new(Unthrottled));
    }

    let start_time: Instant = Instant::now();
    let sweep: SubnetSweep = service
        .scan_subnet(&args.subnet, &args.interface)
        .await
        .with_context(|| format!("sweep of {} via {} failed", args.subnet, args.interface))?;

    sweep_ends(&sweep, start_time.elapsed(), quiet);
    Ok(())
}

fn print_settings(args: &SweepArgs, cfg: &PoolConfig, quiet: u8) {
    if quiet > 0 {
        return;
    }

    let throttle: String = if args.no_throttle {
        "off".to_string()
    } else {
        format!("{} ms", cfg.dispatch_interval().as_millis())
    };

    print::aligned_line("Subnet", args.subnet.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("Interface", args.interface.as_str());
    print::aligned_line("Workers", cfg.worker_count().to_string());
    print::aligned_line("Timeout", format!("{} ms", cfg.probe_timeout().as_millis()));
    print::aligned_line("Attempts", cfg.attempts().to_string());
    print::aligned_line("Throttle", throttle);
}

fn sweep_ends(sweep: &SubnetSweep, total_time: Duration, quiet: u8) {
    if quiet == 0 {
        print::aligned_line("Source", sweep.source.to_string().color(colors::ACCENT));
    }

    if !sweep.result.failures.is_empty() {
        warn!(
            "{} of {} probes failed; those hosts are reported as unreachable",
            sweep.result.failures.len(),
            sweep.result.dispatched
        );
    }

    if sweep.result.is_empty() {
        print::header("zero hosts responded", quiet);
        print::no_results();
        return;
    }

    print::header("live hosts", quiet);
    let hosts = sweep.result.sorted();
    for (idx, host) in hosts.iter().enumerate() {
        match quiet {
            2.. => print::print(&host.to_string()),
            _ => print::tree_head(idx, &host.to_string()),
        }
    }

    print_summary(hosts.len(), sweep.result.dispatched, total_time, quiet);
}

fn print_summary(live: usize, probed: u64, total_time: Duration, quiet: u8) {
    if quiet > 1 {
        return;
    }

    let live_hosts: ColoredString = format!("{live} live hosts").bold().green();
    let probed: ColoredString = format!("{probed} probed").bold();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    match quiet {
        0 => {
            print::fat_separator();
            print::centerln(&format!("Sweep Complete: {live_hosts} of {probed} in {total_time}"));
        }
        _ => success!("Sweep complete: {live_hosts} of {probed} in {total_time}"),
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
