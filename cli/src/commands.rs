pub mod interfaces;
pub mod sweep;

use clap::{ArgAction, Parser, Subcommand};

use sweep::SweepArgs;

#[derive(Parser)]
#[command(name = "pingsweep")]
#[command(version, about = "Find live hosts on an IPv4 subnet with ICMP echo.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Less output; repeat to hide headers and the summary
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// More log output; repeat for per-probe tracing
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ping every host address of a subnet and list the ones that answer
    #[command(alias = "s")]
    Sweep(SweepArgs),
    /// Show the local interfaces and their addresses
    #[command(alias = "i")]
    Interfaces,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
