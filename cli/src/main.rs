mod commands;
mod terminal;

use commands::{CommandLine, Commands, interfaces, sweep};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);
    print::banner(commands.quiet);

    match commands.command {
        Commands::Sweep(args) => {
            print::header("getting ready to sweep", commands.quiet);
            sweep::sweep(args, commands.quiet).await
        }
        Commands::Interfaces => {
            print::header("local interfaces", commands.quiet);
            interfaces::interfaces()
        }
    }
}
