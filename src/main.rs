mod cli;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli::logging::init(cli.verbose);
    cli::run(cli)
}
