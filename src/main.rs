use clap::Parser;
use tracing_subscriber::EnvFilter;

mod assignment;
mod catalog;
mod cli;
mod config;
mod contamination;
mod core;
mod diversity;
mod matching;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("edna_core=debug,info")
    } else {
        EnvFilter::new("edna_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Assign(args) => {
            cli::assign::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Screen(args) => {
            cli::screen::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Diversity(args) => {
            cli::diversity::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Catalog(args) => {
            cli::catalog::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
