use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod dispatch;
mod provider;
mod web;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("beacon_hub=debug,info")
    } else {
        EnvFilter::new("beacon_hub=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Query(args) => {
            cli::query::run(args, cli.format, &cli.engine, cli.verbose)?;
        }
        cli::Commands::Catalog(args) => {
            cli::catalog::run(args, cli.format, &cli.engine, cli.verbose)?;
        }
        cli::Commands::Serve(args) => {
            web::server::run(args, &cli.engine)?;
        }
    }

    Ok(())
}
