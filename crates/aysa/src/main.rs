//! AySA CLI - registry tagging and remote deployments
//!
//! This is the main entry point for the aysa command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Must happen before any TLS operation (rustls 0.23+)
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let env = cli.env.as_deref();
    match cli.command {
        Commands::Version(args) => commands::version::run(args, env),
        Commands::Config(args) => commands::config::run(args, env),
        Commands::Registry(args) => commands::registry::run(args, env).await,
        Commands::Release(args) => commands::release::run(args, env).await,
        Commands::Remote(args) => commands::remote::run(args, env).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
