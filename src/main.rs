use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use warpack::commands;
use warpack::config::{Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Command::List {
            layout,
            json,
            resolve,
        } => commands::list::run(layout, *json, resolve)
            .with_context(|| format!("cannot list {}", layout.display())),
        Command::Stage {
            layout,
            out_dir,
            verify,
            no_progress,
            resolve,
        } => commands::stage::run(layout, out_dir, *verify, *no_progress, resolve)
            .map(|_| ())
            .with_context(|| format!("cannot stage {}", layout.display())),
    };

    if let Err(err) = &result {
        if let Some(hint) = err
            .downcast_ref::<warpack::SpecError>()
            .and_then(commands::suggestion)
        {
            eprintln!("Try: {}", hint);
        }
    }
    result
}

/// `RUST_LOG` wins unless `-v` is given
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warpack=warn")),
        1 => EnvFilter::new("warpack=debug"),
        _ => EnvFilter::new("warpack=trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
