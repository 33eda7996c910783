mod cli;
mod commands;
mod import;
mod projection;
mod render;
#[cfg(test)]
mod test_support;
mod track_geo;
mod transform;
mod types;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // initialize tracing, stdout is kept for command output
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    commands::dispatch(cli.command)
}
