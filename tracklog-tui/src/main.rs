use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracklog_device::{cli::Command, tracklog::PortProvider, SerialProvider};

mod cli;
mod logging;
mod stream;
mod tui;
mod ui;

fn main() -> Result<()> {
    let cli = cli::parse_args().get_matches();

    if cli::tui_debug_mode(&cli) {
        device_debug_mode(&cli)?;
    } else {
        let log_dir = logging::initialize(&cli)?;
        crate::tui::run(&cli, &log_dir)?;
    }
    Ok(())
}

fn device_debug_mode(cli: &ArgMatches) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(logging::level_from_env())
        .init();

    let mut provider = SerialProvider::new(Command::port_settings(cli)?);
    let port = provider.acquire().context("Couldn't connect to GPS")?;
    stream::run(port, Path::new(stream::STREAM_LOG))
}
