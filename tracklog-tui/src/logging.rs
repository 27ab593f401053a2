use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use log::LevelFilter;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::cli;

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        std::env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref LOG_ENV: String = "TUI_LOGLEVEL".to_string();
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tracklog", env!("CARGO_PKG_NAME"))
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Level requested through `RUST_LOG` or `TUI_LOGLEVEL`, `info` otherwise.
pub fn level_from_env() -> LevelFilter {
    let level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var(LOG_ENV.clone()))
        .unwrap_or("info".to_string())
        .to_ascii_lowercase();
    parse_level(&level)
}

fn parse_level(level: &str) -> LevelFilter {
    match level {
        "off" => LevelFilter::Off,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Routes `tracing` events to the in-app log pane, and with `--log-file` to a
/// file in the data directory as well. Returns the log directory, empty when
/// logging to the pane only.
pub fn initialize(cli: &ArgMatches) -> Result<PathBuf> {
    let level = level_from_env();
    std::env::set_var(
        "RUST_LOG",
        std::env::var("RUST_LOG")
            .or_else(|_| std::env::var(LOG_ENV.clone()))
            .unwrap_or_else(|_| "info".to_string()),
    );

    let log_dir = if cli::tui_log_to_file(cli) {
        let directory = get_data_dir();
        std::fs::create_dir_all(directory.clone())?;
        let log_path = directory.join(LOG_FILE.clone());
        let log_file = std::fs::File::create(log_path)?;

        let file_subscriber = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_writer(log_file)
            .with_target(false)
            .with_ansi(false)
            .with_filter(tracing_subscriber::filter::EnvFilter::from_default_env());
        tracing_subscriber::registry()
            .with(file_subscriber)
            .with(ErrorLayer::default())
            .with(tui_logger::TuiTracingSubscriberLayer)
            .init();
        info!("Full log available in: {}", directory.to_string_lossy());
        directory
    } else {
        tracing_subscriber::registry()
            .with(ErrorLayer::default())
            .with(tui_logger::TuiTracingSubscriberLayer)
            .init();
        PathBuf::new()
    };

    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);
    Ok(log_dir)
}
