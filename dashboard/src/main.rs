//! `dashboard` entry-point: loads configuration and runs one CLI command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;

use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use dashboard::config::DashboardSettings;
use dashboard::inbound::cli::{self, Cli};

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = Cli::parse();
    // Only the environment and config files feed settings; flags belong to clap.
    let settings = DashboardSettings::load_from_iter([OsString::from("dashboard")])
        .map_err(|error| eyre::eyre!("load dashboard configuration: {error}"))?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    let stdout = io::stdout();
    runtime.block_on(cli::run(args, &settings, &mut stdout.lock()))
}
