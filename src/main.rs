//! Lander - asset pipeline, dev server and signup client for static landing sites.

mod asset;
mod cli;
mod config;
mod core;
mod embed;
mod logger;
mod reload;
mod signup;
mod task;
mod utils;
mod watch;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;
use std::sync::Arc;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(SiteConfig::load(&cli)?);

    match cli.command() {
        Commands::Auth { args } => cli::auth::run_auth(&config, args),
        command => {
            let Some(graph) = cli::build::graph_for(command, &config) else {
                return Ok(());
            };
            if cli.is_dev() {
                cli::serve::run_dev(config, &graph)
            } else {
                cli::build::run_build(config, &graph)
            }
        }
    }
}
