#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod commands;
mod error_fmt;
mod logging;
mod render;

use clap::Parser;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;
    let cfg = commands::load_config(&cli.config)?;
    let _guard = logging::init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "configuration loaded");

    match cli.cmd {
        Commands::Run { cycles, dry_run } => commands::run(&cfg, cycles, dry_run, cli.json),
        Commands::SelfCheck => commands::self_check(&cfg, cli.json),
        Commands::ShowConfig => commands::show_config(&cfg, cli.json),
    }
}

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}
