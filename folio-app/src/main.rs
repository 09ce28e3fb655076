use anyhow::Result;
use clap::Parser;
use folio_common::observability::{LogConfig, LogFormat, init_logging};
use folio_config::{SiteConfig, SiteConfigLoader};

mod cli;
mod commands;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins; a missing file just means defaults)
    let cfg: SiteConfig = SiteConfigLoader::new()
        .with_optional_file(&cli.config)
        .load()?;

    // 2) Logging, as configured
    init_logging(log_config(&cfg, cli.verbose)?)?;
    tracing::debug!(config = %cli.config.display(), "folio.start");

    match cli.command {
        Command::Typewriter(args) => commands::run_typewriter(&cfg, args).await,
        Command::Contact(args) => {
            if !commands::run_contact(&cfg, args).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Health => commands::run_health(),
    }
}

fn log_config(cfg: &SiteConfig, verbose: bool) -> Result<LogConfig> {
    let format: LogFormat = cfg
        .logging
        .format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    Ok(LogConfig {
        log_dir: cfg.logging.dir.as_ref().map(Into::into),
        emit_stderr: verbose || cfg.logging.emit_stderr,
        format,
        default_filter: cfg.logging.filter.clone(),
        ..LogConfig::default()
    })
}
