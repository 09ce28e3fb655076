//! Command-line arguments for the `folio` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    about = "Portfolio site widgets: hero typewriter, contact form relay, health check"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Site configuration file (YAML/TOML/JSON). Skipped when missing.
    #[arg(long, short, env = "FOLIO_CONFIG", default_value = "folio.yaml", global = true)]
    pub config: PathBuf,

    /// Mirror log events to stderr as well as the log file.
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Animate the hero typewriter in the terminal.
    Typewriter(TypewriterArgs),

    /// Send one contact form submission through the relay.
    Contact(ContactArgs),

    /// Print the site health report as JSON.
    Health,
}

#[derive(Args, Debug)]
pub struct TypewriterArgs {
    /// Stop after this many full rotations (runs until Ctrl-C otherwise).
    #[arg(long)]
    pub rotations: Option<usize>,

    /// Phrases to cycle through, replacing the configured ones.
    #[arg(value_name = "PHRASE")]
    pub phrases: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ContactArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub subject: String,

    #[arg(long)]
    pub message: String,

    /// Relay access key; overrides `contact.access_key`.
    #[arg(long, env = "WEB3FORMS_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// Relay endpoint; overrides `contact.endpoint`.
    #[arg(long)]
    pub endpoint: Option<String>,
}
