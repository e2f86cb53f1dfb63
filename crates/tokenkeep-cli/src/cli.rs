use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

/// CLI surface definition.
#[derive(Parser, Debug)]
#[command(
    name = "tokenkeep",
    about = "Local credential storage with optional encryption at rest",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Namespace directory to operate on (defaults to config, then `tokenkeep`).
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the credential stored under a key.
    Get { key: String },
    /// Store (or overwrite) a credential under a key.
    Store {
        key: String,
        #[arg(long)]
        id: String,
        #[arg(long)]
        token: String,
        /// Expiry as an RFC 3339 timestamp.
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,
    },
    /// Remove the credential stored under a key.
    Remove { key: String },
    /// Run a store/get/remove round-trip against the configured storage.
    Health,
    /// Print version and exit.
    Version,
    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigCommand {
    /// Create a default config file if one does not exist.
    Init,
}
