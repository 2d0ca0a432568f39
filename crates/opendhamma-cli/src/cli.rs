//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Browse Markdown vaults hosted on GitHub.
#[derive(Debug, Parser)]
#[command(name = "opendhamma", version, about)]
pub struct Cli {
    /// Path to the vault registry file (overrides VAULT_REGISTRY_PATH)
    #[arg(long, global = true)]
    pub registry: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the registered vaults
    Vaults,
    /// Show a file or directory from a vault
    Show {
        /// Vault id from the registry
        vault_id: String,
        /// Path inside the vault (empty for the vault root)
        #[arg(default_value = "")]
        path: String,
        /// Git revision (branch, tag, or commit) to read from
        #[arg(long = "ref")]
        reference: Option<String>,
    },
    /// Show a sutta from the default vault, e.g. `sutta mn mn10`
    Sutta {
        /// Nikaya (collection) identifier, e.g. `mn` or `sn`
        nikaya: String,
        /// Sutta identifier, e.g. `mn10` or `sn56.11`
        sutta: String,
    },
    /// List the outgoing wiki links of a Markdown document
    Links {
        vault_id: String,
        path: String,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
