//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bulk user lifecycle operations against an identity environment
#[derive(Parser, Debug)]
#[command(name = "idm-bulk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run configuration file (YAML)
    #[arg(short = 'C', long, global = true, default_value = "idm-bulk.yaml")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate and report the existing user count
    Check,

    /// Delete users
    Delete {
        #[command(subcommand)]
        mode: DeleteMode,
    },

    /// Import users from a CSV file
    Import {
        /// CSV file (overrides `csv_path` from the config)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Skip the header and population cross-check
        #[arg(long)]
        skip_preflight: bool,
    },
}

/// Which users a delete run targets
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DeleteMode {
    /// Every user in the environment
    All,

    /// Members of one group
    Group {
        /// Group id
        #[arg(long)]
        group_id: String,
    },

    /// Users that have not signed on for N days
    Inactive {
        /// Days without a sign-on
        #[arg(long)]
        days: u32,

        /// Also delete users that never signed on
        #[arg(long)]
        include_never_signed_on: bool,
    },

    /// Users still awaiting verification N days after creation
    Unverified {
        /// Minimum account age in days
        #[arg(long)]
        days: u32,
    },
}

impl DeleteMode {
    /// Server-side list filter for this mode
    pub fn list_filter(&self) -> Option<String> {
        match self {
            Self::Group { group_id } => Some(format!("memberOfGroups[id eq \"{group_id}\"]")),
            _ => None,
        }
    }
}
