use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use plain_ledger::{Query, View};
use plain_ledger_core::Depth;

/// Reads a plain-text double-entry ledger
#[derive(Parser, Debug)]
#[command(name = "plain-ledger", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the ledger files
    #[arg(long, env = "PLAIN_LEDGER_DIR", default_value = "ledger_files", global = true)]
    pub dir: PathBuf,

    /// Ledger file to read, relative to --dir
    #[arg(short, long, env = "PLAIN_LEDGER_FILE", default_value = "index.ledger", global = true)]
    pub file: PathBuf,

    /// Disable colored output (also disabled when NO_COLOR is set)
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List operations and their postings
    Print {
        #[command(flatten)]
        filter: FilterArgs,

        /// Order operations by date
        #[arg(short, long)]
        sort: bool,
    },

    /// Show account balances
    #[command(alias = "bal")]
    Balance {
        #[command(flatten)]
        filter: FilterArgs,

        /// Show every level of the account tree, not only the top-level accounts
        #[arg(long)]
        full: bool,
    },

    /// Show postings with a running balance
    #[command(alias = "reg")]
    Register {
        #[command(flatten)]
        filter: FilterArgs,

        /// Order operations by date
        #[arg(short, long)]
        sort: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only postings to accounts containing this path segment (repeatable)
    #[arg(short, long = "account", num_args = 1..)]
    pub accounts: Vec<String>,
}

impl Cli {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file)
    }

    pub fn color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }

    pub fn query(&self) -> Query {
        let (view, filter) = match &self.command {
            Commands::Print { filter, sort } => (View::Print { sort: *sort }, filter),
            Commands::Balance { filter, full } => {
                let depth = if *full { Depth::Full } else { Depth::Root };
                (View::Balance { depth }, filter)
            }
            Commands::Register { filter, sort } => (View::Register { sort: *sort }, filter),
        };
        Query {
            view,
            accounts: filter.accounts.clone(),
            color: self.color(),
        }
    }
}
