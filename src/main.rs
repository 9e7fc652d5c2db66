use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use plain_ledger::FsSource;

mod cli;

use cli::Cli;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let path = cli.path();
    let query = cli.query();
    debug!("{:?} on {}", query.view, path.display());

    // Rendered into a buffer so a failure leaves stdout untouched.
    let mut out = Vec::new();
    plain_ledger::run(&FsSource, &path, &query, &mut out)
        .with_context(|| format!("could not read ledger {}", path.display()))?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    stdout.write_all(&out)?;
    stdout.flush()?;
    Ok(())
}
