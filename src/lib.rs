//! Reads plain-text double-entry ledgers and renders them as a listing, a balance tree or a
//! running-balance register.
//!
//! ```text
//! 2024/1/5 Coffee
//!     Expenses:Food	$4.50
//!     Assets:Cash
//! ```
//!
//! The pipeline is: resolve `!include` directives, parse operations, infer elided amounts,
//! filter and sort, then render one of the [`View`]s.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use plain_ledger_core::{AccountFilter, BalanceReport, Depth, Ledger, Overflow, Register};
use plain_ledger_parser::error::ParseError;
use plain_ledger_render::{RenderError, Renderer, TextRenderer};

pub use source::{resolve_includes, FsSource, MemorySource, SourceError, TextSource};

pub mod source;

#[derive(Error, Debug)]
pub enum Error {
    #[error("included file {} does not exist", path.display())]
    MissingIncludeFile { path: PathBuf },
    #[error("{} is included from itself", path.display())]
    IncludeCycle { path: PathBuf },
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("failed to parse ledger")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Overflow(#[from] Overflow),
    #[error("failed to write output")]
    Render(#[from] RenderError),
}

/// The three ways of looking at a ledger.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum View {
    /// Every operation with its postings, amounts filled in.
    Print { sort: bool },
    /// Per-account totals and a grand total.
    Balance { depth: Depth },
    /// Postings one by one with the running balance.
    Register { sort: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub view: View,

    /// Account tokens; postings matching none of them are dropped.  Empty keeps everything.
    pub accounts: Vec<String>,

    pub color: bool,
}

impl Query {
    pub fn new(view: View) -> Self {
        Query {
            view,
            accounts: Vec::new(),
            color: false,
        }
    }
}

/// Parses a ledger whose includes are already resolved and applies the account filter.
pub fn read_ledger<'a>(text: &'a str, filter: &AccountFilter) -> Result<Ledger<'a>, Error> {
    let ledger = plain_ledger_parser::parse(text)?;
    debug!("parsed {} operations", ledger.len());
    if filter.is_empty() {
        return Ok(ledger);
    }
    Ok(ledger.filter_accounts(filter))
}

/// Loads the ledger at `path` from `source` and renders `query` into `w`.
///
/// Nothing is written unless the whole ledger, included files and all, reads and parses and the
/// requested balances are all in range.
pub fn run<S, W>(source: &S, path: &Path, query: &Query, w: &mut W) -> Result<(), Error>
where
    S: TextSource + ?Sized,
    W: Write,
{
    let text = resolve_includes(source, path)?;
    let ledger = read_ledger(&text, &AccountFilter::new(&query.accounts))?;
    let renderer = TextRenderer::with_color(query.color);
    match query.view {
        View::Print { sort } => {
            let ledger = sorted(ledger, sort);
            renderer.render(&ledger, w)?;
        }
        View::Balance { depth } => {
            let report = BalanceReport::build(&ledger, depth)?;
            debug!("balance report has {} accounts", report.len());
            renderer.render(&report, w)?;
        }
        View::Register { sort } => {
            let ledger = sorted(ledger, sort);
            let entries = Register::new(&ledger).collect::<Result<Vec<_>, _>>()?;
            renderer.render(&entries[..], w)?;
        }
    }
    Ok(())
}

fn sorted(ledger: Ledger<'_>, sort: bool) -> Ledger<'_> {
    if sort {
        ledger.sort_by_date()
    } else {
        ledger
    }
}
