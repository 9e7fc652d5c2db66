//! Inference of elided posting amounts.
//!
//! An operation's postings are folded in file order carrying the last known amount.  A posting
//! without an amount receives the negation of that amount, in the same currency, which balances
//! the common two-line shorthand:
//!
//! ```text
//! 2024/1/5 Coffee
//!     Expenses:Food	$4.50
//!     Assets:Cash             ; becomes -$4.50
//! ```
//!
//! An inferred amount is itself the reference for a following elided posting.

use std::borrow::Cow;

use log::debug;

use plain_ledger_core as bc;

use super::error::{ParseError, ParseResult};
use super::{RawLedger, RawOperation};

/// Infers every elided amount of `raw` and builds the typed ledger.
pub fn infer_ledger(raw: RawLedger<'_>) -> ParseResult<bc::Ledger<'_>> {
    let mut ledger = bc::Ledger::new();
    let mut inferred = 0;
    for (_, operation) in raw {
        let elided = operation
            .postings
            .iter()
            .filter(|p| p.split().1.is_none())
            .count();
        inferred += elided;
        ledger.insert(infer_operation(operation)?);
    }
    debug!("inferred {} elided amounts", inferred);
    Ok(ledger)
}

pub fn infer_operation(raw: RawOperation<'_>) -> ParseResult<bc::Operation<'_>> {
    let key = raw.key();
    let mut last: Option<bc::Amount<'_>> = None;
    let mut postings = Vec::with_capacity(raw.postings.len());

    for posting in &raw.postings {
        let (path, expr) = posting.split();
        let account = bc::Account::from_path(path);
        if account.is_empty() {
            return Err(ParseError::invalid_input(
                format!("posting '{}' has no account", posting.text.trim()),
                posting.line,
            ));
        }
        let units = match expr {
            Some(expr) => super::amount(expr).map_err(|e| e.at_line(posting.line))?,
            None => match &last {
                Some(reference) => -reference,
                None => return Err(ParseError::no_reference_currency(&key, posting.line)),
            },
        };
        last = Some(units.clone());
        postings.push(bc::Posting::builder().account(account).units(units).build());
    }

    Ok(bc::Operation::builder()
        .date(raw.date)
        .description(Cow::Borrowed(raw.description))
        .postings(postings)
        .build())
}
