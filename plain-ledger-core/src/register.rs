use std::borrow::Cow;

use super::account::Account;
use super::amount::Amount;
use super::balance::{Balance, Overflow};
use super::date::Date;
use super::operation::Operation;
use super::posting::Posting;
use super::Ledger;

/// One line of the register: a posting together with the running balance after it.
#[derive(Clone, Debug, PartialEq)]
pub struct RegisterEntry<'r, 'a> {
    pub date: Date,
    pub description: &'r Cow<'a, str>,
    pub account: &'r Account<'a>,
    pub amount: &'r Amount<'a>,

    /// Sum, per currency, of every posting replayed so far, this one included.
    pub running: Balance<'a>,
}

impl RegisterEntry<'_, '_> {
    /// Key of the operation the posting belongs to.
    pub fn key(&self) -> String {
        super::operation::operation_key(&self.date, self.description)
    }
}

/// Replays the postings of a ledger in ledger order, carrying a running balance across
/// operations.  Filter and sort the ledger beforehand to change what is replayed.
///
/// Yields an error, and nothing after it, once the running balance of a currency overflows.
pub struct Register<'r, 'a> {
    operations: indexmap::map::Values<'r, String, Operation<'a>>,
    current: Option<(&'r Operation<'a>, std::slice::Iter<'r, Posting<'a>>)>,
    running: Balance<'a>,
    failed: bool,
}

impl<'r, 'a> Register<'r, 'a> {
    pub fn new(ledger: &'r Ledger<'a>) -> Self {
        Register {
            operations: ledger.operations.values(),
            current: None,
            running: Balance::new(),
            failed: false,
        }
    }

    fn next_posting(&mut self) -> Option<(&'r Operation<'a>, &'r Posting<'a>)> {
        loop {
            if let Some((operation, postings)) = &mut self.current {
                if let Some(posting) = postings.next() {
                    return Some((*operation, posting));
                }
            }
            let operation = self.operations.next()?;
            self.current = Some((operation, operation.postings.iter()));
        }
    }
}

impl<'r, 'a> Iterator for Register<'r, 'a> {
    type Item = Result<RegisterEntry<'r, 'a>, Overflow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let (operation, posting) = self.next_posting()?;
        if let Err(e) = self.running.add(&posting.units) {
            self.failed = true;
            return Some(Err(e));
        }
        Some(Ok(RegisterEntry {
            date: operation.date,
            description: &operation.description,
            account: &posting.account,
            amount: &posting.units,
            running: self.running.clone(),
        }))
    }
}
