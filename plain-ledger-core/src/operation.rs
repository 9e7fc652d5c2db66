use std::borrow::Cow;

use typed_builder::TypedBuilder;

use super::date::Date;
use super::posting::Posting;

/// A dated ledger entry grouping related postings.
///
/// ```text
/// 2024/1/5 Coffee
///     Expenses:Food	$4.50
///     Assets:Cash
/// ```
///
/// Per currency, the amounts of all postings of an operation are expected to sum up to zero.  The
/// parser restores this for an operation with a single elided amount; operations that are written
/// out completely are taken as they are.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Operation<'a> {
    pub date: Date,

    /// Free text following the date on the header line.
    pub description: Cow<'a, str>,

    #[builder(default)]
    pub postings: Vec<Posting<'a>>,
}

impl<'a> Operation<'a> {
    /// Key identifying the operation inside a [`Ledger`](crate::Ledger): the ISO date followed by
    /// the description, e.g. `2024-01-05 Coffee`.
    pub fn key(&self) -> String {
        operation_key(&self.date, &self.description)
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}

pub fn operation_key(date: &Date, description: &str) -> String {
    format!("{} {}", date, description)
}
