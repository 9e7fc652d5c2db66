use std::borrow::Cow;

use indexmap::IndexMap;

pub use account::Account;
pub use amount::{Amount, FIAT};
pub use balance::{AccountNode, Balance, BalanceReport, Depth, NodeId, Overflow};
pub use date::Date;
pub use filter::AccountFilter;
pub use operation::Operation;
pub use posting::Posting;
pub use register::{Register, RegisterEntry};

pub mod account;
pub mod amount;
pub mod balance;
mod date;
pub mod filter;
pub mod operation;
pub mod posting;
pub mod register;

/// Represents the complete ledger: every operation of the input, keyed by
/// [`Operation::key`] and kept in the order the keys were first seen.
///
/// Operations sharing date and description end up under the same key; their postings are
/// concatenated in the order they appear.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ledger<'a> {
    pub operations: IndexMap<String, Operation<'a>>,
}

impl<'a> Ledger<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an operation, merging it into an existing one with the same key.
    pub fn insert(&mut self, operation: Operation<'a>) {
        match self.operations.get_mut(&operation.key()) {
            Some(existing) => existing.postings.extend(operation.postings),
            None => {
                self.operations.insert(operation.key(), operation);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Operation<'a>> {
        self.operations.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation<'a>> {
        self.operations.values()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    /// Iterates over every posting of every operation, in ledger order.
    pub fn postings(&self) -> impl Iterator<Item = &Posting<'a>> {
        self.iter().flat_map(|op| op.postings.iter())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl<'a> std::iter::FromIterator<Operation<'a>> for Ledger<'a> {
    fn from_iter<I: IntoIterator<Item = Operation<'a>>>(iter: I) -> Self {
        let mut ledger = Ledger::new();
        for operation in iter {
            ledger.insert(operation);
        }
        ledger
    }
}

pub type Currency<'a> = Cow<'a, str>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn posting(account: &'static str, num: i64) -> Posting<'static> {
        Posting::builder()
            .account(Account::from_path(account))
            .units(Amount::fiat(Decimal::from(num)))
            .build()
    }

    #[test]
    fn insert_merges_same_key() {
        let date = Date::from_ymd(2024, 1, 5).unwrap();
        let ledger: Ledger = vec![
            Operation::builder()
                .date(date)
                .description(Cow::Borrowed("Coffee"))
                .postings(vec![posting("Expenses:Food", 4), posting("Assets:Cash", -4)])
                .build(),
            Operation::builder()
                .date(Date::from_ymd(2024, 1, 6).unwrap())
                .description(Cow::Borrowed("Rent"))
                .postings(vec![posting("Expenses:Rent", 500)])
                .build(),
            Operation::builder()
                .date(date)
                .description(Cow::Borrowed("Coffee"))
                .postings(vec![posting("Expenses:Tip", 1)])
                .build(),
        ]
        .into_iter()
        .collect();

        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger.keys().collect::<Vec<_>>(),
            vec!["2024-01-05 Coffee", "2024-01-06 Rent"]
        );
        let coffee = ledger.get("2024-01-05 Coffee").unwrap();
        assert_eq!(
            coffee
                .postings
                .iter()
                .map(|p| p.account.to_string())
                .collect::<Vec<_>>(),
            vec!["Expenses:Food", "Assets:Cash", "Expenses:Tip"]
        );
        assert_eq!(ledger.postings().count(), 4);
    }
}
