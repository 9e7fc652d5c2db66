//! Account filtering and date ordering shared by every view.

use log::debug;

use super::account::Account;
use super::Ledger;

/// Selects postings whose account contains one of a set of tokens as whole path segments.
///
/// A token may span several segments: `Bank:Checking` matches `Assets:Bank:Checking` but neither
/// `Assets:Bank` nor `Assets:Checking`.  Matching is case sensitive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountFilter {
    tokens: Vec<Vec<String>>,
}

impl AccountFilter {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AccountFilter {
            tokens: tokens
                .into_iter()
                .map(|t| {
                    t.as_ref()
                        .split(':')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect::<Vec<_>>()
                })
                .filter(|segments| !segments.is_empty())
                .collect(),
        }
    }

    /// An empty filter lets every posting through.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn matches(&self, account: &Account<'_>) -> bool {
        self.is_empty()
            || self
                .tokens
                .iter()
                .any(|segments| account.contains_segments(&segments[..]))
    }
}

impl<'a> Ledger<'a> {
    /// Keeps only the postings matched by `filter`.
    ///
    /// Operations left without postings stay in the ledger as empty entries; it is up to the view
    /// to skip them.
    pub fn filter_accounts(&self, filter: &AccountFilter) -> Ledger<'a> {
        if filter.is_empty() {
            return self.clone();
        }
        let mut filtered = self.clone();
        for operation in filtered.operations.values_mut() {
            operation.postings.retain(|p| filter.matches(&p.account));
        }
        debug!(
            "account filter kept {} of {} postings",
            filtered.postings().count(),
            self.postings().count()
        );
        filtered
    }

    /// Orders the operations by date, then description.  Operations that compare equal keep
    /// their relative order.
    pub fn sort_by_date(&self) -> Ledger<'a> {
        let mut sorted = self.clone();
        sorted.operations.sort_by(|_, a, _, b| {
            (a.date, &a.description).cmp(&(b.date, &b.description))
        });
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Amount, Date, Operation, Posting};
    use std::borrow::Cow;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn posting(account: &'static str, num: i64) -> Posting<'static> {
        Posting::builder()
            .account(Account::from_path(account))
            .units(Amount::fiat(Decimal::new(num, 2)))
            .build()
    }

    fn operation(
        (y, m, d): (i32, u32, u32),
        description: &'static str,
        postings: Vec<Posting<'static>>,
    ) -> Operation<'static> {
        Operation::builder()
            .date(Date::from_ymd(y, m, d).unwrap())
            .description(Cow::Borrowed(description))
            .postings(postings)
            .build()
    }

    fn coffee() -> Ledger<'static> {
        std::iter::once(operation(
            (2024, 1, 5),
            "Coffee",
            vec![posting("Expenses:Food", 450), posting("Assets:Cash", -450)],
        ))
        .collect()
    }

    fn accounts(ledger: &Ledger<'_>) -> Vec<String> {
        ledger.postings().map(|p| p.account.to_string()).collect()
    }

    #[test]
    fn whole_segment_match() {
        let ledger = coffee();
        let filtered = ledger.filter_accounts(&AccountFilter::new(&["Food"]));
        assert_eq!(accounts(&filtered), vec!["Expenses:Food"]);

        // Substrings of a segment do not match.
        let filtered = ledger.filter_accounts(&AccountFilter::new(&["Foo"]));
        assert!(accounts(&filtered).is_empty());
        let filtered = ledger.filter_accounts(&AccountFilter::new(&["ash"]));
        assert!(accounts(&filtered).is_empty());

        let filtered = ledger.filter_accounts(&AccountFilter::new(&["Assets:Cash"]));
        assert_eq!(accounts(&filtered), vec!["Assets:Cash"]);
    }

    #[test]
    fn any_token_matches() {
        let ledger = coffee();
        let filtered = ledger.filter_accounts(&AccountFilter::new(&["Cash", "Food"]));
        assert_eq!(accounts(&filtered), vec!["Expenses:Food", "Assets:Cash"]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let ledger = coffee();
        let filter = AccountFilter::new(Vec::<String>::new());
        assert!(filter.is_empty());
        assert_eq!(ledger.filter_accounts(&filter), ledger);
        assert!(AccountFilter::new(&[":", ""]).is_empty());
    }

    #[test]
    fn emptied_operations_are_kept() {
        let ledger: Ledger = vec![
            operation((2024, 1, 5), "Coffee", vec![posting("Expenses:Food", 450)]),
            operation((2024, 1, 6), "Salary", vec![posting("Income:Salary", -100)]),
        ]
        .into_iter()
        .collect();

        let filtered = ledger.filter_accounts(&AccountFilter::new(&["Food"]));
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.get("2024-01-05 Coffee").unwrap().postings.len(), 1);
        assert!(filtered.get("2024-01-06 Salary").unwrap().is_empty());
    }

    #[test]
    fn sort_by_date_then_description() {
        let ledger: Ledger = vec![
            operation((2024, 3, 1), "Rent", vec![posting("Expenses:Rent", 1)]),
            operation((2024, 1, 10), "Lunch", vec![posting("Expenses:Food", 2)]),
            operation((2024, 1, 10), "Coffee", vec![posting("Expenses:Food", 3)]),
            operation((2023, 12, 31), "Party", vec![posting("Expenses:Fun", 4)]),
        ]
        .into_iter()
        .collect();

        let sorted = ledger.sort_by_date();
        assert_eq!(
            sorted.keys().collect::<Vec<_>>(),
            vec![
                "2023-12-31 Party",
                "2024-01-10 Coffee",
                "2024-01-10 Lunch",
                "2024-03-01 Rent"
            ]
        );
        // Month 10 sorts after month 9, which a plain `YYYY/M/D` string would not.
        let ledger: Ledger = vec![
            operation((2024, 10, 1), "A", vec![]),
            operation((2024, 9, 1), "A", vec![]),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            ledger.sort_by_date().keys().collect::<Vec<_>>(),
            vec!["2024-09-01 A", "2024-10-01 A"]
        );
    }

    fn arb_ledger() -> impl Strategy<Value = Ledger<'static>> {
        const ACCOUNTS: &[&str] = &["Assets:Cash", "Assets:Bank", "Expenses:Food", "Income"];
        const DESCRIPTIONS: &[&str] = &["Coffee", "Rent", "Salary"];
        prop::collection::vec(
            (
                (2000i32..2030, 1u32..13, 1u32..29),
                0..DESCRIPTIONS.len(),
                prop::collection::vec((0..ACCOUNTS.len(), -1000i64..1000), 0..5),
            ),
            0..20,
        )
        .prop_map(|ops| {
            ops.into_iter()
                .map(|(date, d, postings)| {
                    operation(
                        date,
                        DESCRIPTIONS[d],
                        postings
                            .into_iter()
                            .map(|(a, n)| posting(ACCOUNTS[a], n))
                            .collect(),
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn filter_is_idempotent(ledger in arb_ledger(), token in "(Assets|Cash|Food|Income|Bank)") {
            let filter = AccountFilter::new(&[token]);
            let once = ledger.filter_accounts(&filter);
            let twice = once.filter_accounts(&filter);
            prop_assert_eq!(once.keys().collect::<Vec<_>>(), twice.keys().collect::<Vec<_>>());
            prop_assert_eq!(accounts(&once), accounts(&twice));
        }

        #[test]
        fn sort_is_ordered_and_idempotent(ledger in arb_ledger()) {
            let once = ledger.sort_by_date();
            let dates = once.iter().map(|op| op.date).collect::<Vec<_>>();
            prop_assert!(dates.windows(2).all(|w| w[0] <= w[1]));

            let twice = once.sort_by_date();
            prop_assert_eq!(once.keys().collect::<Vec<_>>(), twice.keys().collect::<Vec<_>>());
            prop_assert_eq!(once.len(), ledger.len());
        }
    }
}
