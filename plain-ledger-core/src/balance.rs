//! Hierarchical, multi-currency aggregation of postings by account path.
//!
//! A [`BalanceReport`] is built in a single pass over a [`Ledger`] and is immutable afterwards.
//! Nodes live in an arena and are addressed by [`NodeId`]; a path index maps `Assets:Bank` style
//! paths to their node, so revisiting a node at any depth never aliases another one.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use indexmap::IndexMap;
use log::debug;
use rust_decimal::Decimal;

use super::amount::Amount;
use super::{Currency, Ledger};

/// A per-currency sum went beyond what [`Decimal`] can represent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Overflow {
    pub currency: String,
}

impl fmt::Display for Overflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sum of '{}' amounts is out of range", self.currency)
    }
}

impl Error for Overflow {}

/// Accumulated value per currency, in the order the currencies were first seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Balance<'a> {
    amounts: IndexMap<Currency<'a>, Decimal>,
}

impl<'a> Balance<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the sum of its currency.  On overflow the balance is left unchanged.
    pub fn add(&mut self, amount: &Amount<'a>) -> Result<(), Overflow> {
        let num = self
            .amounts
            .entry(amount.currency.clone())
            .or_insert(Decimal::ZERO);
        let mut sum = num.checked_add(amount.num).ok_or_else(|| Overflow {
            currency: amount.currency.to_string(),
        })?;
        if sum.is_zero() {
            sum.set_sign_positive(true);
        }
        *num = sum;
        Ok(())
    }

    pub fn get(&self, currency: &str) -> Option<Decimal> {
        self.amounts.get(currency).copied()
    }

    /// Iterates over the balance as amounts, one per currency.
    pub fn amounts(&self) -> impl Iterator<Item = Amount<'a>> + '_ {
        self.amounts
            .iter()
            .map(|(currency, num)| Amount::new(*num, currency.clone()))
    }

    pub fn currencies(&self) -> impl Iterator<Item = &str> {
        self.amounts.keys().map(|c| &**c)
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }

    /// `true` if every currency sums up to zero.
    pub fn is_zero(&self) -> bool {
        self.amounts.values().all(Decimal::is_zero)
    }
}

/// How deep the account tree of a [`BalanceReport`] goes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Depth {
    /// Only the top-level accounts (`Assets`, `Expenses`, ...).
    Root,
    /// Every segment of every account path.
    Full,
}

impl Default for Depth {
    fn default() -> Self {
        Depth::Root
    }
}

/// Index of a node inside a [`BalanceReport`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(usize);

/// One segment of the account tree with the balance of every posting at or below it.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountNode<'a> {
    /// The single path segment this node stands for.
    pub name: String,

    /// The full path up to and including this node, e.g. `Assets:Bank`.
    pub path: String,

    /// Zero for root accounts.
    pub depth: usize,

    pub balance: Balance<'a>,

    children: Vec<NodeId>,
}

impl<'a> AccountNode<'a> {
    fn new(name: &str, path: String, depth: usize) -> Self {
        AccountNode {
            name: name.to_string(),
            path,
            depth,
            balance: Balance::new(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The account forest together with the grand total over every posting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BalanceReport<'a> {
    nodes: Vec<AccountNode<'a>>,
    roots: Vec<NodeId>,
    index: HashMap<String, NodeId>,
    total: Balance<'a>,
}

impl<'a> BalanceReport<'a> {
    /// Aggregates every posting of `ledger`.
    ///
    /// Each posting adds its amount to the root node of its account and, with [`Depth::Full`], to
    /// every node along its path.  Nodes and currencies are kept in first-seen order.
    ///
    /// Fails if the sum of a currency leaves the range of [`Decimal`] at any node or in the total.
    pub fn build(ledger: &Ledger<'a>, depth: Depth) -> Result<Self, Overflow> {
        let mut report = BalanceReport::default();
        for posting in ledger.postings() {
            let levels = match depth {
                Depth::Root => posting.account.depth().min(1),
                Depth::Full => posting.account.depth(),
            };
            let mut parent = None;
            for level in 0..levels {
                let id = report.node_for(&posting.account.parts[..=level], parent);
                report.nodes[id.0].balance.add(&posting.units)?;
                parent = Some(id);
            }
            report.total.add(&posting.units)?;
        }
        debug!(
            "aggregated {} postings into {} account nodes ({} roots)",
            ledger.postings().count(),
            report.nodes.len(),
            report.roots.len()
        );
        Ok(report)
    }

    fn node_for<S: AsRef<str>>(&mut self, parts: &[S], parent: Option<NodeId>) -> NodeId {
        let path = parts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(":");
        if let Some(id) = self.index.get(&path) {
            return *id;
        }
        let name = parts.last().map(AsRef::as_ref).unwrap_or_default();
        let id = NodeId(self.nodes.len());
        self.nodes
            .push(AccountNode::new(name, path.clone(), parts.len() - 1));
        self.index.insert(path, id);
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn node(&self, id: NodeId) -> &AccountNode<'a> {
        &self.nodes[id.0]
    }

    /// Looks up a node by its full path, e.g. `Assets:Bank`.
    pub fn get(&self, path: &str) -> Option<&AccountNode<'a>> {
        self.index.get(path).map(|id| self.node(*id))
    }

    /// Root-level accounts in first-seen order.
    pub fn roots(&self) -> impl Iterator<Item = &AccountNode<'a>> {
        self.roots.iter().map(move |id| self.node(*id))
    }

    pub fn children<'r>(
        &'r self,
        node: &'r AccountNode<'a>,
    ) -> impl Iterator<Item = &'r AccountNode<'a>> + 'r {
        node.children.iter().map(move |id| self.node(*id))
    }

    /// Depth-first walk of the whole forest, parents before their children.
    pub fn walk(&self) -> Walk<'_, 'a> {
        Walk {
            report: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Sum of every posting, independent of the account.
    pub fn total(&self) -> &Balance<'a> {
        &self.total
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Iterator returned by [`BalanceReport::walk`].
pub struct Walk<'r, 'a> {
    report: &'r BalanceReport<'a>,
    stack: Vec<NodeId>,
}

impl<'r, 'a> Iterator for Walk<'r, 'a> {
    type Item = &'r AccountNode<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.report.node(id);
        self.stack.extend(node.children.iter().rev().copied());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Account, Date, Operation, Posting};
    use proptest::prelude::*;
    use std::borrow::Cow;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn posting(account: &'static str, amount: Amount<'static>) -> Posting<'static> {
        Posting::builder()
            .account(Account::from_path(account))
            .units(amount)
            .build()
    }

    fn ledger(postings: Vec<Posting<'static>>) -> Ledger<'static> {
        std::iter::once(
            Operation::builder()
                .date(Date::from_ymd(2024, 1, 5).unwrap())
                .description(Cow::Borrowed("Test"))
                .postings(postings)
                .build(),
        )
        .collect()
    }

    #[test]
    fn root_balances() {
        let ledger = ledger(vec![
            posting("Expenses:Food", Amount::fiat(dec("4.50"))),
            posting("Assets:Cash", Amount::fiat(dec("-4.50"))),
        ]);
        let report = BalanceReport::build(&ledger, Depth::Root).unwrap();

        assert_eq!(
            report.roots().map(|n| n.name.as_str()).collect::<Vec<_>>(),
            vec!["Expenses", "Assets"]
        );
        assert_eq!(report.get("Expenses").unwrap().balance.get("$"), Some(dec("4.50")));
        assert_eq!(report.get("Assets").unwrap().balance.get("$"), Some(dec("-4.50")));
        assert!(report.get("Expenses:Food").is_none());
        assert_eq!(report.total().get("$"), Some(dec("0.00")));
        assert!(report.total().is_zero());
        assert_eq!(report.total().amounts().next().unwrap().to_string(), "$0.00");
    }

    #[test]
    fn full_hierarchy_aggregates_every_level() {
        let ledger = ledger(vec![
            posting("Assets:Bank:Checking", Amount::new(dec("2"), "BTC")),
            posting("Assets:Bank:Savings", Amount::new(dec("1"), "BTC")),
            posting("Equity:Opening", Amount::new(dec("-3"), "BTC")),
        ]);
        let report = BalanceReport::build(&ledger, Depth::Full).unwrap();

        assert_eq!(report.get("Assets:Bank:Checking").unwrap().balance.get("BTC"), Some(dec("2")));
        assert_eq!(report.get("Assets:Bank").unwrap().balance.get("BTC"), Some(dec("3")));
        assert_eq!(report.get("Assets").unwrap().balance.get("BTC"), Some(dec("3")));
        assert_eq!(report.get("Assets:Bank").unwrap().depth, 1);

        assert_eq!(
            report.walk().map(|n| n.path.as_str()).collect::<Vec<_>>(),
            vec![
                "Assets",
                "Assets:Bank",
                "Assets:Bank:Checking",
                "Assets:Bank:Savings",
                "Equity",
                "Equity:Opening"
            ]
        );
        let bank = report.get("Assets:Bank").unwrap();
        assert_eq!(
            report.children(bank).map(|n| n.name.as_str()).collect::<Vec<_>>(),
            vec!["Checking", "Savings"]
        );
    }

    #[test]
    fn same_name_at_different_depths() {
        let ledger = ledger(vec![
            posting("Assets:Assets", Amount::fiat(dec("1"))),
            posting("Assets", Amount::fiat(dec("2"))),
        ]);
        let report = BalanceReport::build(&ledger, Depth::Full).unwrap();
        assert_eq!(report.get("Assets").unwrap().balance.get("$"), Some(dec("3")));
        assert_eq!(report.get("Assets:Assets").unwrap().balance.get("$"), Some(dec("1")));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn currencies_in_first_seen_order() {
        let ledger = ledger(vec![
            posting("Assets:Wallet", Amount::new(dec("1"), "ETH")),
            posting("Assets:Cash", Amount::fiat(dec("5"))),
            posting("Assets:Wallet", Amount::new(dec("2"), "BTC")),
        ]);
        let report = BalanceReport::build(&ledger, Depth::Root).unwrap();
        assert_eq!(
            report.get("Assets").unwrap().balance.currencies().collect::<Vec<_>>(),
            vec!["ETH", "$", "BTC"]
        );
    }

    #[test]
    fn overflow_is_an_error() {
        let ledger = ledger(vec![
            posting("Assets:A", Amount::fiat(Decimal::MAX)),
            posting("Assets:B", Amount::fiat(Decimal::MAX)),
        ]);
        assert_eq!(
            BalanceReport::build(&ledger, Depth::Root).unwrap_err(),
            Overflow { currency: "$".to_string() }
        );
        // Separate accounts do not overflow, only their common root does.
        let ledger = ledger_with_roots();
        assert!(BalanceReport::build(&ledger, Depth::Full).is_ok());
    }

    fn ledger_with_roots() -> Ledger<'static> {
        ledger(vec![
            posting("Assets:A", Amount::fiat(Decimal::MAX)),
            posting("Equity:B", Amount::fiat(Decimal::MIN)),
        ])
    }

    #[test]
    fn failed_add_leaves_balance_untouched() {
        let mut balance = Balance::new();
        balance.add(&Amount::new(Decimal::MAX, "BTC")).unwrap();
        balance.add(&Amount::fiat(dec("1"))).unwrap();
        assert!(balance.add(&Amount::new(dec("1"), "BTC")).is_err());
        assert_eq!(balance.get("BTC"), Some(Decimal::MAX));
        balance.add(&Amount::new(Decimal::MIN, "BTC")).unwrap();
        assert_eq!(balance.get("BTC"), Some(Decimal::ZERO));
    }

    const ACCOUNTS: &[&str] = &[
        "Assets",
        "Assets:Bank",
        "Assets:Bank:Checking",
        "Assets:Cash",
        "Expenses:Food",
        "Expenses:Food:Lunch",
        "Income:Salary",
    ];
    const CURRENCIES: &[&str] = &["$", "BTC", "EUR"];

    fn arb_postings() -> impl Strategy<Value = Vec<Posting<'static>>> {
        prop::collection::vec(
            (0..ACCOUNTS.len(), 0..CURRENCIES.len(), -100_000i64..100_000i64),
            0..40,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .map(|(a, c, n)| {
                    posting(ACCOUNTS[a], Amount::new(Decimal::new(n, 2), CURRENCIES[c]))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn node_balance_is_sum_of_descendant_postings(postings in arb_postings()) {
            let ledger = ledger(postings.clone());
            let report = BalanceReport::build(&ledger, Depth::Full).unwrap();
            for node in report.walk() {
                let mut expected = Balance::new();
                for p in &postings {
                    if p.account.prefixes().any(|prefix| prefix == node.path) {
                        expected.add(&p.units).unwrap();
                    }
                }
                for currency in CURRENCIES {
                    prop_assert_eq!(node.balance.get(currency), expected.get(currency));
                }
            }
        }

        #[test]
        fn total_is_sum_of_roots(postings in arb_postings()) {
            let ledger = ledger(postings);
            let report = BalanceReport::build(&ledger, Depth::Root).unwrap();
            let mut roots = Balance::new();
            for root in report.roots() {
                for amount in root.balance.amounts() {
                    roots.add(&amount).unwrap();
                }
            }
            for currency in CURRENCIES {
                prop_assert_eq!(
                    report.total().get(currency).unwrap_or_default(),
                    roots.get(currency).unwrap_or_default()
                );
            }
        }
    }
}
