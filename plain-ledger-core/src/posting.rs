use typed_builder::TypedBuilder;

use super::account::Account;
use super::amount::Amount;

/// Represents an operation posting.  Postings represent a single amount being deposited to or
/// withdrawn from an account.
///
/// In the ledger file a posting is an indented line holding the account path and, separated by a
/// tab, the amount.  The amount may be left out, in which case it is inferred from the posting
/// before it:
///
/// ```text
/// 2024/1/5 Coffee
///     Expenses:Food	$4.50
///     Assets:Cash
/// ```
///
/// By the time a `Posting` exists the amount is always known.
#[derive(Clone, Debug, PartialEq, TypedBuilder)]
pub struct Posting<'a> {
    /// Account being posted to.
    pub account: Account<'a>,

    /// The amount being posted.
    pub units: Amount<'a>,
}
