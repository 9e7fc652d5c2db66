use std::borrow::Cow;
use std::fmt;

use typed_builder::TypedBuilder;

/// Represents an account.
///
/// An account name is a colon-separated path of segments.  The first segment names the root of
/// the account tree the posting is aggregated under, each following segment one level deeper.
///
/// Some example accounts:
///
/// ```text
/// Assets:Bank:Checking
/// Liabilities:CreditCard
/// Expenses:Food:Groceries
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Hash, TypedBuilder)]
pub struct Account<'a> {
    /// Segments of the account path, root first.
    pub parts: Vec<Cow<'a, str>>,
}

impl<'a> Account<'a> {
    /// Splits a colon-delimited path into an account.  Surrounding whitespace of each segment is
    /// dropped; empty segments are kept out of the path.
    pub fn from_path(path: &'a str) -> Self {
        Account {
            parts: path
                .split(':')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Cow::Borrowed)
                .collect(),
        }
    }

    /// The top-level segment, e.g. `Assets` for `Assets:Bank:Checking`.
    pub fn root(&self) -> Option<&str> {
        self.parts.first().map(|p| &**p)
    }

    pub fn depth(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Iterates over the path of every ancestor and of the account itself, shortest first:
    /// `Assets`, `Assets:Bank`, `Assets:Bank:Checking`.
    pub fn prefixes(&self) -> impl Iterator<Item = String> + '_ {
        (1..=self.parts.len()).map(move |n| self.parts[..n].join(":"))
    }

    /// Returns `true` if `segments` equals a contiguous run of this account's segments.
    ///
    /// Matching happens on whole segments only: `Food` matches `Expenses:Food` and
    /// `Expenses:Food:Lunch` but not `Expenses:Seafood`.
    pub fn contains_segments<S: AsRef<str>>(&self, segments: &[S]) -> bool {
        if segments.is_empty() || segments.len() > self.parts.len() {
            return false;
        }
        self.parts.windows(segments.len()).any(|window| {
            window
                .iter()
                .zip(segments)
                .all(|(part, seg)| &**part == seg.as_ref())
        })
    }
}

impl fmt::Display for Account<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join(":"))
    }
}
