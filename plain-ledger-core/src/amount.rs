use std::fmt;
use std::ops::Neg;

use rust_decimal::Decimal;
use typed_builder::TypedBuilder;

use super::Currency;

/// Symbol of the fiat currency.  Fiat amounts are written with the symbol in front of the number
/// (`$4.50`), every other currency follows the number after a space (`2 BTC`).
pub const FIAT: &str = "$";

pub fn is_fiat(currency: &str) -> bool {
    currency == FIAT
}

/// A number of units of a certain currency.
#[derive(Clone, Debug, Eq, PartialEq, Hash, TypedBuilder)]
pub struct Amount<'a> {
    /// The value of the amount.
    pub num: Decimal,

    /// The currency of the amount.
    pub currency: Currency<'a>,
}

impl<'a> Amount<'a> {
    pub fn new<C: Into<Currency<'a>>>(num: Decimal, currency: C) -> Self {
        Amount {
            num,
            currency: currency.into(),
        }
    }

    pub fn fiat(num: Decimal) -> Self {
        Amount::new(num, FIAT)
    }

    pub fn is_fiat(&self) -> bool {
        is_fiat(&self.currency)
    }
}

impl<'a> Neg for Amount<'a> {
    type Output = Amount<'a>;

    fn neg(self) -> Self::Output {
        Amount {
            num: -self.num,
            currency: self.currency,
        }
    }
}

impl<'a> Neg for &Amount<'a> {
    type Output = Amount<'a>;

    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl fmt::Display for Amount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Zero is printed unsigned, however it came about.
        let num = if self.num.is_zero() {
            self.num.abs()
        } else {
            self.num
        };
        let s = if self.is_fiat() {
            let sign = if num.is_sign_negative() { "-" } else { "" };
            format!("{}{}{}", sign, FIAT, num.abs())
        } else {
            format!("{} {}", num, self.currency)
        };
        // Padding and alignment apply to the whole amount, e.g. `{:>20}`.
        f.pad(&s)
    }
}
