use colored::Colorize;
use plain_ledger_core::*;
use std::{io, io::Write};
use thiserror::Error;


/// Width of the amount column in the balance and register views.
const AMOUNT_WIDTH: usize = 20;

/// Register account names longer than this are cut and end in `...`.
const ACCOUNT_WIDTH: usize = 12;

/// Width of the account column in the register view (`ACCOUNT_WIDTH` plus the `...`).
const ACCOUNT_COLUMN: usize = ACCOUNT_WIDTH + 3;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct TextRenderer {
    color: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts are printed in blue and negative amounts in red.
    pub fn with_color(color: bool) -> Self {
        TextRenderer { color }
    }

    fn account(&self, account: &str) -> String {
        if self.color {
            account.blue().to_string()
        } else {
            account.to_string()
        }
    }

    fn amount(&self, amount: &Amount<'_>, width: usize) -> String {
        let s = format!("{:>width$}", amount, width = width);
        if self.color && amount.num.is_sign_negative() && !amount.num.is_zero() {
            s.red().to_string()
        } else {
            s
        }
    }

    fn balance(&self, balance: &Balance<'_>) -> String {
        balance
            .amounts()
            .map(|a| self.amount(&a, 0))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Writes the flat listing of `ledger`, skipping operations without postings.
pub fn render<W: Write>(w: &mut W, ledger: &Ledger<'_>) -> Result<(), RenderError> {
    TextRenderer::default().render(ledger, w)
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("an io error occurred")]
    Io(#[from] io::Error),
}

pub trait Renderer<T, W: Write> {
    type Error;
    fn render(&self, renderable: T, write: &mut W) -> Result<(), Self::Error>;
}

impl<'a, W: Write> Renderer<&'a Ledger<'_>, W> for TextRenderer {
    type Error = RenderError;
    fn render(&self, ledger: &'a Ledger<'_>, write: &mut W) -> Result<(), Self::Error> {
        for operation in ledger.iter().filter(|op| !op.is_empty()) {
            self.render(operation, write)?;
            writeln!(write)?;
        }
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Operation<'_>, W> for TextRenderer {
    type Error = RenderError;
    fn render(&self, operation: &'a Operation<'_>, write: &mut W) -> Result<(), Self::Error> {
        writeln!(write, "{}", operation.key())?;
        for posting in &operation.postings {
            self.render(posting, write)?;
        }
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Posting<'_>, W> for TextRenderer {
    type Error = RenderError;
    fn render(&self, posting: &'a Posting<'_>, write: &mut W) -> Result<(), Self::Error> {
        write!(write, "\t")?;
        self.render(&posting.account, write)?;
        write!(write, "\t")?;
        self.render(&posting.units, write)?;
        writeln!(write)?;
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Account<'_>, W> for TextRenderer {
    type Error = RenderError;
    fn render(&self, account: &'a Account<'_>, write: &mut W) -> Result<(), Self::Error> {
        write!(write, "{}", self.account(&account.to_string()))?;
        Ok(())
    }
}

impl<'a, W: Write> Renderer<&'a Amount<'_>, W> for TextRenderer {
    type Error = RenderError;
    fn render(&self, amount: &'a Amount<'_>, w: &mut W) -> Result<(), Self::Error> {
        write!(w, "{}", self.amount(amount, 0))?;
        Ok(())
    }
}

/// One line per currency with the amounts right-aligned; the account name follows the last
/// amount, indented by its depth.  The grand total closes the report.
impl<'a, W: Write> Renderer<&'a BalanceReport<'_>, W> for TextRenderer {
    type Error = RenderError;
    fn render(&self, report: &'a BalanceReport<'_>, w: &mut W) -> Result<(), Self::Error> {
        for node in report.walk() {
            let label = format!("{}{}", "  ".repeat(node.depth), node.name);
            render_balance_lines(self, w, &node.balance, &self.account(&label))?;
        }
        writeln!(w, "{}", "-".repeat(AMOUNT_WIDTH))?;
        render_balance_lines(self, w, report.total(), "")?;
        Ok(())
    }
}

fn render_balance_lines<W: Write>(
    renderer: &TextRenderer,
    w: &mut W,
    balance: &Balance<'_>,
    label: &str,
) -> Result<(), RenderError> {
    if balance.is_empty() {
        writeln!(w, "{:>width$}", 0, width = AMOUNT_WIDTH)?;
        return Ok(());
    }
    let last = balance.len() - 1;
    for (i, amount) in balance.amounts().enumerate() {
        let amount = renderer.amount(&amount, AMOUNT_WIDTH);
        if i == last && !label.is_empty() {
            writeln!(w, "{}  {}", amount, label)?;
        } else {
            writeln!(w, "{}", amount)?;
        }
    }
    Ok(())
}

/// The register: the operation key whenever a new operation starts, then one line per posting
/// with the account, the amount and the running balance.
impl<'e, 'r, 'a, W: Write> Renderer<&'e [RegisterEntry<'r, 'a>], W> for TextRenderer {
    type Error = RenderError;
    fn render(&self, entries: &'e [RegisterEntry<'r, 'a>], w: &mut W) -> Result<(), Self::Error> {
        let mut current: Option<String> = None;
        for entry in entries {
            let key = entry.key();
            if current.as_ref() != Some(&key) {
                if current.is_some() {
                    writeln!(w)?;
                }
                writeln!(w, "{}", key)?;
                current = Some(key);
            }
            writeln!(
                w,
                "\t{}{}  {}",
                self.account(&register_account(entry.account)),
                self.amount(entry.amount, AMOUNT_WIDTH),
                self.balance(&entry.running)
            )?;
        }
        if current.is_some() {
            writeln!(w)?;
        }
        Ok(())
    }
}

fn register_account(account: &Account<'_>) -> String {
    let name = account.to_string();
    if name.chars().count() > ACCOUNT_WIDTH {
        format!("{}...", name.chars().take(ACCOUNT_WIDTH).collect::<String>())
    } else {
        format!("{:<width$}", name, width = ACCOUNT_COLUMN)
    }
}
