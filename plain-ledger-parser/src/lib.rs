use std::str::FromStr;

use indexmap::IndexMap;
use log::{debug, trace};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;
use rust_decimal::Decimal;

use plain_ledger_core as bc;

use error::{ParseError, ParseResult};

pub mod error;
pub mod infer;
pub mod normalize;

#[derive(PestParser)]
#[grammar = "ledger.pest"]
pub struct LedgerParser;

/// A posting line as written in the file, before its amount is known.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawPosting<'i> {
    /// The line with its comment removed.
    pub text: &'i str,

    /// 1-based line number in the input.
    pub line: usize,
}

impl<'i> RawPosting<'i> {
    /// Splits the line into the account path and the amount expression.
    ///
    /// The indentation is leading spaces followed by at most one tab.  After it, everything up to
    /// the next tab is the account path and everything after that tab the amount; a line without
    /// a tab, or with only blanks after it, has no amount.  A lone amount (`\t$5`) or a tab right
    /// after the indentation (`\t\t$5`) leaves the account path empty.
    pub fn split(&self) -> (&'i str, Option<&'i str>) {
        let text = self.text.trim_start_matches(' ');
        let text = text.strip_prefix('\t').unwrap_or(text);
        match text.find('\t') {
            Some(pos) => {
                let amount = text[pos + 1..].trim();
                let amount = if amount.is_empty() { None } else { Some(amount) };
                (text[..pos].trim(), amount)
            }
            None if LedgerParser::parse(Rule::amount, text).is_ok() => ("", Some(text.trim())),
            None => (text.trim(), None),
        }
    }
}

/// A dated operation whose postings are still raw lines.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawOperation<'i> {
    pub date: bc::Date,
    pub description: &'i str,
    pub postings: Vec<RawPosting<'i>>,

    /// Line of the (first) date header.
    pub line: usize,
}

impl RawOperation<'_> {
    pub fn key(&self) -> String {
        bc::operation::operation_key(&self.date, self.description)
    }
}

/// Operations keyed by [`RawOperation::key`], in first-seen order.
pub type RawLedger<'i> = IndexMap<String, RawOperation<'i>>;

/// Parses a ledger into operations with inferred amounts.
///
/// `input` must have its include directives resolved; comments are removed while parsing.
pub fn parse(input: &str) -> ParseResult<bc::Ledger<'_>> {
    let raw = parse_operations(input)?;
    infer::infer_ledger(raw)
}

/// Splits a ledger into dated operations holding raw posting lines.
///
/// Operations sharing date and description are merged, their postings concatenated in file
/// order.  Blank lines are skipped and do not end an operation.
pub fn parse_operations(input: &str) -> ParseResult<RawLedger<'_>> {
    let mut operations = RawLedger::new();
    let mut current: Option<String> = None;

    for (idx, raw_line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = normalize::strip_comment(raw_line);
        if line.trim().is_empty() {
            continue;
        }

        if let Ok(mut pairs) = LedgerParser::parse(Rule::date_header, line) {
            let header = pairs
                .next()
                .ok_or_else(|| ParseError::invalid_state("date header").at_line(line_no))?;
            let (date, description) = date_header(header, line_no)?;
            let key = bc::operation::operation_key(&date, description);
            trace!("line {}: operation '{}'", line_no, key);
            operations
                .entry(key.clone())
                .or_insert_with(|| RawOperation {
                    date,
                    description,
                    postings: Vec::new(),
                    line: line_no,
                });
            current = Some(key);
            continue;
        }

        if normalize::include_target(line).is_some() {
            return Err(ParseError::invalid_input(
                format!("unresolved include directive '{}'", line.trim()),
                line_no,
            ));
        }

        let key = current
            .as_ref()
            .ok_or_else(|| ParseError::orphan_posting(line.trim(), line_no))?;
        let operation = operations
            .get_mut(key)
            .ok_or_else(|| ParseError::invalid_state("open operation").at_line(line_no))?;
        operation.postings.push(RawPosting {
            text: line,
            line: line_no,
        });
    }

    debug!(
        "parsed {} operations with {} posting lines",
        operations.len(),
        operations.values().map(|op| op.postings.len()).sum::<usize>()
    );
    Ok(operations)
}

fn date_header<'i>(pair: Pair<'i, Rule>, line: usize) -> ParseResult<(bc::Date, &'i str)> {
    debug_assert!(pair.as_rule() == Rule::date_header);
    let mut inner = pair.into_inner();
    let date_pair = inner
        .next()
        .ok_or_else(|| ParseError::invalid_state("date").at_line(line))?;
    let description = inner
        .next()
        .ok_or_else(|| ParseError::invalid_state("description").at_line(line))?
        .as_str()
        .trim();
    Ok((date(date_pair, line)?, description))
}

fn date(pair: Pair<'_, Rule>, line: usize) -> ParseResult<bc::Date> {
    debug_assert!(pair.as_rule() == Rule::date);
    let text = pair.as_str();
    let mut parts = pair.into_inner().map(|p| p.as_str().parse::<u32>());
    let mut next = || {
        parts
            .next()
            .and_then(Result::ok)
            .ok_or_else(|| ParseError::invalid_state("date component").at_line(line))
    };
    let (year, month, day) = (next()?, next()?, next()?);
    bc::Date::from_ymd(year as i32, month, day)
        .ok_or_else(|| ParseError::malformed_date(text, line))
}

/// Parses an amount expression such as `$4.50`, `-$4.50` or `2 BTC`.
pub fn amount(expr: &str) -> ParseResult<bc::Amount<'_>> {
    let pair = LedgerParser::parse(Rule::amount, expr)?
        .next()
        .ok_or_else(|| ParseError::invalid_state("amount"))?;
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| ParseError::invalid_state("fiat or unit amount"))?;

    let mut negative = false;
    let mut num = None;
    let mut currency = None;
    for p in inner.into_inner() {
        match p.as_rule() {
            Rule::neg => negative = true,
            Rule::number => num = Some(number(p)?),
            Rule::fiat | Rule::commodity => currency = Some(p.as_str()),
            _ => return Err(ParseError::invalid_state("amount component")),
        }
    }
    let num = num.ok_or_else(|| ParseError::invalid_state("number"))?;
    let currency = currency.ok_or_else(|| ParseError::invalid_state("currency"))?;
    Ok(bc::Amount::new(if negative { -num } else { num }, currency))
}

fn number(pair: Pair<'_, Rule>) -> ParseResult<Decimal> {
    debug_assert!(pair.as_rule() == Rule::number);
    let s = pair.as_str();
    Decimal::from_str(s).map_err(|e| ParseError::decimal_parse_error(e, s))
}
