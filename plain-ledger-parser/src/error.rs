use std::error::Error;
use std::fmt;

use super::Rule;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Clone, Debug, PartialEq)]
pub enum ParseErrorKind {
    /// An error was encountered while converting string to a numeric representation.
    DecimalError { message: String },
    /// Input is invalid in some way.
    InvalidInput { message: String },
    /// Parser has reached an invalid state (most likely a bug in the parser).
    InvalidParserState { message: String },
    /// A posting line appears before the first date header.
    OrphanPosting { line: String },
    /// A date header names a date that does not exist, e.g. `2023/2/30`.
    MalformedDate { date: String },
    /// The first posting of an operation has no amount, so there is nothing to infer it from.
    NoReferenceCurrency { operation: String },
}

#[derive(Debug)]
pub struct ParseError {
    /// The type of error.
    pub kind: ParseErrorKind,
    /// The (line, column) location of the error in the input.
    pub location: (usize, usize),
    source: Option<Box<dyn Error + 'static + Send + Sync>>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::DecimalError { message } => {
                write!(f, "{}", message)?;
            }
            ParseErrorKind::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)?;
            }
            ParseErrorKind::InvalidParserState { message } => {
                write!(f, "Parser has reached an invalid state (please report this as a bug): expected {}", message)?;
            }
            ParseErrorKind::OrphanPosting { line } => {
                write!(f, "Posting '{}' does not belong to any dated operation", line)?;
            }
            ParseErrorKind::MalformedDate { date } => {
                write!(f, "Invalid date '{}'", date)?;
            }
            ParseErrorKind::NoReferenceCurrency { operation } => {
                write!(
                    f,
                    "Cannot infer the amount of the first posting of '{}': no previous amount to balance",
                    operation
                )?;
            }
        }
        write!(f, " at line {} column {}", self.location.0, self.location.1)
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl ParseError {
    fn new(kind: ParseErrorKind, line: usize) -> ParseError {
        ParseError {
            kind,
            location: (line, 1),
            source: None,
        }
    }

    pub(crate) fn invalid_state<T: ToString>(msg: T) -> ParseError {
        ParseError {
            kind: ParseErrorKind::InvalidParserState {
                message: msg.to_string(),
            },
            location: (0, 0),
            source: None,
        }
    }

    pub(crate) fn invalid_input<T: ToString>(msg: T, line: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidInput {
                message: msg.to_string(),
            },
            line,
        )
    }

    pub(crate) fn decimal_parse_error(err: rust_decimal::Error, number: &str) -> ParseError {
        ParseError {
            kind: ParseErrorKind::DecimalError {
                message: format!("error while parsing number '{}': {}", number, err),
            },
            location: (0, 0),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn orphan_posting<T: ToString>(line_text: T, line: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::OrphanPosting {
                line: line_text.to_string(),
            },
            line,
        )
    }

    pub(crate) fn malformed_date<T: ToString>(date: T, line: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::MalformedDate {
                date: date.to_string(),
            },
            line,
        )
    }

    pub(crate) fn no_reference_currency<T: ToString>(operation: T, line: usize) -> ParseError {
        ParseError::new(
            ParseErrorKind::NoReferenceCurrency {
                operation: operation.to_string(),
            },
            line,
        )
    }

    /// Rebases the location of an error raised while parsing a single line onto the line number
    /// of that line in the whole input.
    pub(crate) fn at_line(mut self, line: usize) -> ParseError {
        self.location = (line, self.location.1.max(1));
        self
    }
}

impl From<pest::error::Error<Rule>> for ParseError {
    fn from(err: pest::error::Error<Rule>) -> Self {
        let err = err.renamed_rules(|rule| {
            match *rule {
                Rule::EOI => "end of line",
                Rule::blank => "space or tab",
                Rule::year => "4-digit year",
                Rule::month => "1 or 2-digit month",
                Rule::day => "1 or 2-digit day",
                Rule::date => "date (YYYY/M/D)",
                Rule::description => "description",
                Rule::date_header => "date header",
                Rule::neg => "'-'",
                Rule::number => "number",
                Rule::fiat => "'$'",
                Rule::commodity => "currency",
                Rule::fiat_amount => "fiat amount ($1.00)",
                Rule::unit_amount => "amount with currency (1.00 XYZ)",
                Rule::amount => "amount",
                Rule::filename => "file name",
                Rule::include => "include directive",
            }
            .to_string()
        });
        let location = match &err.line_col {
            pest::error::LineColLocation::Pos(ref p) => *p,
            pest::error::LineColLocation::Span(ref p, _) => *p,
        };
        ParseError {
            kind: ParseErrorKind::InvalidInput {
                message: format!("{}", err),
            },
            location,
            source: Some(Box::new(err)),
        }
    }
}
