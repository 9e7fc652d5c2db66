//! Comment removal and include directive recognition.
//!
//! Reading included files is left to the caller; see [`include_target`].

use pest::Parser;

use super::{LedgerParser, Rule};

/// Cuts a line at its first `;` and drops the whitespace left in front of it.
///
/// Lines without a comment are returned untouched, so a posting with a trailing tab and no
/// amount keeps its tab.
pub fn strip_comment(line: &str) -> &str {
    match line.find(';') {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}

/// Returns the file named by an `!include <filename>` line, or `None` for any other line.
/// Comments are ignored, so a commented-out directive is not an include.
pub fn include_target(line: &str) -> Option<&str> {
    let line = strip_comment(line);
    LedgerParser::parse(Rule::include, line)
        .ok()
        .and_then(|mut pairs| pairs.next())
        .and_then(|include| {
            include
                .into_inner()
                .find(|p| p.as_rule() == Rule::filename)
        })
        .map(|filename| filename.as_str().trim())
        .filter(|filename| !filename.is_empty())
}
