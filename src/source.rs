//! Where ledger text comes from, and the expansion of `!include` directives.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use plain_ledger_parser::normalize::{include_target, strip_comment};

use super::Error;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("{} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads the text of a ledger file.
pub trait TextSource {
    fn read(&self, path: &Path) -> Result<String, SourceError>;
}

/// Reads ledger files from disk.
#[derive(Copy, Clone, Debug, Default)]
pub struct FsSource;

impl TextSource for FsSource {
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
            _ => SourceError::Io {
                path: path.to_path_buf(),
                source,
            },
        })
    }
}

/// Ledger files held in memory, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file<P: Into<PathBuf>, S: Into<String>>(mut self, path: P, text: S) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert<P: Into<PathBuf>, S: Into<String>>(&mut self, path: P, text: S) {
        self.files.insert(path.into(), text.into());
    }
}

impl TextSource for MemorySource {
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(path.to_path_buf()))
    }
}

/// Reads `path` and splices every file it includes in place of the directive line, recursively.
///
/// Include targets are relative to the directory of the file holding the directive.  Comments
/// are removed from every line; a line holding only a comment stays as an empty line.
pub fn resolve_includes<S: TextSource + ?Sized>(source: &S, path: &Path) -> Result<String, Error> {
    let text = source.read(path)?;
    let mut out = String::with_capacity(text.len());
    let mut stack = vec![path.to_path_buf()];
    splice(source, path, &text, &mut stack, &mut out)?;
    Ok(out)
}

fn splice<S: TextSource + ?Sized>(
    source: &S,
    path: &Path,
    text: &str,
    stack: &mut Vec<PathBuf>,
    out: &mut String,
) -> Result<(), Error> {
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    for line in text.lines() {
        let target = match include_target(line) {
            Some(target) => dir.join(target),
            None => {
                out.push_str(strip_comment(line));
                out.push('\n');
                continue;
            }
        };
        if stack.contains(&target) {
            return Err(Error::IncludeCycle { path: target });
        }
        debug!("including {} from {}", target.display(), path.display());
        let included = source.read(&target).map_err(|e| match e {
            SourceError::NotFound(path) => Error::MissingIncludeFile { path },
            other => Error::Source(other),
        })?;
        trace!("{} is {} bytes", target.display(), included.len());
        stack.push(target.clone());
        let result = splice(source, &target, &included, stack, out);
        stack.pop();
        result?;
    }
    Ok(())
}
