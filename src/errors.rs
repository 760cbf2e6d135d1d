//! Error types for reading crossword structures and word lists.
//!
//! Each variant has a stable code for lookup:
//!
//! - E001: `Io` (File could not be read)
//! - E002: `EmptyStructure` (Structure has no cells)
//! - E003: `InconsistentRowLength` (Structure rows differ in length)

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Structure has no cells")]
    EmptyStructure,

    #[error("Row {row} has {found} cells, expected {expected}")]
    InconsistentRowLength { row: usize, expected: usize, found: usize },
}

impl ParseError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::Io { .. } => "E001",
            ParseError::EmptyStructure => "E002",
            ParseError::InconsistentRowLength { .. } => "E003",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ParseError::Io { .. } => None,
            ParseError::EmptyStructure => Some("Use one line per row, with '_' for open cells and '#' for blocks"),
            ParseError::InconsistentRowLength { .. } => Some("Pad every row to the same width with '#'"),
        }
    }

    /// Formats the error with code and optional help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        match self.help() {
            Some(help) => format!("{} ({})\n  help: {}", self, self.code(), help),
            None => format!("{} ({})", self, self.code()),
        }
    }
}
