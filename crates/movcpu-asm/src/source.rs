//! Source ingestion from files and readers.
//!
//! Lines keep their original 1-indexed numbers so errors can point back at
//! the input.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

/// Label used for source read from standard input.
pub const STDIN_LABEL: &str = "<stdin>";

/// A line of source with its original location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The source text (without trailing newline).
    pub text: String,
    /// 1-indexed line number in the original input.
    pub original_line: usize,
}

/// Source content read from one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContent {
    /// All lines in input order.
    pub lines: Vec<SourceLine>,
    /// The file path or input label (for error reporting).
    pub file_path: String,
}

/// Splits `content` into numbered lines labelled with `file_path`.
#[must_use]
pub fn extract_source(file_path: &Path, content: &str) -> SourceContent {
    SourceContent {
        lines: content
            .lines()
            .enumerate()
            .map(|(idx, line)| SourceLine {
                text: line.to_string(),
                original_line: idx + 1,
            })
            .collect(),
        file_path: file_path.to_string_lossy().to_string(),
    }
}

/// Reads and splits a source file.
///
/// # Errors
///
/// Returns the I/O error when the file cannot be read as UTF-8 text.
pub fn read_source_file(path: &Path) -> io::Result<SourceContent> {
    let content = fs::read_to_string(path)?;
    Ok(extract_source(path, &content))
}

/// Reads every line from `reader`, labelling the content with `label`.
///
/// # Errors
///
/// Returns the first I/O error raised by the reader.
pub fn read_source<R: BufRead>(reader: R, label: &str) -> io::Result<SourceContent> {
    let lines = reader
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            line.map(|text| SourceLine {
                text,
                original_line: idx + 1,
            })
        })
        .collect::<io::Result<Vec<_>>>()?;

    Ok(SourceContent {
        lines,
        file_path: label.to_string(),
    })
}
