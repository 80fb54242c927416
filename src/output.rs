//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Compress
//!
//! ```text
//! 001 IMG_0001.jpg
//!     Source: /dcim/IMG_0001.jpg
//!     Output: /tmp/TempImgs/3f2a….jpg
//! 002 broken.jpg
//!     Source: /dcim/broken.jpg
//!     Output: unchanged
//!
//! Compressed 1 of 2 images
//! ```
//!
//! ## Call
//!
//! ```text
//! pickImages → success
//!     /dcim/a.jpg
//!     /dcim/b.jpg
//! checkPermission → success: true
//! compressImages → error [invalid-arguments]: missing field `imgPaths`
//! pickAudio → not implemented
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::bridge::Reply;
use serde_json::Value;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}

// ============================================================================
// compress
// ============================================================================

/// One input of a `compress` run and what it became.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressOutcome {
    pub source: String,
    /// `None` when the input was dropped (empty result).
    pub output: Option<String>,
}

impl CompressOutcome {
    fn compressed(&self) -> bool {
        self.output.as_deref().is_some_and(|o| o != self.source)
    }
}

/// Pair inputs with the normalizer's results.
///
/// Results are in input order and only empty inputs produce no result.
pub fn pair_outcomes(inputs: &[String], results: &[String]) -> Vec<CompressOutcome> {
    let mut results = results.iter();
    inputs
        .iter()
        .map(|source| {
            let output = if source.is_empty() {
                None
            } else {
                results.next().cloned()
            };
            CompressOutcome {
                source: source.clone(),
                output,
            }
        })
        .collect()
}

pub fn format_compress_output(outcomes: &[CompressOutcome]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, outcome) in outcomes.iter().enumerate() {
        lines.push(format!(
            "{} {}",
            format_index(i + 1),
            file_name(&outcome.source)
        ));
        lines.push(format!("{}Source: {}", indent(1), outcome.source));
        let output = match &outcome.output {
            Some(o) if outcome.compressed() => o.as_str(),
            Some(_) => "unchanged",
            None => "dropped",
        };
        lines.push(format!("{}Output: {}", indent(1), output));
    }

    let compressed = outcomes.iter().filter(|o| o.compressed()).count();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Compressed {} of {} images",
        compressed,
        outcomes.len()
    ));
    lines
}

pub fn print_compress_output(outcomes: &[CompressOutcome]) {
    for line in format_compress_output(outcomes) {
        println!("{}", line);
    }
}

// ============================================================================
// clear-temp
// ============================================================================

pub fn format_clear_output(work_dir: &Path, removed: bool) -> Vec<String> {
    if removed {
        vec![format!("Removed {}", work_dir.display())]
    } else {
        vec![format!("Could not fully remove {}", work_dir.display())]
    }
}

pub fn print_clear_output(work_dir: &Path, removed: bool) {
    for line in format_clear_output(work_dir, removed) {
        println!("{}", line);
    }
}

// ============================================================================
// call
// ============================================================================

/// Format a bridge reply. List values get one indented line per entry.
pub fn format_reply(method: &str, reply: &Reply) -> Vec<String> {
    match reply {
        Reply::Success(Value::Array(items)) => {
            let mut lines = vec![format!("{} → success", method)];
            lines.extend(items.iter().map(|item| {
                let text = match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!("{}{}", indent(1), text)
            }));
            lines
        }
        Reply::Success(value) => vec![format!("{} → success: {}", method, value)],
        Reply::Error { code, message, .. } => {
            vec![format!("{} → error [{}]: {}", method, code, message)]
        }
        Reply::NotImplemented => vec![format!("{} → not implemented", method)],
    }
}

pub fn print_reply(method: &str, reply: &Reply) {
    for line in format_reply(method, reply) {
        println!("{}", line);
    }
}
