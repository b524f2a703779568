//! Rendered parse errors
//!
//! A [`Cause`] is positions and messages; a [`ParseError`] is what a
//! person reads: the line and column, the offending source line with its
//! surrounding context, and a marker pointing at the exact column.

use thiserror::Error;

use crate::cause::Cause;

/// The user-facing parse failure.
///
/// `line` is 1-based; `column` is 0-based (the character offset from the
/// start of the line). `marked` is the ready-to-print block: context
/// lines above, the source line, a marker line ending in `^--`, and the
/// context lines below.
#[derive(Debug, Clone, Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    /// Byte position in the input.
    pub position: usize,
    pub line: usize,
    pub column: usize,
    /// The line the failure is on.
    pub source_line: String,
    /// The surrounding lines, without the source line itself.
    pub context: Vec<String>,
    /// The printable context-plus-marker block.
    pub marked: String,
    /// Name of the parser that failed, when one was recorded.
    pub parser: Option<String>,
    /// The full cause chain (present when the *causes* bit was on).
    pub cause: Option<Box<Cause>>,
    /// The deepest failure observed, when it differs from the reported one.
    pub latest: Option<Box<Cause>>,
}

/// 1-based line and 0-based character column of a byte position.
pub fn get_line_num(input: &str, position: usize) -> (usize, usize) {
    let position = position.min(input.len());
    let before = &input[..position];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = input[line_start..position].chars().count();
    (line, column)
}

/// Render a cause against its input.
pub fn get_parse_error(cause: &Cause, input: &str, context_lines: usize) -> ParseError {
    let (line, column) = get_line_num(input, cause.position);
    let lines: Vec<&str> = input.split('\n').collect();
    let index = line - 1;

    let above_from = index.saturating_sub(context_lines);
    let above: Vec<String> = lines[above_from..index].iter().map(|l| l.to_string()).collect();
    let below_to = (index + 1 + context_lines).min(lines.len());
    let below: Vec<String> = lines[index + 1..below_to].iter().map(|l| l.to_string()).collect();

    let source_line = lines.get(index).copied().unwrap_or("").to_string();
    let marker = marker_line(&source_line, column);

    let mut block: Vec<&str> = Vec::new();
    block.extend(above.iter().map(String::as_str));
    block.push(&source_line);
    block.push(&marker);
    block.extend(below.iter().map(String::as_str));
    let marked = block.join("\n");

    let mut context = above;
    context.extend(below.iter().cloned());

    ParseError {
        message: cause.message.clone(),
        position: cause.position,
        line,
        column,
        source_line,
        context,
        marked,
        parser: cause.name.clone(),
        cause: None,
        latest: None,
    }
}

/// A space for each character before the error column (tabs preserved so
/// the marker lines up under tabbed source), then the indicator.
fn marker_line(source_line: &str, column: usize) -> String {
    let mut marker = String::with_capacity(column + 3);
    for c in source_line.chars().take(column) {
        marker.push(if c == '\t' { '\t' } else { ' ' });
    }
    marker.push_str("^--");
    marker
}
