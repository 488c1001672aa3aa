//! # Column Text Layout
//!
//! Lays out up to three columns of text as fixed-width character cells.
//!
//! ## Overflow
//!
//! A text wider than its column is cut into chunks of at most the column
//! width and continues on the next physical line, starting again at the
//! first cell of that column. Columns that ran out of text are left blank
//! on continuation lines.
//!
//! ```text
//! widths: 10 | 4 | 6
//! "Chocolate croissant" | "2" | "3.50"
//!
//! Chocolate    2  3.50
//! croissant
//! ```

use super::width::{char_width, text_width};
use crate::error::PrinterError;
use crate::protocol::text::Alignment;

/// Most columns one call can lay out (one per alignment slot)
pub const MAX_COLUMNS: usize = 3;

/// Lay out column texts into physical lines.
///
/// `texts` and `widths` are parallel; `aligns` always has three entries and
/// slot `i` applies to column `i`. Trailing blanks are trimmed from each line.
///
/// ## Errors
///
/// `InvalidArgument` when `texts` and `widths` differ in length, when there
/// are no columns or more than three, or when a width is zero.
pub fn layout_columns<S: AsRef<str>>(
    texts: &[S],
    widths: &[usize],
    aligns: &[Alignment; 3],
) -> Result<Vec<String>, PrinterError> {
    if texts.len() != widths.len() {
        return Err(PrinterError::InvalidArgument(format!(
            "{} column texts but {} column widths",
            texts.len(),
            widths.len()
        )));
    }
    if texts.is_empty() || texts.len() > MAX_COLUMNS {
        return Err(PrinterError::InvalidArgument(format!(
            "{} columns (expected 1 to {})",
            texts.len(),
            MAX_COLUMNS
        )));
    }
    if let Some(pos) = widths.iter().position(|&w| w == 0) {
        return Err(PrinterError::InvalidArgument(format!(
            "column {} has zero width",
            pos
        )));
    }

    let chunked: Vec<Vec<String>> = texts
        .iter()
        .zip(widths)
        .map(|(text, &width)| split_chunks(text.as_ref(), width))
        .collect();

    let rows = chunked.iter().map(Vec::len).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(rows);

    for row in 0..rows {
        let mut line = String::new();
        for (col, chunks) in chunked.iter().enumerate() {
            let chunk = chunks.get(row).map(String::as_str).unwrap_or("");
            let align = if row == 0 { aligns[col] } else { Alignment::Left };
            pad_into(&mut line, chunk, widths[col], align);
        }
        line.truncate(line.trim_end_matches(' ').len());
        lines.push(line);
    }

    Ok(lines)
}

/// Split text into chunks no wider than `width`. Explicit newlines also
/// break, except a trailing one; a character wider than the column becomes
/// a chunk of its own.
fn split_chunks(text: &str, width: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let text = text.strip_suffix('\n').unwrap_or(text);

    for segment in text.split('\n') {
        let mut current = String::new();
        let mut used = 0;
        for c in segment.chars().filter(|&c| c != '\r') {
            let w = char_width(c);
            if used + w > width && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                used = 0;
            }
            current.push(c);
            used += w;
        }
        chunks.push(current);
    }

    chunks
}

fn pad_into(line: &mut String, chunk: &str, width: usize, align: Alignment) {
    let spaces = width.saturating_sub(text_width(chunk));
    let (before, after) = match align {
        Alignment::Left => (0, spaces),
        Alignment::Right => (spaces, 0),
        Alignment::Center => (spaces / 2, spaces - spaces / 2),
    };
    line.extend(std::iter::repeat_n(' ', before));
    line.push_str(chunk);
    line.extend(std::iter::repeat_n(' ', after));
}
