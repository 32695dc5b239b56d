//! Output rendering: aligned plain-text tables or compact JSON
//!
//! Renderers write to any `io::Write` sink, never directly to stdout.

use std::io::{self, Write};

use itertools::Itertools;
use serde::Serialize;

/// Gap between table columns.
const COLUMN_GAP: &str = "  ";

/// Parameters for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub no_header: bool,
}

/// Write `rows` as a column-aligned table with an upper-cased header.
///
/// Every row must have as many cells as there are columns.
pub fn as_table<W, S>(
    out: &mut W,
    columns: &[&str],
    rows: &[Vec<S>],
    opts: RenderOptions,
) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    let header: Vec<String> = columns.iter().map(|c| c.to_uppercase()).collect();

    let mut widths: Vec<usize> = if opts.no_header {
        vec![0; columns.len()]
    } else {
        header.iter().map(|h| h.chars().count()).collect()
    };
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.as_ref().chars().count());
        }
    }

    if !opts.no_header {
        write_row(out, &header, &widths)?;
    }
    for row in rows {
        write_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_row<W, S>(out: &mut W, cells: &[S], widths: &[usize]) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .join(COLUMN_GAP);
    writeln!(out, "{}", line.trim_end())
}

/// Write `value` as compact JSON followed by a single newline.
///
/// # Panics
/// If `value` cannot be encoded as JSON. That is a defect in the caller, not a
/// runtime condition.
pub fn as_json<W, T>(out: &mut W, value: &T) -> io::Result<()>
where
    W: Write + ?Sized,
    T: Serialize + ?Sized,
{
    let mut json = match serde_json::to_vec(value) {
        Ok(json) => json,
        Err(e) => panic!("value is not encodable as JSON: {e}"),
    };
    json.push(b'\n');
    out.write_all(&json)
}
