//! Result collection and the source→destination report.

use std::io::{self, Write};

use tokio::sync::mpsc::Receiver;

use crate::pipeline::RenderResult;

/// Drain the result stream until the coordinator closes it.
///
/// Rows are collected in arrival order; completeness, not ordering, is the
/// guarantee.
pub async fn drain(mut rx: Receiver<RenderResult>) -> Vec<RenderResult> {
    let mut results = Vec::new();
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    results
}

/// Write the two-column source→destination table, flushing once.
///
/// Failed entries carry no usable destination and are omitted; the caller
/// reports them separately.
pub fn write_report<W: Write>(results: &[RenderResult], out: &mut W) -> io::Result<()> {
    let rows: Vec<(String, String)> = results
        .iter()
        .filter(|r| r.error.is_none())
        .map(|r| {
            (
                r.source.display().to_string(),
                r.dest.display().to_string(),
            )
        })
        .collect();

    let width = rows
        .iter()
        .map(|(src, _)| src.len())
        .chain(std::iter::once("src".len()))
        .max()
        .unwrap_or(3);

    writeln!(out, "{:<width$}\t{}", "src", "dst")?;
    writeln!(out, "{:<width$}\t{}", "---", "---")?;
    for (src, dst) in &rows {
        writeln!(out, "{src:<width$}\t{dst}")?;
    }

    out.flush()
}
