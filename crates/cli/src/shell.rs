//! Line-oriented shell: reads commands, executes them, writes one reply each.

use crate::command::{Command, Reply};
use rankset_core::Registry;
use serde_json::json;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// How replies are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `(integer) 3`, `(nil)`, numbered arrays.
    #[default]
    Text,
    /// One JSON value per line; errors become `{"error": "..."}`.
    Json,
}

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub commands: u64,
    pub errors: u64,
}

fn write_reply<W: Write>(out: &mut W, reply: &Reply, format: OutputFormat) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{reply}"),
        OutputFormat::Json => writeln!(out, "{}", json!(reply)),
    }
}

fn write_error<W: Write>(out: &mut W, message: &str, format: OutputFormat) -> std::io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "(error) {message}"),
        OutputFormat::Json => writeln!(out, "{}", json!({ "error": message })),
    }
}

/// Runs every line of `input` against `registry`. Command errors are
/// reported inline and do not stop the session; I/O errors do.
pub fn run<R: BufRead, W: Write>(
    registry: &Registry,
    input: R,
    mut out: W,
    format: OutputFormat,
) -> anyhow::Result<SessionStats> {
    let mut stats = SessionStats::default();
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        let parsed = match Command::parse(&line) {
            Ok(None) => continue,
            Ok(Some(cmd)) => cmd,
            Err(e) => {
                stats.commands += 1;
                stats.errors += 1;
                warn!(line = lineno + 1, error = %e, "rejected command");
                write_error(&mut out, &e.to_string(), format)?;
                continue;
            }
        };
        stats.commands += 1;
        debug!(line = lineno + 1, command = ?parsed, "executing");
        match parsed.execute(registry) {
            Ok(reply) => write_reply(&mut out, &reply, format)?,
            Err(e) => {
                stats.errors += 1;
                warn!(line = lineno + 1, error = %e, "command failed");
                write_error(&mut out, &e.to_string(), format)?;
            }
        }
    }
    out.flush()?;
    Ok(stats)
}
