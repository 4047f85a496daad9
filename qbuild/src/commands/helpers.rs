//! Shared helper functions for qbuild commands.

use anyhow::{Context, Result};
use qbuild_common::RunOutcome;
use std::path::{Path, PathBuf};

/// Exit status of a run that reached the remote host and failed.
pub const EXIT_FAILED: i32 = 1;
/// Exit status of a run stopped by validation.
pub const EXIT_ABORTED: i32 = 2;

/// Absolute workspace root, `~` expanded. Defaults to the current directory.
pub fn workspace_root(arg: Option<&str>) -> Result<PathBuf> {
    match arg {
        Some(raw) => absolute(raw),
        None => std::env::current_dir().context("failed to read the current directory"),
    }
}

/// Absolute form of a user-supplied path, `~` expanded.
pub fn absolute(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::tilde(raw);
    std::path::absolute(Path::new(expanded.as_ref()))
        .with_context(|| format!("invalid path '{}'", raw))
}

pub fn exit_code(outcome: &RunOutcome) -> i32 {
    match outcome {
        RunOutcome::Succeeded(_) => 0,
        RunOutcome::Failed { .. } => EXIT_FAILED,
        RunOutcome::Aborted { .. } => EXIT_ABORTED,
    }
}

/// Indent each line of text with a given prefix.
pub fn indent_lines(text: &str, prefix: &str) -> String {
    let mut out = String::new();
    for (idx, line) in text.lines().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        out.push_str(prefix);
        out.push_str(line);
    }
    out
}
