//! Interpretation of a finished remote command.

use crate::errors::BuildError;
use crate::types::ExecutionResult;
use crate::util::contains_ignore_ascii_case;

/// Compiler option that produces an event file.
pub const EVENT_FILE_OPTION: &str = "*EVENTF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

/// Exit code 0 or no status at all counts as success.
pub fn classify(result: &ExecutionResult) -> Outcome {
    match result.exit_code {
        None | Some(0) => Outcome::Success,
        Some(_) => Outcome::Failure,
    }
}

/// Stderr then stdout, each non-empty part followed by a blank line.
pub fn combined_output(result: &ExecutionResult) -> String {
    let mut output = String::new();
    for part in [&result.stderr, &result.stdout] {
        if !part.is_empty() {
            output.push_str(part);
            output.push_str("\n\n");
        }
    }
    output
}

/// What the caller shows after a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub outcome: Outcome,
    /// The command wrote an event file worth reloading.
    pub refresh_diagnostics: bool,
    pub output: String,
    pub message: String,
}

impl Report {
    /// Build the report for `action` run against `library/object`.
    pub fn new(
        action: &str,
        command: &str,
        library: &str,
        object: &str,
        result: &ExecutionResult,
    ) -> Self {
        let outcome = classify(result);
        let message = match outcome {
            Outcome::Success => format!("Action {} for {}/{} was successful.", action, library, object),
            Outcome::Failure => failure(action, library, object, result)
                .map(|e| e.to_string())
                .unwrap_or_default(),
        };
        Self {
            outcome,
            refresh_diagnostics: outcome == Outcome::Success
                && contains_ignore_ascii_case(command, EVENT_FILE_OPTION),
            output: combined_output(result),
            message,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// The failure error for a non-zero exit code, if there was one.
pub fn failure(
    action: &str,
    library: &str,
    object: &str,
    result: &ExecutionResult,
) -> Option<BuildError> {
    match result.exit_code {
        Some(code) if code != 0 => Some(BuildError::ExecutionFailure {
            action: action.to_string(),
            library: library.to_string(),
            object: object.to_string(),
            exit_code: code,
        }),
        _ => None,
    }
}
