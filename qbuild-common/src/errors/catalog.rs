//! Error catalog for qbuild.
//!
//! Every failure a run can end in has a stable code (`QB-E001` and up), a
//! message, and remediation steps the CLI prints under the failure.
//!
//! | Range      | Category    | Description                          |
//! |------------|-------------|--------------------------------------|
//! | E001-E099  | Config      | Project and user configuration       |
//! | E100-E199  | Target      | Target file and action selection     |
//! | E200-E299  | Transfer    | Uploading sources to the remote host |
//! | E300-E399  | Build       | Remote command execution             |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every way a run can end badly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // =========================================================================
    // Config Errors (E001-E099)
    // =========================================================================
    /// No project configuration in the workspace
    ConfigNotFound,
    /// Project configuration could not be read or parsed
    ConfigReadError,
    /// Project configuration is structurally incomplete
    ConfigValidationError,
    /// Environment variable has invalid value
    ConfigEnvError,

    // =========================================================================
    // Target Errors (E100-E199)
    // =========================================================================
    /// Folder, name or extension exceeds the remote identifier limit
    TargetIdentifierTooLong,
    /// No configured action applies to the target extension
    TargetNoApplicableAction,
    /// No action was chosen
    TargetNoActionChosen,
    /// The chosen action name is not configured
    TargetActionNotFound,
    /// Action names an unsupported file system or command environment
    TargetUnsupportedEnvironment,
    /// The target file could not be read locally
    TargetUnreadable,

    // =========================================================================
    // Transfer Errors (E200-E299)
    // =========================================================================
    /// Creating or filling a remote member failed
    TransferUploadFailed,

    // =========================================================================
    // Build Errors (E300-E399)
    // =========================================================================
    /// Remote command could not be dispatched
    BuildDispatchFailed,
    /// Remote command finished with a failure status
    BuildCommandFailed,
}

impl ErrorCode {
    /// Returns the numeric error code (without prefix).
    #[must_use]
    pub const fn code_number(&self) -> u16 {
        match self {
            // Config (001-099)
            Self::ConfigNotFound => 1,
            Self::ConfigReadError => 2,
            Self::ConfigValidationError => 3,
            Self::ConfigEnvError => 4,

            // Target (100-199)
            Self::TargetIdentifierTooLong => 100,
            Self::TargetNoApplicableAction => 101,
            Self::TargetNoActionChosen => 102,
            Self::TargetActionNotFound => 103,
            Self::TargetUnsupportedEnvironment => 104,
            Self::TargetUnreadable => 105,

            // Transfer (200-299)
            Self::TransferUploadFailed => 200,

            // Build (300-399)
            Self::BuildDispatchFailed => 300,
            Self::BuildCommandFailed => 301,
        }
    }

    /// `QB-E` followed by the zero-padded number.
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("QB-E{:03}", self.code_number())
    }

    /// Category implied by the number range.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self.code_number() {
            1..=99 => ErrorCategory::Config,
            100..=199 => ErrorCategory::Target,
            200..=299 => ErrorCategory::Transfer,
            _ => ErrorCategory::Build,
        }
    }

    #[must_use]
    pub fn entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code_string(),
            category: self.category(),
            message: self.message().to_string(),
            remediation: self
                .remediation()
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }

    /// One-line summary shown next to the code.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ConfigNotFound => "No project configuration found in this workspace",
            Self::ConfigReadError => "Failed to read the project configuration",
            Self::ConfigValidationError => "Project configuration is incomplete",
            Self::ConfigEnvError => "Environment variable has invalid value",
            Self::TargetIdentifierTooLong => "Target identifier exceeds the remote name limit",
            Self::TargetNoApplicableAction => "No action applies to this file type",
            Self::TargetNoActionChosen => "No action was chosen",
            Self::TargetActionNotFound => "Chosen action is not configured",
            Self::TargetUnsupportedEnvironment => {
                "Action uses an unsupported file system or command environment"
            }
            Self::TargetUnreadable => "Target file could not be read",
            Self::TransferUploadFailed => "Failed to upload sources to the remote host",
            Self::BuildDispatchFailed => "Failed to run the command on the remote host",
            Self::BuildCommandFailed => "Remote command reported a failure",
        }
    }

    /// What the developer can try, most likely fix first.
    #[must_use]
    pub const fn remediation(&self) -> &'static [&'static str] {
        match self {
            Self::ConfigNotFound => &[
                "Run 'qbuild init' to create a default configuration",
                "Check that the workspace root contains .qbuild/project.json",
            ],
            Self::ConfigReadError => &[
                "Check that .qbuild/project.json is valid JSON",
                "Check file permissions on the configuration",
            ],
            Self::ConfigValidationError => &[
                "Set a non-empty buildLibrary",
                "Configure at least one action",
                "Run 'qbuild check' for details",
            ],
            Self::ConfigEnvError => &["Check QBUILD_* environment variables"],
            Self::TargetIdentifierTooLong => &[
                "Folder and member names are limited to 10 characters",
                "Source type extensions are limited to 6 characters",
                "Rename the file or its directory",
            ],
            Self::TargetNoApplicableAction => &[
                "Add the extension to an action's extensions list",
                "Or add an action without an extensions list",
            ],
            Self::TargetNoActionChosen => &["Pick an action or pass --action"],
            Self::TargetActionNotFound => &["Run 'qbuild actions <file>' to list action names"],
            Self::TargetUnsupportedEnvironment => &[
                "Set fileSystem and commandEnvironment to \"qsys\"",
            ],
            Self::TargetUnreadable => &[
                "Save the file and check that it still exists",
                "Check read permissions on the file",
            ],
            Self::TransferUploadFailed => &[
                "Check the SSH connection settings in ~/.config/qbuild/config.toml",
                "Check that the build library exists and is writable",
            ],
            Self::BuildDispatchFailed => &[
                "Check that the remote host is reachable",
                "Run with --verbose for transport details",
            ],
            Self::BuildCommandFailed => &[
                "Review the compiler output printed above",
                "Check the library list in ~/.config/qbuild/config.toml",
            ],
        }
    }

    #[must_use]
    pub fn all() -> &'static [ErrorCode] {
        &[
            Self::ConfigNotFound,
            Self::ConfigReadError,
            Self::ConfigValidationError,
            Self::ConfigEnvError,
            Self::TargetIdentifierTooLong,
            Self::TargetNoApplicableAction,
            Self::TargetNoActionChosen,
            Self::TargetActionNotFound,
            Self::TargetUnsupportedEnvironment,
            Self::TargetUnreadable,
            Self::TransferUploadFailed,
            Self::BuildDispatchFailed,
            Self::BuildCommandFailed,
        ]
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code_string(), self.message())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Target,
    Transfer,
    Build,
}

impl ErrorCategory {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Config => "Configuration",
            Self::Target => "Target",
            Self::Transfer => "Transfer",
            Self::Build => "Build",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A code resolved to owned text, ready to print or serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub code: String,
    pub category: ErrorCategory,
    pub message: String,
    pub remediation: Vec<String>,
}

impl ErrorEntry {
    /// Summary line, a blank line, then the numbered steps.
    #[must_use]
    pub fn format_full(&self) -> String {
        let steps: String = self
            .remediation
            .iter()
            .enumerate()
            .map(|(i, step)| format!("  {}. {}\n", i + 1, step))
            .collect();
        if steps.is_empty() {
            return self.format_brief();
        }
        format!("{}\n\nTry:\n{}", self.format_brief(), steps)
    }

    #[must_use]
    pub fn format_brief(&self) -> String {
        format!("[{}] {}", self.code, self.message)
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_brief())
    }
}
