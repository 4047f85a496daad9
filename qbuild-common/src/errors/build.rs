//! Terminal failures of a single action run.

use super::catalog::ErrorCode;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Which derived identifier broke its length ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierField {
    Folder,
    Name,
    Extension,
}

impl IdentifierField {
    /// Maximum length of the identifier on the remote host.
    pub const fn max_len(self) -> usize {
        match self {
            Self::Folder | Self::Name => 10,
            Self::Extension => 6,
        }
    }
}

impl fmt::Display for IdentifierField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::Name => write!(f, "name"),
            Self::Extension => write!(f, "extension"),
        }
    }
}

/// Errors that end an action run.
///
/// None of these are fatal to the host process; the pipeline turns every one
/// of them into a reported outcome.
#[derive(Debug, Error)]
pub enum BuildError {
    /// No project configuration exists yet.
    #[error("no project configuration found at {}", path.display())]
    ConfigMissing { path: PathBuf },

    /// The configuration exists but could not be read or parsed.
    #[error("failed to read {}: {message}", path.display())]
    ConfigRead { path: PathBuf, message: String },

    /// The configuration is structurally incomplete.
    #[error("project configuration is invalid: {0}")]
    ConfigInvalid(String),

    #[error("{field} '{value}' is {length} characters long, the limit is {max}")]
    IdentifierTooLong {
        field: IdentifierField,
        value: String,
        length: usize,
        max: usize,
    },

    /// The target could not be read locally.
    #[error("cannot read {}: {message}", path.display())]
    TargetUnreadable { path: PathBuf, message: String },

    #[error("no action applies to '.{extension}' files")]
    NoApplicableActions { extension: String },

    #[error("no action chosen")]
    NoActionChosen,

    #[error("action '{0}' is not configured")]
    ActionNotFound(String),

    #[error("action '{action}' uses unsupported {kind} '{value}'")]
    UnsupportedEnvironment {
        action: String,
        kind: &'static str,
        value: String,
    },

    /// Any failure while creating members or pushing their content.
    #[error("upload failed: {0}")]
    UploadFailure(String),

    /// Transport or remote failure while dispatching the command.
    #[error("failed to run remote command: {0}")]
    Execution(String),

    /// The command ran and reported a failure status.
    #[error("action '{action}' failed for {library}/{object} with exit code {exit_code}")]
    ExecutionFailure {
        action: String,
        library: String,
        object: String,
        exit_code: i32,
    },
}

impl BuildError {
    /// Catalog code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::ConfigMissing { .. } => ErrorCode::ConfigNotFound,
            Self::ConfigRead { .. } => ErrorCode::ConfigReadError,
            Self::ConfigInvalid(_) => ErrorCode::ConfigValidationError,
            Self::IdentifierTooLong { .. } => ErrorCode::TargetIdentifierTooLong,
            Self::TargetUnreadable { .. } => ErrorCode::TargetUnreadable,
            Self::NoApplicableActions { .. } => ErrorCode::TargetNoApplicableAction,
            Self::NoActionChosen => ErrorCode::TargetNoActionChosen,
            Self::ActionNotFound(_) => ErrorCode::TargetActionNotFound,
            Self::UnsupportedEnvironment { .. } => ErrorCode::TargetUnsupportedEnvironment,
            Self::UploadFailure(_) => ErrorCode::TransferUploadFailed,
            Self::Execution(_) => ErrorCode::BuildDispatchFailed,
            Self::ExecutionFailure { .. } => ErrorCode::BuildCommandFailed,
        }
    }

    /// True for failures that happen before any remote side effect.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            Self::UploadFailure(_) | Self::Execution(_) | Self::ExecutionFailure { .. }
        )
    }
}
