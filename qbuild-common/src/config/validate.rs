//! Structural checks on a resolved project configuration.

use crate::types::{CommandEnvironment, FileSystem, ProjectConfig};
use std::collections::HashSet;
use std::fmt;

/// How serious a configuration finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Worth knowing, the configuration still works.
    Info,
    /// Some actions will not run.
    Warning,
    /// No run can succeed with this configuration.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single configuration finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub severity: Severity,
    /// JSON path of the offending field, e.g. `actions[2].command`.
    pub field: String,
    pub message: String,
}

impl ConfigWarning {
    fn new(severity: Severity, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.field, self.message)
    }
}

/// Report everything wrong with `config`, most severe first.
pub fn validate_project(config: &ProjectConfig) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.build_library.trim().is_empty() {
        warnings.push(ConfigWarning::new(
            Severity::Error,
            "buildLibrary",
            "build library is empty",
        ));
    } else if config.build_library.chars().count() > 10 {
        warnings.push(ConfigWarning::new(
            Severity::Warning,
            "buildLibrary",
            format!(
                "'{}' is longer than 10 characters and will be rejected by the remote host",
                config.build_library
            ),
        ));
    }

    if config.actions.is_empty() {
        warnings.push(ConfigWarning::new(
            Severity::Error,
            "actions",
            "no actions are configured",
        ));
    }

    let mut seen = HashSet::new();
    for (i, action) in config.actions.iter().enumerate() {
        if !seen.insert(action.name.as_str()) {
            warnings.push(ConfigWarning::new(
                Severity::Warning,
                format!("actions[{}].name", i),
                format!("duplicate action name '{}'; only the first is reachable", action.name),
            ));
        }
        if action.command.trim().is_empty() {
            warnings.push(ConfigWarning::new(
                Severity::Warning,
                format!("actions[{}].command", i),
                format!("action '{}' has an empty command", action.name),
            ));
        }
        if let FileSystem::Unsupported(raw) = &action.file_system {
            warnings.push(ConfigWarning::new(
                Severity::Warning,
                format!("actions[{}].fileSystem", i),
                format!("unsupported file system '{}'", raw),
            ));
        }
        if let CommandEnvironment::Unsupported(raw) = &action.command_environment {
            warnings.push(ConfigWarning::new(
                Severity::Warning,
                format!("actions[{}].commandEnvironment", i),
                format!("unsupported command environment '{}'", raw),
            ));
        }
        if let Some(exts) = &action.extensions
            && let Some(upper) = exts.iter().find(|e| e.to_lowercase() != **e)
        {
            warnings.push(ConfigWarning::new(
                Severity::Info,
                format!("actions[{}].extensions", i),
                format!("extension '{}' is not lowercase and is matched case-insensitively", upper),
            ));
        }
    }

    warnings.sort_by(|a, b| b.severity.cmp(&a.severity));
    warnings
}
