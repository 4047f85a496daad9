//! Common types shared by the pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Project configuration as saved in `.qbuild/project.json`.
///
/// Field names follow the saved action format (`buildLibrary`, `fileSystem`,
/// `commandEnvironment`) so existing configurations keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Remote library that objects are compiled into.
    #[serde(default)]
    pub build_library: String,
    /// Configured actions, in the order they are offered.
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A named, extension-filtered remote build command template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    /// Unique name, used as the selection key.
    pub name: String,
    /// Command template containing `&BUILDLIB`, `&FOLDER`, `&NAME`, `&EXT`.
    pub command: String,
    #[serde(default)]
    pub file_system: FileSystem,
    #[serde(default)]
    pub command_environment: CommandEnvironment,
    /// Lowercase extensions this action applies to. Empty or missing means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

impl Action {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            file_system: FileSystem::Qsys,
            command_environment: CommandEnvironment::Qsys,
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = Some(extensions.iter().map(|e| e.to_lowercase()).collect());
        self
    }

    /// True when the action has no extension filter.
    pub fn is_wildcard(&self) -> bool {
        self.extensions.as_ref().is_none_or(|exts| exts.is_empty())
    }
}

/// Where uploaded sources live on the remote host.
///
/// Unknown values are captured rather than rejected at load time, so a
/// configuration with one unsupported action still serves the others.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FileSystem {
    /// Source physical file members in the library file system.
    #[default]
    Qsys,
    Unsupported(String),
}

impl From<String> for FileSystem {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("qsys") {
            Self::Qsys
        } else {
            Self::Unsupported(value)
        }
    }
}

impl From<FileSystem> for String {
    fn from(value: FileSystem) -> Self {
        match value {
            FileSystem::Qsys => "qsys".to_string(),
            FileSystem::Unsupported(raw) => raw,
        }
    }
}

impl fmt::Display for FileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qsys => write!(f, "qsys"),
            Self::Unsupported(raw) => write!(f, "{}", raw),
        }
    }
}

/// Where the built command runs on the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CommandEnvironment {
    /// CL command run through the `system` utility inside a QSH session.
    #[default]
    Qsys,
    Unsupported(String),
}

impl From<String> for CommandEnvironment {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("qsys") {
            Self::Qsys
        } else {
            Self::Unsupported(value)
        }
    }
}

impl From<CommandEnvironment> for String {
    fn from(value: CommandEnvironment) -> Self {
        match value {
            CommandEnvironment::Qsys => "qsys".to_string(),
            CommandEnvironment::Unsupported(raw) => raw,
        }
    }
}

impl fmt::Display for CommandEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qsys => write!(f, "qsys"),
            Self::Unsupported(raw) => write!(f, "{}", raw),
        }
    }
}

/// Library settings of the remote job the command runs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEnvironment {
    /// Configured search order. May contain `&BUILDLIB` and `&CURLIB`.
    #[serde(default = "default_library_list")]
    pub library_list: Vec<String>,
    /// Current library of the job.
    #[serde(default = "default_current_library")]
    pub current_library: String,
    /// Libraries the user profile adds by default; removed before building.
    #[serde(default)]
    pub default_user_libraries: Vec<String>,
    /// Keep the remote job log for compile commands.
    #[serde(default)]
    pub log_compile_output: bool,
}

impl Default for RemoteEnvironment {
    fn default() -> Self {
        Self {
            library_list: default_library_list(),
            current_library: default_current_library(),
            default_user_libraries: Vec::new(),
            log_compile_output: false,
        }
    }
}

fn default_library_list() -> Vec<String> {
    vec!["QGPL".to_string(), "QTEMP".to_string(), "&BUILDLIB".to_string()]
}

fn default_current_library() -> String {
    "QGPL".to_string()
}

/// Captured result of one remote session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// `None` means the remote primitive reported no explicit status.
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl ExecutionResult {
    pub fn success() -> Self {
        Self {
            exit_code: Some(0),
            ..Default::default()
        }
    }

    pub fn with_exit_code(exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            ..Default::default()
        }
    }
}
