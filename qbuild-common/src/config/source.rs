//! Tracking where configuration values came from.

use std::fmt;
use std::path::PathBuf;

/// Origin of a configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in default.
    Default,
    /// User configuration file.
    UserFile(PathBuf),
    /// Environment variable.
    Environment,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::UserFile(path) => write!(f, "{}", path.display()),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// Describes the source of a value, with the variable name for env values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValueSource {
    pub source: ConfigSource,
    pub var_name: Option<String>,
}

impl fmt::Display for ConfigValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.var_name {
            Some(var) => write!(f, "{} ({})", self.source, var),
            None => write!(f, "{}", self.source),
        }
    }
}

/// A value paired with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub source: ConfigValueSource,
}

impl<T> Sourced<T> {
    pub fn default_value(value: T) -> Self {
        Self {
            value,
            source: ConfigValueSource {
                source: ConfigSource::Default,
                var_name: None,
            },
        }
    }

    pub fn from_env(value: T, var_name: String) -> Self {
        Self {
            value,
            source: ConfigValueSource {
                source: ConfigSource::Environment,
                var_name: Some(var_name),
            },
        }
    }

    pub fn from_file(value: T, path: PathBuf) -> Self {
        Self {
            value,
            source: ConfigValueSource {
                source: ConfigSource::UserFile(path),
                var_name: None,
            },
        }
    }

    pub fn is_default(&self) -> bool {
        self.source.source == ConfigSource::Default
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}
