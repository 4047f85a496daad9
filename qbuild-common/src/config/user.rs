//! User-level configuration: connection and remote library settings.
//!
//! Lives at `~/.config/qbuild/config.toml`; every value can be overridden by
//! a `QBUILD_*` environment variable.

use super::env::{EnvError, EnvParser, expand_home};
use super::source::{ConfigValueSource, Sourced};
use crate::types::RemoteEnvironment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub environment: RemoteEnvironment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// SSH connection to the remote host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub user: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path to SSH private key; the SSH agent/config is used when absent.
    #[serde(default)]
    pub identity_file: Option<PathBuf>,
    /// Remote directory for temporary stream files during upload.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            user: String::new(),
            port: default_port(),
            identity_file: None,
            temp_dir: default_temp_dir(),
        }
    }
}

impl ConnectionConfig {
    /// `user@host`, or just `host` when no user is configured.
    pub fn destination(&self) -> String {
        if self.user.is_empty() {
            self.host.clone()
        } else {
            format!("{}@{}", self.user, self.host)
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    22
}

fn default_temp_dir() -> String {
    "/tmp".to_string()
}

/// Default location of the user configuration file.
pub fn default_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("qbuild").join("config.toml"))
}

/// A loaded user configuration with the origin of every value.
#[derive(Debug)]
pub struct LoadedUserConfig {
    pub config: UserConfig,
    /// `(key, source)` for each overridable setting, in display order.
    pub sources: Vec<(&'static str, ConfigValueSource)>,
    /// Environment overrides that were present but unusable.
    pub env_errors: Vec<EnvError>,
}

/// Load the user configuration from `path` (or the default location) and
/// apply environment overrides. A missing file yields defaults.
pub fn load_user_config(path: Option<&Path>) -> Result<LoadedUserConfig, UserConfigError> {
    let path = path.map(Path::to_path_buf).or_else(default_user_config_path);

    let (config, table, file) = match &path {
        Some(p) if p.is_file() => {
            let content = std::fs::read_to_string(p).map_err(|source| UserConfigError::Read {
                path: p.clone(),
                source,
            })?;
            let config: UserConfig =
                toml::from_str(&content).map_err(|source| UserConfigError::Parse {
                    path: p.clone(),
                    source,
                })?;
            let table: toml::Table =
                toml::from_str(&content).map_err(|source| UserConfigError::Parse {
                    path: p.clone(),
                    source,
                })?;
            (config, table, Some(p.clone()))
        }
        _ => (UserConfig::default(), toml::Table::new(), None),
    };

    Ok(apply_env_overrides(config, &table, file.as_deref()))
}

fn apply_env_overrides(
    config: UserConfig,
    table: &toml::Table,
    file: Option<&Path>,
) -> LoadedUserConfig {
    let origin = |section: &str, key: &str| -> Option<PathBuf> {
        let present = table
            .get(section)
            .and_then(|s| s.get(key))
            .is_some();
        if present { file.map(Path::to_path_buf) } else { None }
    };
    fn sourced<T>(value: T, file: Option<PathBuf>) -> Sourced<T> {
        match file {
            Some(path) => Sourced::from_file(value, path),
            None => Sourced::default_value(value),
        }
    }

    let UserConfig {
        general,
        connection,
        environment,
    } = config;
    let mut parser = EnvParser::new();

    let log_level = parser.get_log_level(
        "LOG_LEVEL",
        sourced(general.log_level, origin("general", "log_level")),
    );
    let host = parser.get_string("HOST", sourced(connection.host, origin("connection", "host")));
    let user = parser.get_string("USER", sourced(connection.user, origin("connection", "user")));
    let port = parser.get_port("PORT", sourced(connection.port, origin("connection", "port")));
    let identity_file = parser.get_optional_path(
        "IDENTITY_FILE",
        sourced(
            connection
                .identity_file
                .map(|p| expand_home(&p.to_string_lossy())),
            origin("connection", "identity_file"),
        ),
    );
    let temp_dir = parser.get_string(
        "TEMP_DIR",
        sourced(connection.temp_dir, origin("connection", "temp_dir")),
    );
    let library_list = parser.get_library_list(
        "LIBRARY_LIST",
        sourced(environment.library_list, origin("environment", "library_list")),
    );
    let current_library = parser.get_string(
        "CURRENT_LIBRARY",
        sourced(
            environment.current_library,
            origin("environment", "current_library"),
        ),
    );
    let default_user_libraries = parser.get_library_list(
        "DEFAULT_USER_LIBRARIES",
        sourced(
            environment.default_user_libraries,
            origin("environment", "default_user_libraries"),
        ),
    );
    let log_compile_output = parser.get_bool(
        "LOG_COMPILE_OUTPUT",
        sourced(
            environment.log_compile_output,
            origin("environment", "log_compile_output"),
        ),
    );

    let sources = vec![
        ("general.log_level", log_level.source.clone()),
        ("connection.host", host.source.clone()),
        ("connection.user", user.source.clone()),
        ("connection.port", port.source.clone()),
        ("connection.identity_file", identity_file.source.clone()),
        ("connection.temp_dir", temp_dir.source.clone()),
        ("environment.library_list", library_list.source.clone()),
        ("environment.current_library", current_library.source.clone()),
        (
            "environment.default_user_libraries",
            default_user_libraries.source.clone(),
        ),
        (
            "environment.log_compile_output",
            log_compile_output.source.clone(),
        ),
    ];

    let config = UserConfig {
        general: GeneralConfig {
            log_level: log_level.into_inner(),
        },
        connection: ConnectionConfig {
            host: host.into_inner(),
            user: user.into_inner(),
            port: port.into_inner(),
            identity_file: identity_file.into_inner(),
            temp_dir: temp_dir.into_inner(),
        },
        environment: RemoteEnvironment {
            library_list: library_list.into_inner(),
            current_library: current_library.into_inner(),
            default_user_libraries: default_user_libraries.into_inner(),
            log_compile_output: log_compile_output.into_inner(),
        },
    };

    LoadedUserConfig {
        config,
        sources,
        env_errors: parser.take_errors(),
    }
}
