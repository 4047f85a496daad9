//! Configuration system for qbuild.
//!
//! Two layers feed a run:
//! - the project configuration (`.qbuild/project.json` plus the `.env`
//!   overlay) with the build library and the actions
//! - the user configuration (`~/.config/qbuild/config.toml` plus `QBUILD_*`
//!   environment overrides) with the connection and library list

pub mod env;
pub mod overlay;
pub mod project;
pub mod source;
pub mod user;
pub mod validate;

pub use env::{EnvError, EnvParser};
pub use overlay::Overlay;
pub use project::{CreatedFiles, ProjectMode, create_default, default_actions, resolve, validate};
pub use source::{ConfigSource, ConfigValueSource, Sourced};
pub use user::{
    ConnectionConfig, GeneralConfig, LoadedUserConfig, UserConfig, UserConfigError,
    default_user_config_path, load_user_config,
};
pub use validate::{ConfigWarning, Severity, validate_project};

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
