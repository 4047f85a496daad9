//! Project configuration: locating, resolving, validating and seeding it.

use super::overlay::Overlay;
use crate::errors::BuildError;
use crate::types::{Action, ProjectConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory holding the project configuration, relative to the workspace root.
pub const PROJECT_DIR: &str = ".qbuild";
/// Project configuration file name inside [`PROJECT_DIR`].
pub const PROJECT_FILE: &str = "project.json";
/// Overlay file name at the workspace root.
pub const OVERLAY_FILE: &str = ".env";

/// Library name the default configuration refers to; mapped by the overlay.
pub const DEFAULT_BUILD_LIBRARY_KEY: &str = "BUILDLIB";

const OVERLAY_TEMPLATE: &str = "\
# qbuild local overlay.
# Values here replace matching values in .qbuild/project.json.
# This file holds per-developer settings. Do not commit it to source control.
BUILDLIB=MYLIB
";

pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(PROJECT_DIR).join(PROJECT_FILE)
}

pub fn overlay_path(root: &Path) -> PathBuf {
    root.join(OVERLAY_FILE)
}

/// Whether a workspace carries a project configuration.
///
/// Determined once per invocation and passed to whatever needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectMode {
    Project { root: PathBuf },
    NotProject { root: PathBuf },
}

impl ProjectMode {
    pub fn detect(root: &Path) -> Self {
        let root = root.to_path_buf();
        if project_config_path(&root).is_file() {
            Self::Project { root }
        } else {
            Self::NotProject { root }
        }
    }

    pub fn root(&self) -> &Path {
        match self {
            Self::Project { root } | Self::NotProject { root } => root,
        }
    }

    pub fn is_project(&self) -> bool {
        matches!(self, Self::Project { .. })
    }

    pub fn config_path(&self) -> PathBuf {
        project_config_path(self.root())
    }
}

/// Load the project configuration for `mode` and apply the overlay.
///
/// The returned value is a fresh resolution; nothing on disk changes.
pub fn resolve(mode: &ProjectMode) -> Result<ProjectConfig, BuildError> {
    let path = mode.config_path();
    if !mode.is_project() {
        return Err(BuildError::ConfigMissing { path });
    }

    let content = std::fs::read_to_string(&path).map_err(|e| BuildError::ConfigRead {
        path: path.clone(),
        message: e.to_string(),
    })?;
    let raw: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| BuildError::ConfigRead {
            path: path.clone(),
            message: e.to_string(),
        })?;

    let overlay_file = overlay_path(mode.root());
    let overlay = Overlay::load(&overlay_file).map_err(|e| BuildError::ConfigRead {
        path: overlay_file.clone(),
        message: e.to_string(),
    })?;
    debug!(
        config = %path.display(),
        overlay_keys = overlay.len(),
        "resolving project configuration"
    );

    serde_json::from_value(overlay.apply(&raw)).map_err(|e| BuildError::ConfigRead {
        path,
        message: e.to_string(),
    })
}

/// True when the configuration can drive a run.
pub fn validate(config: &ProjectConfig) -> bool {
    !config.build_library.is_empty() && !config.actions.is_empty()
}

/// Files written by [`create_default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFiles {
    pub config: PathBuf,
    /// `None` when an overlay already existed and was left alone.
    pub overlay: Option<PathBuf>,
}

/// Write the default configuration and, if absent, a starter overlay.
///
/// Fails with `AlreadyExists` rather than replacing a configuration.
pub fn create_default(root: &Path) -> std::io::Result<CreatedFiles> {
    let config_path = project_config_path(root);
    if config_path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", config_path.display()),
        ));
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&default_config())?;
    std::fs::write(&config_path, json + "\n")?;
    info!("Wrote default project configuration to {}", config_path.display());

    let overlay_file = overlay_path(root);
    let overlay = if overlay_file.exists() {
        None
    } else {
        std::fs::write(&overlay_file, OVERLAY_TEMPLATE)?;
        info!("Wrote starter overlay to {}", overlay_file.display());
        Some(overlay_file)
    };

    Ok(CreatedFiles {
        config: config_path,
        overlay,
    })
}

/// The configuration [`create_default`] writes.
pub fn default_config() -> ProjectConfig {
    ProjectConfig {
        build_library: DEFAULT_BUILD_LIBRARY_KEY.to_string(),
        actions: default_actions(),
    }
}

/// Built-in catalog: one compile action per common source type.
pub fn default_actions() -> Vec<Action> {
    vec![
        Action::new(
            "CRTBNDRPG",
            "CRTBNDRPG PGM(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF) DBGVIEW(*SOURCE)",
        )
        .with_extensions(&["rpgle"]),
        Action::new(
            "CRTRPGMOD",
            "CRTRPGMOD MODULE(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF) DBGVIEW(*SOURCE)",
        )
        .with_extensions(&["rpgle"]),
        Action::new(
            "CRTSQLRPGI",
            "CRTSQLRPGI OBJ(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) CLOSQLCSR(*ENDMOD) OPTION(*EVENTF) DBGVIEW(*SOURCE)",
        )
        .with_extensions(&["sqlrpgle"]),
        Action::new(
            "CRTBNDCL",
            "CRTBNDCL PGM(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF) DBGVIEW(*SOURCE)",
        )
        .with_extensions(&["clle"]),
        Action::new(
            "CRTBNDC",
            "CRTBNDC PGM(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF) DBGVIEW(*SOURCE)",
        )
        .with_extensions(&["c"]),
        Action::new(
            "CRTBNDCPP",
            "CRTBNDCPP PGM(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF) DBGVIEW(*SOURCE)",
        )
        .with_extensions(&["cpp"]),
        Action::new(
            "CRTCMD",
            "CRTCMD CMD(&BUILDLIB/&NAME) PGM(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF)",
        )
        .with_extensions(&["cmd"]),
        Action::new(
            "CRTPF",
            "CRTPF FILE(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF)",
        )
        .with_extensions(&["pf"]),
        Action::new(
            "CRTLF",
            "CRTLF FILE(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF)",
        )
        .with_extensions(&["lf"]),
        Action::new(
            "CRTDSPF",
            "CRTDSPF FILE(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF)",
        )
        .with_extensions(&["dspf"]),
        Action::new(
            "CRTPRTF",
            "CRTPRTF FILE(&BUILDLIB/&NAME) SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) OPTION(*EVENTF)",
        )
        .with_extensions(&["prtf"]),
        Action::new(
            "RUNSQLSTM",
            "RUNSQLSTM SRCFILE(&BUILDLIB/&FOLDER) SRCMBR(&NAME) COMMIT(*NONE) NAMING(*SQL)",
        )
        .with_extensions(&["sql"]),
    ]
}
