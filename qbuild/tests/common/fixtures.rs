use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// An empty workspace plus an isolated user configuration path.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub user_config: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        crate::test_log!("FIXTURE: Creating test workspace");

        let dir = TempDir::new().expect("Failed to create temp dir");
        let user_config = dir.path().join("user-config.toml");
        Self { dir, user_config }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create source dir");
        }
        fs::write(&path, content).expect("Failed to write source file");
        path
    }

    /// `qbuild` with the workspace and user config pinned, env overrides cleared.
    pub fn qbuild(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_qbuild"));
        cmd.arg("--workspace")
            .arg(self.root())
            .arg("--config")
            .arg(&self.user_config)
            .env_remove("QBUILD_WORKSPACE")
            .env_remove("QBUILD_HOST")
            .env("QBUILD_LOG_LEVEL", "warn");
        cmd
    }
}
