use qbuild_common::{DiagnosticsRefresh, Interaction, NoticeLevel, TargetDescriptor};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// A workspace directory with a `.qbuild/project.json`.
pub struct TestWorkspace {
    pub dir: TempDir,
}

impl TestWorkspace {
    pub fn new(config: &str) -> Self {
        crate::test_log!("FIXTURE: Creating test workspace");

        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join(".qbuild")).expect("Failed to create .qbuild");
        fs::write(dir.path().join(".qbuild/project.json"), config)
            .expect("Failed to write project.json");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative` and return the absolute path.
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create source dir");
        }
        fs::write(&path, content).expect("Failed to write source file");
        path
    }
}

/// Answers prompts from a script and records what it was shown.
#[derive(Default)]
pub struct ScriptedInteraction {
    pub pick: Option<String>,
    pub accept: bool,
    pub offered: Mutex<Vec<Vec<String>>>,
    pub notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl ScriptedInteraction {
    pub fn picking(name: &str) -> Self {
        Self {
            pick: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap().clone()
    }
}

impl Interaction for ScriptedInteraction {
    fn pick_action(&self, names: &[String]) -> Option<String> {
        self.offered.lock().unwrap().push(names.to_vec());
        self.pick.clone()
    }

    fn confirm(&self, _prompt: &str) -> bool {
        self.accept
    }

    fn notify(&self, level: NoticeLevel, message: &str) {
        self.notices.lock().unwrap().push((level, message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingDiagnostics {
    pub refreshed: Mutex<Vec<String>>,
}

impl DiagnosticsRefresh for RecordingDiagnostics {
    fn refresh(&self, target: &TargetDescriptor, build_library: &str) {
        self.refreshed
            .lock()
            .unwrap()
            .push(target.qualified_object(build_library));
    }
}
