//! Dependency discovery for the target file.
//!
//! The heuristic is textual: a workspace file is a dependency when its bare
//! name (upper-cased, extension stripped) appears anywhere in the target's
//! upper-cased source. A `/COPY UTIL`, `CALL PGM(UTIL)` or an SQL reference
//! to `UTIL` all qualify, and so does a comment that happens to contain
//! `UTIL`. Over-inclusion only costs an extra upload.

use glob::{MatchOptions, PatternError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default pattern for workspace enumeration.
pub const DEFAULT_WORKSPACE_PATTERN: &str = "**/*";

/// Files to upload for one run, target first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSet {
    files: Vec<PathBuf>,
}

impl UploadSet {
    pub fn target(&self) -> &Path {
        &self.files[0]
    }

    /// Every file, target first.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Discovered dependencies, without the target.
    pub fn dependencies(&self) -> &[PathBuf] {
        &self.files[1..]
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Never true; the target is always present.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Collect the target and every workspace file its content names.
///
/// Dependencies keep the order of `workspace_files`. The target itself is
/// skipped if it appears in the listing.
pub fn discover(target: &Path, target_content: &str, workspace_files: &[PathBuf]) -> UploadSet {
    let haystack = target_content.to_uppercase();
    let canonical_target = std::fs::canonicalize(target).ok();
    let mut files = vec![target.to_path_buf()];

    for file in workspace_files {
        let Some(stem) = file.file_stem() else {
            continue;
        };
        let base = stem.to_string_lossy().to_uppercase();
        if base.is_empty() || !haystack.contains(&base) {
            continue;
        }
        if is_same_file(file, target, canonical_target.as_deref()) {
            continue;
        }
        debug!(dependency = %file.display(), name = %base, "dependency matched");
        files.push(file.clone());
    }

    UploadSet { files }
}

/// `file` names the target, directly or through a symlink or relative path.
fn is_same_file(file: &Path, target: &Path, canonical_target: Option<&Path>) -> bool {
    if file == target {
        return true;
    }
    match (canonical_target, std::fs::canonicalize(file)) {
        (Some(target), Ok(file)) => file == target,
        _ => false,
    }
}

/// List workspace files matching `pattern` relative to `root`.
///
/// Hidden files and directories (`.git`, `.qbuild`, `.env`) are skipped.
/// The result is sorted so discovery order is stable between runs.
pub fn enumerate_workspace(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, PatternError> {
    // The root is literal text; only `pattern` may contain wildcards.
    let full = Path::new(&glob::Pattern::escape(&root.to_string_lossy())).join(pattern);
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    };

    let mut files: Vec<PathBuf> = glob::glob_with(&full.to_string_lossy(), options)?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    debug!(root = %root.display(), pattern, count = files.len(), "enumerated workspace");
    Ok(files)
}
