//! Synchronise local sources into the remote library.
//!
//! Upload runs in two barriers: every member is created (or confirmed) before
//! any content is pushed. Within a phase all files go concurrently and the
//! first failure fails the phase.

use crate::errors::BuildError;
use crate::remote::{MemberRef, RemoteSession};
use crate::target;
use crate::types::{Action, FileSystem};
use futures::future::try_join_all;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One local file and the member it lands in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMember {
    pub path: PathBuf,
    pub member: MemberRef,
}

/// Map each file to its member in `build_library`.
///
/// Identifiers are derived without the length checks applied to the target.
pub fn plan(build_library: &str, files: &[PathBuf]) -> Vec<PlannedMember> {
    files
        .iter()
        .map(|path| {
            let descriptor = target::derive(path);
            PlannedMember {
                path: path.clone(),
                member: MemberRef::new(
                    build_library,
                    descriptor.folder,
                    descriptor.name,
                    descriptor.extension,
                ),
            }
        })
        .collect()
}

/// Upload `files` for `action` into `build_library`.
pub async fn upload<S: RemoteSession>(
    session: &S,
    action: &Action,
    build_library: &str,
    files: &[PathBuf],
) -> Result<(), BuildError> {
    match &action.file_system {
        FileSystem::Qsys => {}
        FileSystem::Unsupported(value) => {
            return Err(BuildError::UnsupportedEnvironment {
                action: action.name.clone(),
                kind: "file system",
                value: value.clone(),
            });
        }
    }

    let planned = plan(build_library, files);
    info!(library = %build_library, files = planned.len(), "uploading sources");

    create_members(session, &planned).await?;
    push_contents(session, &planned).await?;

    info!(library = %build_library, files = planned.len(), "upload complete");
    Ok(())
}

/// Phase one: make sure every member exists.
pub async fn create_members<S: RemoteSession>(
    session: &S,
    planned: &[PlannedMember],
) -> Result<(), BuildError> {
    try_join_all(planned.iter().map(|p| async move {
        debug!(member = %p.member, "ensuring member");
        session
            .ensure_member(&p.member)
            .await
            .map_err(|e| BuildError::UploadFailure(format!("{}: {}", p.member, e)))
    }))
    .await?;
    Ok(())
}

/// Phase two: push each file's bytes into its member.
pub async fn push_contents<S: RemoteSession>(
    session: &S,
    planned: &[PlannedMember],
) -> Result<(), BuildError> {
    try_join_all(planned.iter().map(|p| async move {
        let content = read_source(&p.path).await?;
        debug!(member = %p.member, bytes = content.len(), "pushing member content");
        session
            .push_member(&p.member, &content)
            .await
            .map_err(|e| BuildError::UploadFailure(format!("{}: {}", p.member, e)))
    }))
    .await?;
    Ok(())
}

async fn read_source(path: &Path) -> Result<Vec<u8>, BuildError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| BuildError::UploadFailure(format!("failed to read {}: {}", path.display(), e)))
}
