//! `qbuild run`: drive one action for one file.

use super::helpers::{absolute, exit_code, indent_lines};
use crate::diagnostics::EventFileNotice;
use crate::interaction::{BatchInteraction, TerminalInteraction, is_interactive};
use crate::ssh::SshSession;
use anyhow::Result;
use qbuild_common::config::LoadedUserConfig;
use qbuild_common::{
    Interaction, Pipeline, ProjectMode, RemoteEnvironment, RunOutcome, RunRequest,
};
use std::path::Path;
use tracing::debug;

pub struct RunOptions {
    pub file: String,
    pub action: Option<String>,
    pub assume_yes: bool,
    pub pattern: String,
}

pub async fn run(workspace: &Path, options: RunOptions, user: LoadedUserConfig) -> Result<i32> {
    let path = absolute(&options.file)?;
    let mode = ProjectMode::detect(workspace);
    debug!(workspace = %workspace.display(), project = mode.is_project(), "workspace mode");

    let session = SshSession::new(user.config.connection.clone())?;
    let environment = user.config.environment;

    let mut request = RunRequest::new(path).with_workspace_pattern(options.pattern);
    if let Some(action) = options.action {
        request = request.with_action(action);
    }

    let outcome = if is_interactive(options.assume_yes) {
        drive(&session, &TerminalInteraction::new(), &mode, &environment, &request).await
    } else {
        let batch = BatchInteraction::new(options.assume_yes);
        drive(&session, &batch, &mode, &environment, &request).await
    };

    print_outcome(&outcome);
    Ok(exit_code(&outcome))
}

async fn drive<I: Interaction>(
    session: &SshSession,
    interaction: &I,
    mode: &ProjectMode,
    environment: &RemoteEnvironment,
    request: &RunRequest,
) -> RunOutcome {
    Pipeline::new(session, interaction, &EventFileNotice, mode, environment)
        .run(request)
        .await
}

fn print_outcome(outcome: &RunOutcome) {
    if let Some(report) = outcome.report()
        && !report.output.is_empty()
    {
        eprintln!("{}", indent_lines(report.output.trim_end(), "  "));
    }
    if let Some(error) = outcome.error() {
        eprintln!("{}", error.code().entry().format_brief());
        for step in error.code().remediation() {
            eprintln!("  - {}", step);
        }
    }
}
