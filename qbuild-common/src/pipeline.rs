//! One action run, from a saved file to a reported outcome.
//!
//! The pipeline never panics and never returns an error: every failure ends
//! in a [`RunOutcome`] the caller can show. Validation failures abort before
//! anything touches the remote host.

use crate::actions;
use crate::command;
use crate::config::{self, ProjectMode, Severity};
use crate::discovery::{self, DEFAULT_WORKSPACE_PATTERN};
use crate::errors::BuildError;
use crate::execute;
use crate::remote::RemoteSession;
use crate::report::Report;
use crate::target::{self, TargetDescriptor};
use crate::types::{Action, ProjectConfig, RemoteEnvironment};
use crate::upload;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{Instrument, debug, info, info_span, warn};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ConfigLoading,
    TargetValidated,
    ActionChosen,
    Uploading,
    CommandComposed,
    Executing,
    Succeeded,
    Failed,
    Aborted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::ConfigLoading => "config_loading",
            Self::TargetValidated => "target_validated",
            Self::ActionChosen => "action_chosen",
            Self::Uploading => "uploading",
            Self::CommandComposed => "command_composed",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// Terminal result of a run.
#[derive(Debug)]
pub enum RunOutcome {
    Succeeded(Report),
    /// Something went wrong on the remote side. `report` is present when the
    /// command ran and returned a failing exit code.
    Failed {
        error: BuildError,
        report: Option<Report>,
    },
    /// Stopped before any remote side effect. `from` is the state the run
    /// was in when it stopped.
    Aborted { from: RunState, error: BuildError },
}

impl RunOutcome {
    pub fn state(&self) -> RunState {
        match self {
            Self::Succeeded(_) => RunState::Succeeded,
            Self::Failed { .. } => RunState::Failed,
            Self::Aborted { .. } => RunState::Aborted,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    pub fn error(&self) -> Option<&BuildError> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed { error, .. } | Self::Aborted { error, .. } => Some(error),
        }
    }

    pub fn report(&self) -> Option<&Report> {
        match self {
            Self::Succeeded(report) => Some(report),
            Self::Failed { report, .. } => report.as_ref(),
            Self::Aborted { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// The person at the keyboard.
pub trait Interaction: Send + Sync {
    /// Choose one of `names`, or `None` to cancel.
    fn pick_action(&self, names: &[String]) -> Option<String>;
    fn confirm(&self, prompt: &str) -> bool;
    fn notify(&self, level: NoticeLevel, message: &str);
}

/// Reload compiler diagnostics after a successful event-file build.
pub trait DiagnosticsRefresh: Send + Sync {
    fn refresh(&self, target: &TargetDescriptor, build_library: &str);
}

/// A request to run one action against one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub path: PathBuf,
    /// Run this action instead of asking.
    pub action: Option<String>,
    /// Glob for workspace enumeration, relative to the workspace root.
    pub workspace_pattern: String,
}

impl RunRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            action: None,
            workspace_pattern: DEFAULT_WORKSPACE_PATTERN.to_string(),
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_workspace_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.workspace_pattern = pattern.into();
        self
    }
}

/// Why a run stopped early.
struct Halt {
    state: RunState,
    error: BuildError,
    report: Option<Report>,
}

impl Halt {
    fn at(state: RunState) -> impl FnOnce(BuildError) -> Halt {
        move |error| Halt {
            state,
            error,
            report: None,
        }
    }
}

pub struct Pipeline<'a, S, I, D> {
    session: &'a S,
    interaction: &'a I,
    diagnostics: &'a D,
    mode: &'a ProjectMode,
    environment: &'a RemoteEnvironment,
}

impl<'a, S, I, D> Pipeline<'a, S, I, D>
where
    S: RemoteSession,
    I: Interaction,
    D: DiagnosticsRefresh,
{
    pub fn new(
        session: &'a S,
        interaction: &'a I,
        diagnostics: &'a D,
        mode: &'a ProjectMode,
        environment: &'a RemoteEnvironment,
    ) -> Self {
        Self {
            session,
            interaction,
            diagnostics,
            mode,
            environment,
        }
    }

    /// Drive one run to its outcome.
    pub async fn run(&self, request: &RunRequest) -> RunOutcome {
        let span = info_span!("run", file = %request.path.display());
        let result = self.run_stages(request).instrument(span).await;

        match result {
            Ok(report) => {
                info!(state = %RunState::Succeeded, "{}", report.message);
                self.interaction.notify(NoticeLevel::Info, &report.message);
                RunOutcome::Succeeded(report)
            }
            Err(halt) if halt.error.is_validation() => {
                warn!(state = %RunState::Aborted, from = %halt.state, error = %halt.error, "run aborted");
                RunOutcome::Aborted {
                    from: halt.state,
                    error: halt.error,
                }
            }
            Err(halt) => {
                warn!(state = %RunState::Failed, from = %halt.state, error = %halt.error, "run failed");
                let message = halt
                    .report
                    .as_ref()
                    .map(|r| r.message.clone())
                    .unwrap_or_else(|| halt.error.to_string());
                self.interaction.notify(NoticeLevel::Error, &message);
                RunOutcome::Failed {
                    error: halt.error,
                    report: halt.report,
                }
            }
        }
    }

    async fn run_stages(&self, request: &RunRequest) -> Result<Report, Halt> {
        enter(RunState::Idle);

        // Identifiers are checked before the configuration is even read.
        enter(RunState::ConfigLoading);
        let target = target::describe(&request.path).map_err(|error| {
            self.interaction.notify(NoticeLevel::Error, &error.to_string());
            Halt::at(RunState::ConfigLoading)(error)
        })?;
        let config = self.load_config().map_err(Halt::at(RunState::ConfigLoading))?;

        enter(RunState::TargetValidated);
        let action = self
            .choose_action(&config, &target, request.action.as_deref())
            .and_then(|action| actions::ensure_supported(action).map(|()| action))
            .map_err(|error| {
                self.interaction.notify(NoticeLevel::Warning, &error.to_string());
                Halt::at(RunState::TargetValidated)(error)
            })?;
        enter(RunState::ActionChosen);
        info!(action = %action.name, library = %config.build_library, "action chosen");

        let files = self
            .collect_upload_set(&target, &request.workspace_pattern)
            .await
            .map_err(Halt::at(RunState::ActionChosen))?;

        enter(RunState::Uploading);
        upload::upload(self.session, action, &config.build_library, &files)
            .await
            .map_err(Halt::at(RunState::Uploading))?;

        let built = command::build(action, &target, &config.build_library, self.environment);
        enter(RunState::CommandComposed);

        enter(RunState::Executing);
        let result = execute::execute(self.session, action, self.environment, &built)
            .await
            .map_err(Halt::at(RunState::Executing))?;

        let library = config.build_library.to_uppercase();
        let report = Report::new(&action.name, &built.command, &library, &target.name, &result);
        if let Some(error) = crate::report::failure(&action.name, &library, &target.name, &result) {
            return Err(Halt {
                state: RunState::Executing,
                error,
                report: Some(report),
            });
        }

        if report.refresh_diagnostics {
            debug!(object = %target.qualified_object(&library), "refreshing diagnostics");
            self.diagnostics.refresh(&target, &library);
        }
        Ok(report)
    }

    fn load_config(&self) -> Result<ProjectConfig, BuildError> {
        let config = match config::resolve(self.mode) {
            Ok(config) => config,
            Err(error @ BuildError::ConfigMissing { .. }) => {
                self.offer_default_config();
                return Err(error);
            }
            Err(error) => {
                self.interaction.notify(NoticeLevel::Error, &error.to_string());
                return Err(error);
            }
        };

        if !config::validate(&config) {
            let problems: Vec<String> = config::validate_project(&config)
                .into_iter()
                .filter(|w| w.severity == Severity::Error)
                .map(|w| w.to_string())
                .collect();
            let error = BuildError::ConfigInvalid(problems.join("; "));
            self.interaction.notify(NoticeLevel::Warning, &error.to_string());
            return Err(error);
        }
        Ok(config)
    }

    fn offer_default_config(&self) {
        let root = self.mode.root();
        self.interaction.notify(
            NoticeLevel::Warning,
            &format!("No project configuration found in {}.", root.display()),
        );
        if !self.interaction.confirm("Create the default project configuration?") {
            return;
        }
        match config::create_default(root) {
            Ok(created) => {
                let mut message = format!("Created {}.", created.config.display());
                if let Some(overlay) = created.overlay {
                    message.push_str(&format!(" Set your build library in {}.", overlay.display()));
                }
                self.interaction.notify(NoticeLevel::Info, &message);
            }
            Err(e) => self.interaction.notify(
                NoticeLevel::Error,
                &format!("Failed to create the default configuration: {e}"),
            ),
        }
    }

    fn choose_action<'c>(
        &self,
        config: &'c ProjectConfig,
        target: &TargetDescriptor,
        requested: Option<&str>,
    ) -> Result<&'c Action, BuildError> {
        if let Some(name) = requested {
            return actions::resolve_by_name(&config.actions, name);
        }

        let candidates = actions::applicable(&config.actions, &target.extension);
        if candidates.is_empty() {
            return Err(BuildError::NoApplicableActions {
                extension: target.extension.clone(),
            });
        }

        let names: Vec<String> = candidates.iter().map(|a| a.name.clone()).collect();
        let chosen = self
            .interaction
            .pick_action(&names)
            .ok_or(BuildError::NoActionChosen)?;
        actions::resolve_by_name(&config.actions, &chosen)
    }

    async fn collect_upload_set(
        &self,
        target: &TargetDescriptor,
        pattern: &str,
    ) -> Result<Vec<PathBuf>, BuildError> {
        let content = read_target(&target.source_path).await?;
        let workspace = discovery::enumerate_workspace(self.mode.root(), pattern)
            .map_err(|e| BuildError::ConfigInvalid(format!("workspace pattern '{pattern}': {e}")))?;
        let set = discovery::discover(&target.source_path, &content, &workspace);
        info!(
            dependencies = set.dependencies().len(),
            "discovered {} file(s) to upload",
            set.len()
        );
        Ok(set.files().to_vec())
    }
}

fn enter(state: RunState) {
    debug!(state = %state, "run state");
}

async fn read_target(path: &Path) -> Result<String, BuildError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| BuildError::TargetUnreadable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
