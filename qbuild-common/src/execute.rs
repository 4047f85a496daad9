//! Run a composed command inside a prepared remote job.

use crate::command::BuiltCommand;
use crate::errors::BuildError;
use crate::remote::{RemoteSession, SessionOptions};
use crate::types::{Action, CommandEnvironment, ExecutionResult, RemoteEnvironment};
use crate::util::{escape_double_quoted, mask_sensitive_command};
use tracing::{debug, info, warn};

/// Shell lines that set up the library list and run the command.
///
/// The user's default libraries are removed, the current library set, the
/// built list added, and the command run through `system`. `-s` keeps the
/// job log out of the output unless compile output logging is on.
pub fn session_script(environment: &RemoteEnvironment, built: &BuiltCommand) -> Vec<String> {
    let mut script = Vec::with_capacity(4);

    if !environment.default_user_libraries.is_empty() {
        script.push(format!(
            "liblist -d {}",
            environment.default_user_libraries.join(" ")
        ));
    }
    script.push(format!("liblist -c {}", environment.current_library));
    if !built.library_list.is_empty() {
        script.push(format!("liblist -a {}", built.library_list.join(" ")));
    }

    let flag = if environment.log_compile_output { "" } else { "-s " };
    script.push(format!(
        "system {}\"{}\"",
        flag,
        escape_double_quoted(&built.command)
    ));
    script
}

/// Execute `built` for `action` and return the raw result.
///
/// Transport failures come back as [`BuildError::Execution`]; a non-zero exit
/// code is not an error here.
pub async fn execute<S: RemoteSession>(
    session: &S,
    action: &Action,
    environment: &RemoteEnvironment,
    built: &BuiltCommand,
) -> Result<ExecutionResult, BuildError> {
    if let CommandEnvironment::Unsupported(value) = &action.command_environment {
        return Err(BuildError::UnsupportedEnvironment {
            action: action.name.clone(),
            kind: "command environment",
            value: value.clone(),
        });
    }

    let script = session_script(environment, built);
    for line in &script {
        debug!(line = %mask_sensitive_command(line), "session script");
    }
    info!(
        action = %action.name,
        command = %mask_sensitive_command(&built.command),
        "executing remote command"
    );

    match session.run_session(&script, SessionOptions { quiet: true }).await {
        Ok(result) => {
            debug!(exit_code = ?result.exit_code, "remote command finished");
            Ok(result)
        }
        Err(e) => {
            warn!(action = %action.name, error = %e, "remote command dispatch failed");
            Err(BuildError::Execution(e.to_string()))
        }
    }
}
