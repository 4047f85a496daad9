//! Recording remote session for tests.
//!
//! Every call is recorded in arrival order. Session results are scripted and
//! consumed FIFO; when the script runs out a session succeeds with exit code 0.

use crate::remote::{MemberRef, RemoteError, RemoteSession, SessionOptions};
use crate::types::ExecutionResult;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One call received by [`MockSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Command { label: String, command: String },
    Session { commands: Vec<String>, options: SessionOptions },
    Push { member: String, content: Vec<u8> },
}

#[derive(Debug, Clone, Default)]
pub struct MockSession {
    calls: Arc<Mutex<Vec<MockCall>>>,
    session_results: Arc<Mutex<VecDeque<Result<ExecutionResult, RemoteError>>>>,
    command_results: Arc<Mutex<VecDeque<ExecutionResult>>>,
    command_failure: Option<String>,
    push_failure: Option<String>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every single command fail with `stderr`.
    pub fn with_command_failure(mut self, stderr: impl Into<String>) -> Self {
        self.command_failure = Some(stderr.into());
        self
    }

    /// Make every content push fail with a transport error.
    pub fn with_push_failure(mut self, message: impl Into<String>) -> Self {
        self.push_failure = Some(message.into());
        self
    }

    /// Append a scripted session result.
    pub fn push_session_result(&self, result: Result<ExecutionResult, RemoteError>) {
        self.session_results
            .lock()
            .expect("session_results mutex poisoned")
            .push_back(result);
    }

    /// Append a scripted single-command result, used before the failure toggle.
    pub fn push_command_result(&self, result: ExecutionResult) {
        self.command_results
            .lock()
            .expect("command_results mutex poisoned")
            .push_back(result);
    }

    /// Snapshot of every call so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    /// Single commands, in arrival order.
    pub fn commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Command { command, .. } => Some(command),
                _ => None,
            })
            .collect()
    }

    /// Command lists of every session run.
    pub fn sessions(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Session { commands, .. } => Some(commands),
                _ => None,
            })
            .collect()
    }

    /// Members that received content, as `LIB/FILE(MBR)`.
    pub fn pushed(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::Push { member, .. } => Some(member),
                _ => None,
            })
            .collect()
    }

    pub fn pushed_content(&self, member: &str) -> Option<Vec<u8>> {
        self.calls().into_iter().find_map(|c| match c {
            MockCall::Push { member: m, content } if m == member => Some(content),
            _ => None,
        })
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

impl RemoteSession for MockSession {
    async fn run_command(&self, label: &str, command: &str) -> Result<ExecutionResult, RemoteError> {
        self.record(MockCall::Command {
            label: label.to_string(),
            command: command.to_string(),
        });
        let scripted = self
            .command_results
            .lock()
            .expect("command_results mutex poisoned")
            .pop_front();
        if let Some(result) = scripted {
            return Ok(result);
        }
        Ok(match &self.command_failure {
            Some(stderr) => ExecutionResult {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: stderr.clone(),
            },
            None => ExecutionResult::success(),
        })
    }

    async fn run_session(
        &self,
        commands: &[String],
        options: SessionOptions,
    ) -> Result<ExecutionResult, RemoteError> {
        self.record(MockCall::Session {
            commands: commands.to_vec(),
            options,
        });
        self.session_results
            .lock()
            .expect("session_results mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(ExecutionResult::success()))
    }

    async fn push_member(&self, member: &MemberRef, content: &[u8]) -> Result<(), RemoteError> {
        if let Some(message) = &self.push_failure {
            return Err(RemoteError::Transport(message.clone()));
        }
        self.record(MockCall::Push {
            member: member.to_string(),
            content: content.to_vec(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_results_are_fifo() {
        let session = MockSession::new();
        session.push_session_result(Ok(ExecutionResult::with_exit_code(Some(1))));
        session.push_session_result(Err(RemoteError::Transport("down".to_string())));

        let opts = SessionOptions::default();
        let first = session.run_session(&["a".to_string()], opts).await.unwrap();
        assert_eq!(first.exit_code, Some(1));
        assert!(session.run_session(&[], opts).await.is_err());
        assert_eq!(session.run_session(&[], opts).await.unwrap().exit_code, Some(0));
        assert_eq!(session.sessions().len(), 3);
    }

    #[tokio::test]
    async fn test_existing_member_is_tolerated() {
        let session = MockSession::new();
        session.push_command_result(ExecutionResult {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "CPF5813: File F in library L already exists.".to_string(),
        });
        session.push_command_result(ExecutionResult {
            exit_code: Some(1),
            stdout: "CPF5812: Member M already exists in file F.".to_string(),
            stderr: String::new(),
        });
        session
            .ensure_member(&MemberRef::new("L", "F", "M", "RPGLE"))
            .await
            .unwrap();
        let commands = session.commands();
        assert_eq!(commands.len(), 3);
        assert!(commands[2].starts_with("CHGPFM FILE(L/F) MBR(M) SRCTYPE(RPGLE)"));
    }

    #[tokio::test]
    async fn test_command_failure_toggle_fails_member_creation() {
        let session = MockSession::new().with_command_failure("CPF9810: Library L not found.");
        let err = session
            .ensure_member(&MemberRef::new("L", "F", "M", "RPGLE"))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::CommandFailed { .. }));
        assert_eq!(session.commands().len(), 1);
    }
}
