//! OpenSSH transport for the remote session.
//!
//! Every operation is one `ssh` subprocess. Single CL commands go through the
//! PASE `system` utility; sessions run as one QSH script on stdin so the
//! library list set up by `liblist` is still in effect for the final command.

use qbuild_common::config::ConnectionConfig;
use qbuild_common::util::escape_double_quoted;
use qbuild_common::{ExecutionResult, MemberRef, RemoteError, RemoteSession, SessionOptions};
use std::borrow::Cow;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// QSH interpreter on the remote host.
const QSH: &str = "/QOpenSys/usr/bin/qsh";
/// CCSID of the temporary stream file written during upload (UTF-8).
const UPLOAD_CCSID: u32 = 1208;
/// Exit status OpenSSH uses for its own failures.
const SSH_FAILURE_STATUS: i32 = 255;

#[derive(Debug, thiserror::Error)]
pub enum SshConfigError {
    #[error("no remote host configured (set connection.host or QBUILD_HOST)")]
    MissingHost,
}

#[derive(Debug, Clone)]
pub struct SshSession {
    connection: ConnectionConfig,
}

impl SshSession {
    pub fn new(connection: ConnectionConfig) -> Result<Self, SshConfigError> {
        if connection.host.trim().is_empty() {
            return Err(SshConfigError::MissingHost);
        }
        Ok(Self { connection })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new("ssh");
        cmd.arg("-o").arg("BatchMode=yes");
        cmd.arg("-o").arg("ConnectTimeout=10");
        cmd.arg("-o").arg("StrictHostKeyChecking=accept-new");
        cmd.arg("-p").arg(self.connection.port.to_string());
        if let Some(identity) = &self.connection.identity_file {
            cmd.arg("-i").arg(identity);
        }
        cmd.arg(self.connection.destination());
        cmd
    }

    /// Run `remote` on the host, feeding `input` to its stdin.
    async fn exec(&self, remote: &str, input: Option<&[u8]>) -> Result<ExecutionResult, RemoteError> {
        let mut cmd = self.command();
        cmd.arg(remote);
        cmd.stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() });
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd
            .spawn()
            .map_err(|e| RemoteError::Transport(format!("failed to start ssh: {e}")))?;

        let stdin = child.stdin.take();
        let write = async move {
            if let (Some(mut pipe), Some(bytes)) = (stdin, input) {
                pipe.write_all(bytes).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let (_, output) = tokio::try_join!(write, child.wait_with_output())?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        match output.status.code() {
            Some(SSH_FAILURE_STATUS) => Err(RemoteError::Transport(format!(
                "ssh to {} failed: {}",
                self.connection.host,
                stderr.trim()
            ))),
            // Killed by a signal: the command's real status is unknown.
            None => Err(RemoteError::Transport(format!(
                "ssh to {} was terminated by a signal",
                self.connection.host
            ))),
            Some(code) => Ok(ExecutionResult {
                exit_code: Some(code),
                stdout,
                stderr,
            }),
        }
    }
}

/// The QSH script for a session.
///
/// In quiet mode the setup lines are silenced so only the last command's
/// output comes back; its status is the session's exit status.
pub fn session_script(commands: &[String], options: SessionOptions) -> String {
    let last = commands.len().saturating_sub(1);
    let mut script = String::new();
    for (i, line) in commands.iter().enumerate() {
        script.push_str(line);
        if options.quiet && i < last {
            script.push_str(" > /dev/null 2>&1");
        }
        script.push('\n');
    }
    script
}

/// Remote shell line that copies stdin into `member` through `temp_file`.
pub fn push_script(member: &MemberRef, temp_file: &str) -> String {
    let quoted = shell_escape::escape(Cow::Borrowed(temp_file));
    let copy = format!(
        "CPYFRMSTMF FROMSTMF('{}') TOMBR('{}') MBROPT(*REPLACE) STMFCCSID({})",
        temp_file,
        member.ifs_path(),
        UPLOAD_CCSID
    );
    format!(
        "cat > {tmp} && system \"{copy}\"; rc=$?; rm -f {tmp}; exit $rc",
        tmp = quoted,
        copy = escape_double_quoted(&copy)
    )
}

impl RemoteSession for SshSession {
    async fn run_command(&self, label: &str, command: &str) -> Result<ExecutionResult, RemoteError> {
        debug!(label, command = %qbuild_common::mask_sensitive_command(command), "ssh command");
        let remote = format!("system {}", shell_escape::escape(Cow::Borrowed(command)));
        self.exec(&remote, None).await
    }

    async fn run_session(
        &self,
        commands: &[String],
        options: SessionOptions,
    ) -> Result<ExecutionResult, RemoteError> {
        let script = session_script(commands, options);
        debug!(lines = commands.len(), quiet = options.quiet, "ssh qsh session");
        self.exec(QSH, Some(script.as_bytes())).await
    }

    async fn push_member(&self, member: &MemberRef, content: &[u8]) -> Result<(), RemoteError> {
        let temp_file = format!(
            "{}/qbuild-{}.tmp",
            self.connection.temp_dir.trim_end_matches('/'),
            uuid::Uuid::new_v4()
        );
        let remote = push_script(member, &temp_file);
        let result = self.exec(&remote, Some(content)).await?;
        if result.exit_code != Some(0) {
            warn!(member = %member, exit_code = ?result.exit_code, "member upload failed");
            return Err(RemoteError::CommandFailed {
                command: format!("CPYFRMSTMF TOMBR('{}')", member.ifs_path()),
                exit_code: result.exit_code,
                output: format!("{}{}", result.stderr, result.stdout).trim().to_string(),
            });
        }
        debug!(member = %member, bytes = content.len(), "member uploaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(host: &str) -> ConnectionConfig {
        ConnectionConfig {
            host: host.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_host_is_rejected() {
        assert!(matches!(
            SshSession::new(connection("  ")),
            Err(SshConfigError::MissingHost)
        ));
        assert!(SshSession::new(connection("ibmi")).is_ok());
    }

    #[test]
    fn test_ssh_arguments() {
        let mut conn = connection("ibmi.example.com");
        conn.user = "DEV".to_string();
        conn.port = 2222;
        conn.identity_file = Some("/home/dev/.ssh/id_ed25519".into());
        let session = SshSession::new(conn).unwrap();

        let cmd = session.command();
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert!(args.windows(2).any(|w| w == ["-p", "2222"]));
        assert!(args.windows(2).any(|w| w == ["-i", "/home/dev/.ssh/id_ed25519"]));
        assert_eq!(args.last().map(String::as_str), Some("DEV@ibmi.example.com"));
    }

    #[test]
    fn test_quiet_session_silences_setup_only() {
        let commands = vec![
            "liblist -c QGPL".to_string(),
            "liblist -a DEV".to_string(),
            "system -s \"CRTBNDCL PGM(DEV/X)\"".to_string(),
        ];
        assert_eq!(
            session_script(&commands, SessionOptions { quiet: true }),
            "liblist -c QGPL > /dev/null 2>&1\nliblist -a DEV > /dev/null 2>&1\nsystem -s \"CRTBNDCL PGM(DEV/X)\"\n"
        );
        assert_eq!(
            session_script(&commands, SessionOptions { quiet: false }).lines().count(),
            3
        );
    }

    #[test]
    fn test_push_script() {
        let member = MemberRef::new("DEV", "QRPGLESRC", "CUSTOMER", "RPGLE");
        let script = push_script(&member, "/tmp/qbuild-1.tmp");
        assert_eq!(
            script,
            "cat > /tmp/qbuild-1.tmp && system \"CPYFRMSTMF FROMSTMF('/tmp/qbuild-1.tmp') \
             TOMBR('/QSYS.LIB/DEV.LIB/QRPGLESRC.FILE/CUSTOMER.MBR') MBROPT(*REPLACE) \
             STMFCCSID(1208)\"; rc=$?; rm -f /tmp/qbuild-1.tmp; exit $rc"
        );
    }
}
