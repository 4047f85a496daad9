//! `qbuild check`: report configuration problems before a run finds them.

use anyhow::Result;
use console::style;
use qbuild_common::config::{
    self, LoadedUserConfig, ProjectMode, Severity, UserConfigError, validate_project,
};
use std::path::Path;

pub fn check(workspace: &Path, user: Result<LoadedUserConfig, UserConfigError>) -> Result<i32> {
    let mut errors = 0usize;

    match config::resolve(&ProjectMode::detect(workspace)) {
        Ok(project) => {
            let findings = validate_project(&project);
            if findings.is_empty() {
                println!(
                    "{} project: {} action(s), build library {}",
                    style("ok").green(),
                    project.actions.len(),
                    project.build_library
                );
            }
            for finding in findings {
                if finding.severity == Severity::Error {
                    errors += 1;
                }
                println!("{} project: {}", marker(finding.severity), finding);
            }
        }
        Err(e) => {
            errors += 1;
            println!("{} project: {}", marker(Severity::Error), e);
        }
    }

    match user {
        Ok(loaded) => {
            if loaded.config.connection.host.is_empty() {
                errors += 1;
                println!(
                    "{} connection: no host configured (connection.host or QBUILD_HOST)",
                    marker(Severity::Error)
                );
            } else {
                println!(
                    "{} connection: {} port {}",
                    style("ok").green(),
                    loaded.config.connection.destination(),
                    loaded.config.connection.port
                );
            }
            for error in &loaded.env_errors {
                println!("{} environment: {}", marker(Severity::Warning), error);
            }
        }
        Err(e) => {
            errors += 1;
            println!("{} user config: {}", marker(Severity::Error), e);
        }
    }

    Ok(if errors == 0 { 0 } else { 1 })
}

fn marker(severity: Severity) -> console::StyledObject<&'static str> {
    match severity {
        Severity::Error => style("error").red().bold(),
        Severity::Warning => style("warn").yellow(),
        Severity::Info => style("info").cyan(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbuild_common::config::{UserConfig, create_default};
    use tempfile::TempDir;

    fn user(host: &str) -> LoadedUserConfig {
        let mut config = UserConfig::default();
        config.connection.host = host.to_string();
        LoadedUserConfig {
            config,
            sources: Vec::new(),
            env_errors: Vec::new(),
        }
    }

    #[test]
    fn test_default_project_with_host_passes() {
        let dir = TempDir::new().unwrap();
        create_default(dir.path()).unwrap();
        assert_eq!(check(dir.path(), Ok(user("ibmi"))).unwrap(), 0);
    }

    #[test]
    fn test_missing_project_and_host_fail() {
        let dir = TempDir::new().unwrap();
        assert_eq!(check(dir.path(), Ok(user(""))).unwrap(), 1);
    }
}
