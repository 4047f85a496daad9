//! qbuild - build locally, compile remotely
//!
//! Runs a project's build actions for a saved source file against a remote
//! IBM i host: uploads the source and what it references, then compiles it
//! in a prepared library list.

#![forbid(unsafe_code)]

mod commands;
mod diagnostics;
mod interaction;
mod ssh;

use anyhow::Result;
use clap::{Parser, Subcommand};
use qbuild_common::config::load_user_config;
use qbuild_common::discovery::DEFAULT_WORKSPACE_PATTERN;
use qbuild_common::{ErrorCode, LogConfig, LogFormat, init_logging};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "qbuild")]
#[command(author, version, about = "Build locally, compile remotely on IBM i")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, env = "QBUILD_WORKSPACE")]
    workspace: Option<String>,

    /// User configuration file (defaults to ~/.config/qbuild/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log output format: pretty or json (overrides QBUILD_LOG_FORMAT)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a build action for a source file
    Run {
        /// Source file to build
        file: String,

        /// Action to run instead of choosing interactively
        #[arg(short, long)]
        action: Option<String>,

        /// Never prompt; accept confirmations
        #[arg(short, long)]
        yes: bool,

        /// Glob selecting workspace files considered as dependencies
        #[arg(long, default_value = DEFAULT_WORKSPACE_PATTERN)]
        pattern: String,
    },

    /// List the actions that apply to a source file
    Actions {
        /// Source file
        file: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create the default project configuration
    Init,

    /// Validate the project and user configuration
    Check,

    /// Inspect the user configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective settings and where each came from
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let user_config = load_user_config(cli.config.as_deref());
    let default_level = user_config
        .as_ref()
        .map(|loaded| loaded.config.general.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    let mut log_config = LogConfig::from_env(&default_level).with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    if let Some(path) = &cli.log_file {
        log_config = log_config.with_file(path);
    }
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    let logging_guards = init_logging(&log_config)?;

    if let Ok(loaded) = &user_config {
        for error in &loaded.env_errors {
            warn!("[{}] {}", ErrorCode::ConfigEnvError.code_string(), error);
        }
    }

    let workspace = commands::helpers::workspace_root(cli.workspace.as_deref())?;

    let code = match cli.command {
        Commands::Run {
            file,
            action,
            yes,
            pattern,
        } => {
            let options = commands::run::RunOptions {
                file,
                action,
                assume_yes: yes,
                pattern,
            };
            commands::run::run(&workspace, options, user_config?).await?
        }
        Commands::Actions { file, json } => {
            commands::actions::list(&workspace, &file, json, user_config?)?
        }
        Commands::Init => commands::init::init(&workspace)?,
        Commands::Check => commands::check::check(&workspace, user_config)?,
        Commands::Config {
            command: ConfigCommands::Show { json },
        } => commands::config::show(user_config?, json)?,
    };

    if code != 0 {
        drop(logging_guards);
        std::process::exit(code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::try_parse_from(["qbuild", "--log-format", "json", "init"]).unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));

        let cli = Cli::try_parse_from(["qbuild", "check"]).unwrap();
        assert_eq!(cli.log_format, None);

        assert!(Cli::try_parse_from(["qbuild", "--log-format", "xml", "init"]).is_err());
    }
}
