//! `qbuild actions`: show what `run` would offer for a file.

use super::helpers::{EXIT_ABORTED, absolute};
use anyhow::Result;
use console::style;
use qbuild_common::config::{self, LoadedUserConfig};
use qbuild_common::{ProjectMode, actions, command, describe};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ActionPreview {
    name: String,
    command: String,
    library_list: Vec<String>,
}

pub fn list(workspace: &Path, file: &str, json: bool, user: LoadedUserConfig) -> Result<i32> {
    let path = absolute(file)?;
    let target = match describe(&path) {
        Ok(target) => target,
        Err(e) => {
            eprintln!("{}", e.code().entry().format_brief());
            eprintln!("{}", e);
            return Ok(EXIT_ABORTED);
        }
    };
    let project = match config::resolve(&ProjectMode::detect(workspace)) {
        Ok(project) => project,
        Err(e) => {
            eprintln!("{}", e.code().entry().format_full());
            return Ok(EXIT_ABORTED);
        }
    };

    let previews: Vec<ActionPreview> = actions::applicable(&project.actions, &target.extension)
        .into_iter()
        .map(|action| {
            let built =
                command::build(action, &target, &project.build_library, &user.config.environment);
            ActionPreview {
                name: action.name.clone(),
                command: built.command,
                library_list: built.library_list,
            }
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&previews)?);
        return Ok(0);
    }

    if previews.is_empty() {
        println!("No actions apply to '.{}' files.", target.extension);
        return Ok(0);
    }
    for preview in &previews {
        println!("{}", style(&preview.name).bold());
        println!("  {}", preview.command);
        println!("  {} {}", style("libl:").dim(), preview.library_list.join(" "));
    }
    Ok(0)
}
