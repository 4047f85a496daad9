//! `qbuild init`: write the default project configuration.

use anyhow::{Context, Result};
use console::style;
use qbuild_common::config::create_default;
use std::io::ErrorKind;
use std::path::Path;

pub fn init(workspace: &Path) -> Result<i32> {
    match create_default(workspace) {
        Ok(created) => {
            println!("{} {}", style("Created").green(), created.config.display());
            match created.overlay {
                Some(overlay) => println!(
                    "{} {} (set BUILDLIB to your library; keep it out of source control)",
                    style("Created").green(),
                    overlay.display()
                ),
                None => println!("Kept the existing .env overlay."),
            }
            Ok(0)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            eprintln!("{} {}", style("Skipped:").yellow(), e);
            Ok(0)
        }
        Err(e) => Err(e).context("failed to create the default configuration"),
    }
}
