//! Subcommand implementations.

pub mod actions;
pub mod check;
pub mod config;
pub mod helpers;
pub mod init;
pub mod run;
