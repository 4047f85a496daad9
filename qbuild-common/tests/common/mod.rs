#![allow(dead_code)]

pub mod fixtures;
pub mod logging;

pub use fixtures::{RecordingDiagnostics, ScriptedInteraction, TestWorkspace};
pub use logging::init_test_logging;
