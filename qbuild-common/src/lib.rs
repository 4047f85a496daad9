//! qbuild common library.
//!
//! The action pipeline behind `qbuild run`: resolve the project
//! configuration, describe the target, pick an action, upload the target and
//! its dependencies, compose the command and run it on the remote host.

pub mod actions;
pub mod command;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod execute;
pub mod logging;
pub mod mock;
pub mod pipeline;
pub mod remote;
pub mod report;
pub mod target;
pub mod types;
pub mod upload;
pub mod util;

pub use command::{BuiltCommand, build_library_list};
pub use config::{ProjectMode, UserConfig, load_user_config};
pub use discovery::{UploadSet, discover, enumerate_workspace};
pub use errors::{BuildError, ErrorCategory, ErrorCode, ErrorEntry, IdentifierField};
pub use logging::{LogConfig, LogFormat, LoggingGuards, init_logging};
pub use pipeline::{
    DiagnosticsRefresh, Interaction, NoticeLevel, Pipeline, RunOutcome, RunRequest, RunState,
};
pub use remote::{MemberRef, RemoteError, RemoteSession, SessionOptions};
pub use report::{Outcome, Report};
pub use target::{TargetDescriptor, describe};
pub use types::{
    Action, CommandEnvironment, ExecutionResult, FileSystem, ProjectConfig, RemoteEnvironment,
};
pub use util::mask_sensitive_command;
