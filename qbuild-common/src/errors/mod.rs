//! Error types for qbuild.
//!
//! [`BuildError`] is what a run fails with; [`ErrorCode`] gives each failure a
//! stable code and remediation steps for display.
//!
//! # Error Code Ranges
//!
//! | Range      | Category    | Description                          |
//! |------------|-------------|--------------------------------------|
//! | E001-E099  | Config      | Project and user configuration       |
//! | E100-E199  | Target      | Target file and action selection     |
//! | E200-E299  | Transfer    | Uploading sources to the remote host |
//! | E300-E399  | Build       | Remote command execution             |

pub mod build;
pub mod catalog;

pub use build::{BuildError, IdentifierField};
pub use catalog::{ErrorCategory, ErrorCode, ErrorEntry};
