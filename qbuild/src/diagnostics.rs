//! Diagnostics refresh hook.
//!
//! A compile with `OPTION(*EVENTF)` writes its messages to the `EVFEVENT`
//! file in the build library, one member per object. The CLI has no problem
//! list to reload, so it points the developer at that member instead.

use qbuild_common::{DiagnosticsRefresh, TargetDescriptor};
use tracing::info;

/// Source file holding compiler event members.
pub const EVENT_FILE: &str = "EVFEVENT";

pub fn event_member(target: &TargetDescriptor, build_library: &str) -> String {
    format!("{}/{}({})", build_library, EVENT_FILE, target.name)
}

pub struct EventFileNotice;

impl DiagnosticsRefresh for EventFileNotice {
    fn refresh(&self, target: &TargetDescriptor, build_library: &str) {
        let member = event_member(target, build_library);
        info!(member = %member, "compiler events available");
        eprintln!("Compiler events: {}", member);
    }
}
