//! Synchronization between the workspace project list and local checkouts
//!
//! At startup the declared projects missing on disk are cloned; afterwards
//! git repositories appearing, changing or disappearing below the projects
//! root are written back to the workspace.

mod actions;
mod clone;
mod controller;
mod poll;
mod store;
mod watch;

#[cfg(test)]
pub(crate) mod fakes;

pub use actions::{ActionHandler, IdeAction, OPEN_FILE_ACTION, RUN_COMMAND_ACTION};
pub use clone::{execute_clones, plan_clones, CloneReport, CloneTask};
pub use controller::{StartupReport, WorkspaceSync};
pub use poll::{PollWatcher, Snapshot};
pub use store::{UpdateOutcome, WorkspaceProjects};
pub use watch::{EventOutcome, WatchBridge, WatchEvent, WatchEventKind, WatchHandle};
