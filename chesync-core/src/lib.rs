//! chesync core - keeps a Che workspace project list and the git checkouts
//! under the projects root in sync
//!
//! This crate provides path normalization, git branch inspection, project list
//! reconciliation, startup cloning and the filesystem watch bridge. The remote
//! workspace service is reached through the [`WorkspaceApi`] trait.

pub mod api;
pub mod config;
pub mod error;
pub mod git;
pub mod model;
pub mod path;
pub mod projects;
pub mod sync;

pub use api::WorkspaceApi;
pub use config::{CliOverrides, Config};
pub use error::{Error, Result};
pub use git::{BranchInspector, GitBranchState, GitCli};
pub use model::{Factory, ProjectEntry, ProjectSource, Workspace};
pub use sync::{ActionHandler, IdeAction, WorkspaceSync};
