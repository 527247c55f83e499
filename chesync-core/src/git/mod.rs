//! Git operations for chesync
//!
//! Everything here shells out to the git executable; nothing links against a
//! git library.

mod branch;
mod cli;
mod clone;

pub use branch::{
    git_root_folder, parse_git_branch, AheadBehind, BranchInspector, GitBranchState,
    UpstreamBranch,
};
pub use cli::GitCli;
