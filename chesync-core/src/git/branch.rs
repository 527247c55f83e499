//! Current branch and upstream detection from `git branch -vv`

use std::path::Path;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::cli::GitCli;
use crate::{Error, Result};

/// Remote-tracking branch associated with a local branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBranch {
    /// Remote name (e.g. "origin")
    pub remote: String,
    /// Branch name on the remote
    pub branch: String,
    /// URL configured for the remote, once looked up. An unset remote URL is
    /// looked up as an empty string.
    pub remote_url: Option<String>,
}

/// Divergence between a local branch and its upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AheadBehind {
    Ahead(u64),
    Behind(u64),
}

/// State of a branch as reported by `git branch -vv`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitBranchState {
    /// Whether this is the checked-out branch
    pub is_head: bool,
    /// Local branch name
    pub local_branch: String,
    /// Abbreviated commit hash the branch points to
    pub commit: String,
    /// Tracked upstream, if any
    pub upstream: Option<UpstreamBranch>,
    /// Only set when an upstream is tracked
    pub ahead_behind: Option<AheadBehind>,
}

impl GitBranchState {
    /// Upstream remote URL, if it resolved to something non-empty
    pub fn resolved_remote_url(&self) -> Option<&str> {
        self.upstream
            .as_ref()
            .and_then(|u| u.remote_url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

fn branch_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Neither the remote nor the upstream branch may contain '/', so
        // `[origin/feature/x]` does not match the bracket group.
        Regex::new(
            r"^(\*?)\s+(\S+)\s+(\S+)\s+(\[([^\s^/]+)/([^\s^/]+)(: behind ([0-9]+))?(: ahead ([0-9]+))?\])?.*",
        )
        .expect("branch line pattern is valid")
    })
}

/// Parse one line of `git branch -vv` output
///
/// Returns `None` when the line does not look like a branch entry.
///
/// ```text
/// *  master     e619393 [origin/master: behind 4] call 'onTimeout' callback
/// * vplugin-id 57f328a [sunix/vplugin-id] Moving openfile command args
/// ```
pub fn parse_git_branch(line: &str) -> Option<GitBranchState> {
    let caps = branch_line_regex().captures(line)?;

    let upstream = match (caps.get(4), caps.get(5), caps.get(6)) {
        (Some(_), Some(remote), Some(branch)) => Some(UpstreamBranch {
            remote: remote.as_str().to_string(),
            branch: branch.as_str().to_string(),
            remote_url: None,
        }),
        _ => None,
    };

    let count = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u64>().ok());
    let ahead_behind = match (count(10), count(8)) {
        (Some(ahead), _) => Some(AheadBehind::Ahead(ahead)),
        (None, Some(behind)) => Some(AheadBehind::Behind(behind)),
        (None, None) => None,
    };

    Some(GitBranchState {
        is_head: caps.get(1).is_some_and(|m| m.as_str() == "*"),
        local_branch: caps[2].to_string(),
        commit: caps[3].to_string(),
        upstream,
        ahead_behind,
    })
}

/// Recover a repository root from the path of its `.git/config` or `.git/HEAD`
///
/// The trailing slash is kept (`/p/.git/HEAD` gives `/p/`). Anything else is
/// returned unchanged.
pub fn git_root_folder(path: &str) -> &str {
    for suffix in ["/.git/config", "/.git/HEAD"] {
        if path.ends_with(suffix) {
            return &path[..path.len() - suffix.len() + 1];
        }
    }
    path
}

/// Source of the checked-out branch state of a repository
#[async_trait]
pub trait BranchInspector: Send + Sync {
    /// Inspect the checked-out branch of the repository at `repo`
    ///
    /// `Ok(None)` means the output held no parsable checked-out branch.
    async fn current_branch(&self, repo: &Path) -> Result<Option<GitBranchState>>;
}

impl GitCli {
    /// Checked-out branch of the repository at `repo`, with its upstream
    /// remote URL resolved
    pub async fn current_branch(&self, repo: &Path) -> Result<Option<GitBranchState>> {
        let output = self.run_checked(&["branch", "--no-color", "-vv"], repo).await?;

        let Some(line) = output.lines().find(|line| line.starts_with('*')) else {
            debug!(repo = %repo.display(), "No checked-out branch in git branch output");
            return Ok(None);
        };

        let Some(mut state) = parse_git_branch(line.trim_end()) else {
            debug!(repo = %repo.display(), line, "Unparsable git branch line");
            return Ok(None);
        };

        if let Some(upstream) = state.upstream.as_mut() {
            upstream.remote_url = Some(self.remote_url(&upstream.remote, repo).await?);
        }

        Ok(Some(state))
    }

    /// URL configured for `remote`, or an empty string when it is unset
    pub async fn remote_url(&self, remote: &str, repo: &Path) -> Result<String> {
        let key = format!("remote.{}.url", remote);
        let output = self.run(&["config", "--get", &key], repo).await?;

        // `git config --get` exits with 1 when the key is missing
        match output.status.code() {
            Some(0) | Some(1) => Ok(String::from_utf8_lossy(&output.stdout).trim().to_string()),
            _ => Err(Error::Git(format!(
                "git config --get {} failed ({}): {}",
                key,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }
}

#[async_trait]
impl BranchInspector for GitCli {
    async fn current_branch(&self, repo: &Path) -> Result<Option<GitBranchState>> {
        GitCli::current_branch(self, repo).await
    }
}
