//! Repository cloning and branch checkout

use std::path::Path;

use tracing::{debug, info};

use super::cli::GitCli;
use crate::{Error, Result};

impl GitCli {
    /// Clone `location` into `target`, creating missing parent directories
    pub async fn clone_repo(&self, location: &str, target: &Path) -> Result<()> {
        let parent = target
            .parent()
            .ok_or_else(|| Error::Other(format!("Invalid clone target: {}", target.display())))?;

        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::Other(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;

        let target_str = target.to_string_lossy();
        debug!(location, target = %target_str, "Cloning repository");

        let output = self.run(&["clone", location, &target_str], parent).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);

            // Check for common error types
            if stderr.contains("Authentication failed") || stderr.contains("Permission denied") {
                return Err(Error::Git(format!(
                    "Authentication failed for {}. Check your credentials or repository access.",
                    location
                )));
            }

            if stderr.contains("Could not resolve host") || stderr.contains("unable to access") {
                return Err(Error::Git(format!(
                    "Network error cloning {}. Check the workspace network access.",
                    location
                )));
            }

            if stderr.contains("not found") || stderr.contains("does not exist") {
                return Err(Error::Git(format!(
                    "Repository not found: {}. Check the project source location.",
                    location
                )));
            }

            if stderr.contains("already exists and is not an empty directory") {
                return Err(Error::Git(format!(
                    "Clone target {} already exists",
                    target.display()
                )));
            }

            return Err(Error::Git(format!("git clone failed: {}", stderr.trim())));
        }

        info!(location, target = %target_str, "Cloned repository");
        Ok(())
    }

    /// Check out `branch` in the repository at `repo`
    ///
    /// An existing local or remote-tracking branch is checked out; otherwise a
    /// new local branch with that name is created from HEAD. The trailing `--`
    /// keeps a branch name that matches a file from being read as a path.
    pub async fn checkout(&self, repo: &Path, branch: &str) -> Result<()> {
        let output = self.run(&["checkout", branch, "--"], repo).await?;
        if output.status.success() {
            debug!(repo = %repo.display(), branch, "Checked out branch");
            return Ok(());
        }

        debug!(
            repo = %repo.display(),
            branch,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "Branch not found, creating it"
        );

        self.run_checked(&["checkout", "-b", branch, "--"], repo).await?;
        Ok(())
    }
}
