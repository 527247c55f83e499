//! Invocation of the external git executable

use std::path::Path;
use std::process::{Output, Stdio};

use tokio::process::Command;
use tracing::trace;

use crate::{Error, Result};

/// Config overrides placed before every subcommand
const PLAIN_OUTPUT_ARGS: [&str; 4] = ["-c", "color.ui=false", "-c", "color.branch=false"];

/// Handle to the git executable used for every repository operation
#[derive(Debug, Clone)]
pub struct GitCli {
    /// Path to the git executable (defaults to "git" in PATH)
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from PATH
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Set a custom path to the git executable
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.program = path.into();
        self
    }

    /// Path of the git executable in use
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run git with `args` in `cwd` and collect its output
    ///
    /// Both output streams are drained and the process is reaped before this
    /// returns. A non-zero exit is not an error here; callers inspect the status.
    /// Output is uncoloured and untranslated whatever the user's git config
    /// and locale say.
    pub(crate) async fn run(&self, args: &[&str], cwd: &Path) -> Result<Output> {
        trace!(args = ?args, cwd = %cwd.display(), "Running git");

        Command::new(&self.program)
            .args(PLAIN_OUTPUT_ARGS)
            .args(args)
            .env("LC_ALL", "C")
            .current_dir(cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::Git(format!(
                        "git executable not found at '{}' (or directory {} missing)",
                        self.program,
                        cwd.display()
                    ))
                } else {
                    Error::Io(e)
                }
            })
    }

    /// Run git and fail unless it exits successfully, returning stdout
    pub(crate) async fn run_checked(&self, args: &[&str], cwd: &Path) -> Result<String> {
        let output = self.run(args, cwd).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(format!(
                "git {} failed ({}): {}",
                args.join(" "),
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Check whether the git executable can be run at all
    pub async fn is_available(&self) -> bool {
        match std::env::current_dir() {
            Ok(cwd) => self.run_checked(&["--version"], &cwd).await.is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_executable() {
        let git = GitCli::new().with_path("/usr/bin/nonexistent-git-binary");
        let result = git.run(&["--version"], Path::new("/")).await;
        assert!(matches!(result, Err(Error::Git(_))));
        assert!(!git.is_available().await);
    }

    #[tokio::test]
    async fn test_failing_command_is_reported() {
        let git = GitCli::new();
        if !git.is_available().await {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let result = git.run_checked(&["rev-parse", "HEAD"], dir.path()).await;
        assert!(matches!(result, Err(Error::Git(_))));
    }
}
