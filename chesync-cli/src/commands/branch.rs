//! Branch command - inspect the checked-out branch of a repository

use std::path::PathBuf;

use chesync_core::git::AheadBehind;
use chesync_core::path::to_project_path;
use chesync_core::{Config, GitCli};
use clap::Args;

/// Arguments for the branch command
#[derive(Args, Debug)]
pub struct BranchArgs {
    /// Repository directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

impl BranchArgs {
    /// Execute the branch command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let path = if self.path.is_absolute() {
            self.path.clone()
        } else {
            std::env::current_dir()?.join(&self.path)
        };

        let git = GitCli::new().with_path(config.git.path.clone());
        let Some(branch) = git.current_branch(&path).await? else {
            println!("No checked-out branch found in {}", path.display());
            return Ok(());
        };

        println!(
            "Project path: {}",
            to_project_path(&path.to_string_lossy(), &config.projects.root.to_string_lossy())
        );
        println!("Branch: {}", branch.local_branch);
        println!("Commit: {}", branch.commit);

        match &branch.upstream {
            Some(upstream) => {
                println!("Upstream: {}/{}", upstream.remote, upstream.branch);
                println!(
                    "Remote URL: {}",
                    upstream
                        .remote_url
                        .as_deref()
                        .filter(|u| !u.is_empty())
                        .unwrap_or("(not set)")
                );
            }
            None => println!("Upstream: (none)"),
        }

        match branch.ahead_behind {
            Some(AheadBehind::Ahead(n)) => println!("Ahead by {} commit(s)", n),
            Some(AheadBehind::Behind(n)) => println!("Behind by {} commit(s)", n),
            None => {}
        }

        Ok(())
    }
}
