//! Cloning declared projects that are missing on disk

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::git::GitCli;
use crate::model::ProjectEntry;
use crate::path::project_local_path;
use crate::Result;

/// One pending clone of a declared project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneTask {
    /// Clone URL
    pub source_location: String,
    /// Absolute local checkout directory
    pub target_path: PathBuf,
    /// Branch to check out after cloning
    pub branch: Option<String>,
}

/// Result of a clone batch
#[derive(Debug, Default)]
pub struct CloneReport {
    /// Checkouts that completed
    pub cloned: Vec<PathBuf>,
    /// Checkouts that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl CloneReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Clone tasks for every declared project whose directory does not exist
///
/// Projects whose path would leave `projects_root` are skipped.
pub async fn plan_clones(declared: &[ProjectEntry], projects_root: &Path) -> Vec<CloneTask> {
    let mut tasks = Vec::new();

    for project in declared {
        let Some(target_path) = project_local_path(projects_root, &project.path) else {
            warn!(path = %project.path, "Project path leaves the projects root, not cloning");
            continue;
        };

        match tokio::fs::try_exists(&target_path).await {
            Ok(false) => {}
            Ok(true) => continue,
            Err(e) => {
                warn!(target = %target_path.display(), "Cannot check project directory: {}", e);
                continue;
            }
        }

        let Some(location) = project.location() else {
            warn!(path = %project.path, "Project has no source location, not cloning");
            continue;
        };

        tasks.push(CloneTask {
            source_location: location.to_string(),
            target_path,
            branch: project.branch().map(str::to_string),
        });
    }

    tasks
}

async fn execute_clone(git: &GitCli, task: &CloneTask) -> Result<()> {
    git.clone_repo(&task.source_location, &task.target_path).await?;

    if let Some(branch) = &task.branch {
        git.checkout(&task.target_path, branch).await?;
    }

    Ok(())
}

/// Run all tasks concurrently
///
/// A failed task never stops the others, and whatever was cloned stays on
/// disk even when its branch checkout fails.
pub async fn execute_clones(git: &GitCli, tasks: Vec<CloneTask>) -> CloneReport {
    let mut report = CloneReport::default();
    if tasks.is_empty() {
        return report;
    }

    info!(count = tasks.len(), "Starting cloning projects.");

    let mut handles = Vec::with_capacity(tasks.len());
    for task in tasks {
        let git = git.clone();
        let target = task.target_path.clone();
        let handle = tokio::spawn(async move { execute_clone(&git, &task).await });
        handles.push((target, handle));
    }

    for (target, handle) in handles {
        match handle.await {
            Ok(Ok(())) => report.cloned.push(target),
            Ok(Err(e)) => {
                error!(target = %target.display(), "Failed to clone project: {}", e);
                report.failed.push((target, e.to_string()));
            }
            Err(e) => {
                error!(target = %target.display(), "Clone task panicked: {}", e);
                report.failed.push((target, format!("Task panicked: {}", e)));
            }
        }
    }

    info!(
        cloned = report.cloned.len(),
        failed = report.failed.len(),
        "Finished cloning projects."
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectSource;

    fn declared(path: &str, location: &str, branch: Option<&str>) -> ProjectEntry {
        ProjectEntry {
            name: path.trim_start_matches('/').to_string(),
            path: path.to_string(),
            source: Some(ProjectSource::git(location, branch)),
            ..Default::default()
        }
    }

    async fn git(dir: &Path, args: &[&str]) -> String {
        let output = tokio::process::Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .await
            .unwrap();
        assert!(output.status.success(), "git {:?}: {:?}", args, output);
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    async fn init_source_repo(dir: &Path) {
        std::fs::create_dir_all(dir).unwrap();
        git(dir, &["init", "-q"]).await;
        git(dir, &["symbolic-ref", "HEAD", "refs/heads/trunk"]).await;
        git(dir, &["config", "user.email", "dev@example.com"]).await;
        git(dir, &["config", "user.name", "Dev"]).await;
        std::fs::write(dir.join("README.md"), "hello\n").unwrap();
        git(dir, &["add", "README.md"]).await;
        git(dir, &["commit", "-q", "-m", "initial"]).await;
        git(dir, &["branch", "release"]).await;
    }

    #[tokio::test]
    async fn test_plan_skips_existing_and_sourceless() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("present")).unwrap();

        let projects = vec![
            declared("/present", "https://example.com/present.git", None),
            declared("/group/absent", "https://example.com/absent.git", Some("dev")),
            ProjectEntry {
                path: "/no-source".to_string(),
                ..Default::default()
            },
        ];

        let tasks = plan_clones(&projects, root.path()).await;
        assert_eq!(
            tasks,
            vec![CloneTask {
                source_location: "https://example.com/absent.git".to_string(),
                target_path: root.path().join("group").join("absent"),
                branch: Some("dev".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_plan_rejects_paths_outside_root() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("projects");

        let projects = vec![
            declared("/../outside", "https://example.com/outside.git", None),
            declared("/group/../../outside", "https://example.com/outside.git", None),
            declared("/inside", "https://example.com/inside.git", None),
        ];

        let tasks = plan_clones(&projects, &root).await;
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].target_path, root.join("inside"));
    }

    #[tokio::test]
    async fn test_execute_empty_batch() {
        let report = execute_clones(&GitCli::new(), Vec::new()).await;
        assert!(report.is_success());
        assert!(report.cloned.is_empty());
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let cli = GitCli::new();
        if !cli.is_available().await {
            return;
        }

        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("source");
        init_source_repo(&source).await;

        let root = tmp.path().join("projects");
        let projects = vec![
            declared("/good", source.to_str().unwrap(), Some("release")),
            declared("/bad", tmp.path().join("missing").to_str().unwrap(), None),
        ];

        let tasks = plan_clones(&projects, &root).await;
        assert_eq!(tasks.len(), 2);

        let report = execute_clones(&cli, tasks).await;
        assert_eq!(report.cloned, vec![root.join("good")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, root.join("bad"));

        let good = root.join("good");
        assert_eq!(git(&good, &["rev-parse", "--abbrev-ref", "HEAD"]).await, "release");

        // Nothing left to clone for the project that made it
        let replanned = plan_clones(&projects, &root).await;
        assert_eq!(replanned.len(), 1);
        assert_eq!(replanned[0].target_path, root.join("bad"));
    }
}
