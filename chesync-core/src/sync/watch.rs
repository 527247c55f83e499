//! Reflecting git repository events from disk into the workspace

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use super::store::{UpdateOutcome, WorkspaceProjects};
use crate::git::{git_root_folder, BranchInspector};
use crate::path::to_project_path;
use crate::Result;

/// Filesystem change kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEventKind {
    Create,
    Change,
    Delete,
}

/// A change to a watched file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub kind: WatchEventKind,
    pub path: PathBuf,
}

impl WatchEvent {
    pub fn new(kind: WatchEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// What handling one event led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// The project was created or updated in the workspace
    Upserted { project_path: String },
    /// The project was removed from the workspace
    Deleted { project_path: String },
    /// The workspace already matched the repository
    Unchanged { project_path: String },
    /// Nothing could or should be synchronized
    Skipped,
}

/// Routes git file events to project list updates
#[derive(Clone)]
pub struct WatchBridge {
    projects: Arc<WorkspaceProjects>,
    inspector: Arc<dyn BranchInspector>,
    projects_root: PathBuf,
}

impl std::fmt::Debug for WatchBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchBridge")
            .field("projects_root", &self.projects_root)
            .finish_non_exhaustive()
    }
}

impl WatchBridge {
    pub fn new(
        projects: Arc<WorkspaceProjects>,
        inspector: Arc<dyn BranchInspector>,
        projects_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            projects,
            inspector,
            projects_root: projects_root.into(),
        }
    }

    /// Workspace project path of the repository owning `git_file`, if any
    fn project_of(&self, git_file: &Path) -> Option<(PathBuf, String)> {
        let file = git_file.to_string_lossy();
        let repo_root = git_root_folder(&file);
        if repo_root.len() == file.len() {
            return None;
        }

        let project_path = to_project_path(repo_root, &self.projects_root.to_string_lossy());
        if project_path == "/" {
            return None;
        }

        Some((PathBuf::from(repo_root), project_path))
    }

    /// Handle a single event
    ///
    /// Errors from git or from the workspace API are returned; an unresolvable
    /// branch or a path that is not a project is reported as `Skipped`.
    pub async fn handle_event(&self, event: &WatchEvent) -> Result<EventOutcome> {
        let Some((repo_root, project_path)) = self.project_of(&event.path) else {
            debug!(path = %event.path.display(), "Not a project git file, ignoring");
            return Ok(EventOutcome::Skipped);
        };

        match event.kind {
            WatchEventKind::Create | WatchEventKind::Change => {
                let branch = self.inspector.current_branch(&repo_root).await?;

                let Some((location, upstream_branch)) = branch.as_ref().and_then(|b| {
                    let url = b.resolved_remote_url()?;
                    let upstream = b.upstream.as_ref()?;
                    Some((url, upstream.branch.as_str()))
                }) else {
                    warn!(
                        repo = %repo_root.display(),
                        "Could not detect git project branch"
                    );
                    return Ok(EventOutcome::Skipped);
                };

                let outcome = self
                    .projects
                    .upsert_git_project(&project_path, location, upstream_branch)
                    .await?;

                Ok(match outcome {
                    UpdateOutcome::Pushed => EventOutcome::Upserted { project_path },
                    UpdateOutcome::Unchanged => EventOutcome::Unchanged { project_path },
                })
            }
            WatchEventKind::Delete => {
                let outcome = self.projects.delete_git_project(&project_path).await?;

                Ok(match outcome {
                    UpdateOutcome::Pushed => EventOutcome::Deleted { project_path },
                    UpdateOutcome::Unchanged => EventOutcome::Unchanged { project_path },
                })
            }
        }
    }

    /// Process events until the sender side closes
    ///
    /// Failures are logged and the loop keeps going; a failed update is not
    /// retried.
    pub async fn run(self, mut events: mpsc::Receiver<WatchEvent>) {
        while let Some(event) = events.recv().await {
            debug!(kind = ?event.kind, path = %event.path.display(), "Git file event");

            if let Err(e) = self.handle_event(&event).await {
                error!(
                    path = %event.path.display(),
                    "Failed to synchronize workspace project: {}",
                    e
                );
            }
        }

        debug!("Watch event stream closed");
    }
}

/// Keeps watch tasks alive; dropping it stops them
#[derive(Debug, Default)]
pub struct WatchHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl WatchHandle {
    pub fn new(task: JoinHandle<()>) -> Self {
        Self { tasks: vec![task] }
    }

    /// Tie another task to this handle's lifetime
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Stop all tasks
    pub fn dispose(&self) {
        for task in &self.tasks {
            task.abort();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(JoinHandle::is_finished)
    }
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}
