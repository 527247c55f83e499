//! Serialized read-modify-write access to the workspace project list

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::api::WorkspaceApi;
use crate::model::ProjectEntry;
use crate::projects::{delete_git_project, upsert_git_project};
use crate::{Error, Result};

/// What a project list update did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The workspace was updated remotely
    Pushed,
    /// The edit left the project list as it was, nothing was sent
    Unchanged,
}

/// Project list of the current workspace
///
/// Every fetch-edit-update sequence holds the same lock, so concurrent watch
/// events and startup work never overwrite each other's edits.
pub struct WorkspaceProjects {
    api: Arc<dyn WorkspaceApi>,
    lock: Mutex<()>,
}

impl std::fmt::Debug for WorkspaceProjects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceProjects").finish_non_exhaustive()
    }
}

impl WorkspaceProjects {
    pub fn new(api: Arc<dyn WorkspaceApi>) -> Self {
        Self {
            api,
            lock: Mutex::new(()),
        }
    }

    /// The remote API this store writes to
    pub fn api(&self) -> &Arc<dyn WorkspaceApi> {
        &self.api
    }

    /// Current declared projects
    pub async fn projects(&self) -> Result<Vec<ProjectEntry>> {
        let _guard = self.lock.lock().await;
        let workspace = self.api.current_workspace().await?;
        Ok(workspace.config.projects)
    }

    /// Apply `edit` to the current project list and push the result
    pub async fn modify<F>(&self, edit: F) -> Result<UpdateOutcome>
    where
        F: FnOnce(&mut Vec<ProjectEntry>) + Send,
    {
        let _guard = self.lock.lock().await;

        let mut workspace = self.api.current_workspace().await?;
        if workspace.id.is_empty() {
            return Err(Error::Api("current workspace id is not defined".to_string()));
        }

        let before = workspace.config.projects.clone();
        edit(&mut workspace.config.projects);

        if workspace.config.projects == before {
            debug!(workspace_id = %workspace.id, "Project list unchanged, skipping update");
            return Ok(UpdateOutcome::Unchanged);
        }

        self.api.update_workspace(&workspace.id, &workspace).await?;
        Ok(UpdateOutcome::Pushed)
    }

    /// Record that the project at `path` tracks `location` on `branch`
    pub async fn upsert_git_project(
        &self,
        path: &str,
        location: &str,
        branch: &str,
    ) -> Result<UpdateOutcome> {
        let outcome = self
            .modify(|projects| {
                upsert_git_project(projects, path, location, branch);
            })
            .await?;

        if outcome == UpdateOutcome::Pushed {
            info!(path, location, branch, "Updated workspace project");
        }
        Ok(outcome)
    }

    /// Forget the project at `path`
    pub async fn delete_git_project(&self, path: &str) -> Result<UpdateOutcome> {
        let outcome = self
            .modify(|projects| {
                delete_git_project(projects, path);
            })
            .await?;

        if outcome == UpdateOutcome::Pushed {
            info!(path, "Removed workspace project");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::fakes::FakeApi;

    #[tokio::test]
    async fn test_upsert_pushes_update() {
        let api = Arc::new(FakeApi::with_workspace("ws1", vec![]));
        let store = WorkspaceProjects::new(api.clone());

        let outcome = store.upsert_git_project("/app", "url", "main").await.unwrap();
        assert_eq!(outcome, UpdateOutcome::Pushed);
        assert_eq!(api.update_count(), 1);

        let projects = store.projects().await.unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].branch(), Some("main"));
    }

    #[tokio::test]
    async fn test_identical_upsert_is_not_pushed() {
        let api = Arc::new(FakeApi::with_workspace("ws1", vec![]));
        let store = WorkspaceProjects::new(api.clone());

        store.upsert_git_project("/app", "url", "main").await.unwrap();
        let outcome = store.upsert_git_project("/app", "url", "main").await.unwrap();

        assert_eq!(outcome, UpdateOutcome::Unchanged);
        assert_eq!(api.update_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_workspace_id() {
        let api = Arc::new(FakeApi::with_workspace("", vec![]));
        let store = WorkspaceProjects::new(api.clone());

        let result = store.upsert_git_project("/app", "url", "main").await;
        assert!(matches!(result, Err(Error::Api(_))));
        assert_eq!(api.update_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_edits_are_not_lost() {
        let api = Arc::new(FakeApi::with_workspace("ws1", vec![]));
        let store = Arc::new(WorkspaceProjects::new(api.clone()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .upsert_git_project(&format!("/p{}", i), "url", "main")
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.projects().await.unwrap().len(), 16);
    }
}
