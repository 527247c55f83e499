//! In-memory collaborators for tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::WorkspaceApi;
use crate::git::{BranchInspector, GitBranchState};
use crate::model::{Factory, ProjectEntry, Workspace, WorkspaceConfig};
use crate::sync::actions::{ActionHandler, IdeAction};
use crate::{Error, Result};

/// Workspace API backed by a value in memory
#[derive(Debug, Default)]
pub struct FakeApi {
    workspace: Mutex<Workspace>,
    factories: Mutex<HashMap<String, Factory>>,
    updates: Mutex<usize>,
    fail_updates: bool,
}

impl FakeApi {
    pub fn with_workspace(id: &str, projects: Vec<ProjectEntry>) -> Self {
        Self {
            workspace: Mutex::new(Workspace {
                id: id.to_string(),
                config: WorkspaceConfig {
                    projects,
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn with_factory(self, id: &str, factory: Factory) -> Self {
        self.factories.lock().unwrap().insert(id.to_string(), factory);
        self
    }

    pub fn update_count(&self) -> usize {
        *self.updates.lock().unwrap()
    }

    pub fn projects(&self) -> Vec<ProjectEntry> {
        self.workspace.lock().unwrap().config.projects.clone()
    }
}

#[async_trait]
impl WorkspaceApi for FakeApi {
    async fn current_workspace(&self) -> Result<Workspace> {
        let workspace = self.workspace.lock().unwrap().clone();
        // Give concurrent callers a chance to interleave
        tokio::task::yield_now().await;
        Ok(workspace)
    }

    async fn update_workspace(&self, id: &str, workspace: &Workspace) -> Result<()> {
        tokio::task::yield_now().await;
        if self.fail_updates {
            return Err(Error::Api(format!("update of {} rejected", id)));
        }
        *self.workspace.lock().unwrap() = workspace.clone();
        *self.updates.lock().unwrap() += 1;
        Ok(())
    }

    async fn factory(&self, id: &str) -> Result<Factory> {
        self.factories
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Api(format!("factory {} not found", id)))
    }
}

/// Branch inspector answering from a fixed table
#[derive(Debug, Default)]
pub struct FakeInspector {
    branches: Mutex<HashMap<PathBuf, GitBranchState>>,
    calls: Mutex<usize>,
}

impl FakeInspector {
    pub fn set(&self, repo: impl Into<PathBuf>, state: GitBranchState) {
        self.branches.lock().unwrap().insert(repo.into(), state);
    }

    /// Number of inspections so far
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BranchInspector for FakeInspector {
    async fn current_branch(&self, repo: &Path) -> Result<Option<GitBranchState>> {
        *self.calls.lock().unwrap() += 1;
        let branches = self.branches.lock().unwrap();
        // Repository roots may arrive with a trailing slash
        let key = PathBuf::from(repo.to_string_lossy().trim_end_matches('/'));
        Ok(branches.get(&key).cloned())
    }
}

/// Action handler that records what it was given
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub actions: Mutex<Vec<IdeAction>>,
}

#[async_trait]
impl ActionHandler for RecordingHandler {
    async fn handle(&self, action: IdeAction) -> Result<()> {
        self.actions.lock().unwrap().push(action);
        Ok(())
    }
}
