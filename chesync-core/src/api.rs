//! Boundary to the remote workspace/factory service

use async_trait::async_trait;

use crate::model::{Factory, Workspace};
use crate::Result;

/// Remote store of workspace configurations and factories
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Fetch the workspace this process runs in
    async fn current_workspace(&self) -> Result<Workspace>;

    /// Replace the stored definition of workspace `id`
    async fn update_workspace(&self, id: &str, workspace: &Workspace) -> Result<()>;

    /// Fetch a factory by id
    async fn factory(&self, id: &str) -> Result<Factory>;
}
