//! Startup cloning, factory bootstrap and continuous watch of one workspace

use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::actions::{ActionHandler, IdeAction};
use super::clone::{execute_clones, plan_clones, CloneReport};
use super::poll::PollWatcher;
use super::store::WorkspaceProjects;
use super::watch::{WatchBridge, WatchHandle};
use crate::api::WorkspaceApi;
use crate::config::Config;
use crate::git::{BranchInspector, GitCli};
use crate::Result;

/// Capacity of the channel between the watch source and the bridge
const WATCH_CHANNEL_CAPACITY: usize = 64;

/// Outcome of the startup phase
#[derive(Debug, Default)]
pub struct StartupReport {
    /// Clones of workspace projects missing on disk
    pub workspace: Option<CloneReport>,
    /// Clones of factory projects, when a factory was given
    pub factory: Option<CloneReport>,
    /// Factory actions handed to the IDE
    pub actions: usize,
}

/// Keeps one workspace's projects and the local checkouts in sync
pub struct WorkspaceSync {
    config: Config,
    projects: Arc<WorkspaceProjects>,
    git: GitCli,
    inspector: Arc<dyn BranchInspector>,
    watch: Option<WatchHandle>,
}

impl std::fmt::Debug for WorkspaceSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSync")
            .field("projects_root", &self.config.projects.root)
            .field("watching", &self.is_watching())
            .finish_non_exhaustive()
    }
}

impl WorkspaceSync {
    pub fn new(config: Config, api: Arc<dyn WorkspaceApi>) -> Self {
        let git = GitCli::new().with_path(config.git.path.clone());
        Self {
            config,
            projects: Arc::new(WorkspaceProjects::new(api)),
            inspector: Arc::new(git.clone()),
            git,
            watch: None,
        }
    }

    /// Use another source of branch state for watch events
    pub fn with_inspector(mut self, inspector: Arc<dyn BranchInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bridge applying watch events to this workspace
    pub fn bridge(&self) -> WatchBridge {
        WatchBridge::new(
            Arc::clone(&self.projects),
            Arc::clone(&self.inspector),
            self.config.projects.root.clone(),
        )
    }

    /// Whether a watch is armed
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Start watching git files below the projects root
    ///
    /// Does nothing when a watch is already armed.
    pub fn arm_watch(&mut self) -> Result<()> {
        if self.is_watching() {
            debug!("Watch already armed");
            return Ok(());
        }

        let watcher = PollWatcher::new(self.config.projects.root.clone(), &self.config.watch)?;
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);

        let bridge = self.bridge();
        let bridge_task = tokio::spawn(bridge.run(rx));
        let handle = watcher.start(tx).with_task(bridge_task);

        info!(
            root = %self.config.projects.root.display(),
            pattern = %self.config.watch.pattern,
            "Watching projects for git changes"
        );

        self.watch = Some(handle);
        Ok(())
    }

    /// Clone the workspace's declared projects that are missing on disk
    pub async fn clone_missing_projects(&self) -> Result<CloneReport> {
        let declared = self.projects.projects().await?;
        let tasks = plan_clones(&declared, &self.config.projects.root).await;
        Ok(execute_clones(&self.git, tasks).await)
    }

    /// Clone a factory's projects and run its post-import actions
    ///
    /// Returns `None` when the factory could not be fetched.
    pub async fn bootstrap_factory(
        &self,
        factory_id: &str,
        handler: &dyn ActionHandler,
    ) -> Option<(CloneReport, usize)> {
        let factory = match self.projects.api().factory(factory_id).await {
            Ok(factory) => factory,
            Err(e) => {
                error!(factory_id, "Unable to get factory: {}", e);
                return None;
            }
        };

        let tasks = plan_clones(factory.projects(), &self.config.projects.root).await;
        let report = execute_clones(&self.git, tasks).await;

        let root = self.config.projects.root.to_string_lossy();
        let actions = factory.on_projects_loaded_actions();
        if actions.is_empty() {
            return Some((report, 0));
        }

        let results = join_all(
            actions
                .iter()
                .map(|action| handler.handle(IdeAction::resolve(action, &root))),
        )
        .await;

        let mut handled = 0;
        for result in results {
            match result {
                Ok(()) => handled += 1,
                Err(e) => warn!(factory_id, "Factory action failed: {}", e),
            }
        }

        info!(
            factory_id,
            handled,
            total = actions.len(),
            "Finished executing 'onProjectsLoaded' actions"
        );

        Some((report, handled))
    }

    /// Arm the watch, then clone what the workspace and the optional factory
    /// declare
    ///
    /// Only a watch that cannot be armed is an error; failures to reach the
    /// workspace API are logged and leave the corresponding report empty.
    pub async fn start(
        &mut self,
        factory_id: Option<&str>,
        handler: &dyn ActionHandler,
    ) -> Result<StartupReport> {
        self.arm_watch()?;

        let mut report = StartupReport::default();

        match self.clone_missing_projects().await {
            Ok(clones) => report.workspace = Some(clones),
            Err(e) => error!("Could not read workspace projects: {}", e),
        }

        if let Some(id) = factory_id.filter(|id| !id.is_empty()) {
            if let Some((clones, actions)) = self.bootstrap_factory(id, handler).await {
                report.factory = Some(clones);
                report.actions = actions;
            }
        }

        Ok(report)
    }

    /// Stop the armed watch, if any
    pub fn dispose(&mut self) {
        if let Some(watch) = self.watch.take() {
            watch.dispose();
        }
    }
}
