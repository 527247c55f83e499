//! CLI command implementations

pub mod branch;
pub mod clone;
pub mod sync;

pub use branch::BranchArgs;
pub use clone::CloneArgs;
pub use sync::SyncArgs;

use std::sync::Arc;

use async_trait::async_trait;
use chesync_che::CheClient;
use chesync_core::sync::{CloneReport, StartupReport};
use chesync_core::{ActionHandler, Config, IdeAction, WorkspaceSync};

/// Build the synchronizer for the configured workspace
fn workspace_sync(config: Config) -> anyhow::Result<WorkspaceSync> {
    let client = CheClient::from_config(&config.api)?;
    Ok(WorkspaceSync::new(config, Arc::new(client)))
}

/// Prints factory actions for the IDE layer to pick up
#[derive(Debug, Default)]
struct PrintActionHandler;

#[async_trait]
impl ActionHandler for PrintActionHandler {
    async fn handle(&self, action: IdeAction) -> chesync_core::Result<()> {
        match action {
            IdeAction::OpenFile { uri } => println!("  open file: {}", uri),
            IdeAction::RunCommand { name } => println!("  run command: {}", name),
            IdeAction::Other { id, properties } => match properties {
                Some(props) => println!("  {}: {}", id, serde_json::to_string(&props)?),
                None => println!("  {}", id),
            },
        }
        Ok(())
    }
}

fn print_clone_report(label: &str, report: &CloneReport) {
    if report.cloned.is_empty() && report.failed.is_empty() {
        println!("{}: nothing to clone", label);
        return;
    }

    println!("{}:", label);
    for path in &report.cloned {
        println!("  [OK]   {}", path.display());
    }
    for (path, reason) in &report.failed {
        println!("  [FAIL] {}: {}", path.display(), reason);
    }
}

fn print_startup_report(report: &StartupReport) {
    if let Some(clones) = &report.workspace {
        print_clone_report("Workspace projects", clones);
    }
    if let Some(clones) = &report.factory {
        print_clone_report("Factory projects", clones);
        println!("Factory actions handled: {}", report.actions);
    }
}
