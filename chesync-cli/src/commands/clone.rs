//! Clone command - clone missing projects once

use chesync_che::CheClient;
use chesync_core::sync::plan_clones;
use chesync_core::{Config, WorkspaceApi};
use clap::Args;

use super::{print_clone_report, workspace_sync, PrintActionHandler};

/// Arguments for the clone command
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Factory whose projects and actions are imported as well
    #[arg(long, env = "CHE_FACTORY_ID")]
    pub factory_id: Option<String>,

    /// Only list what would be cloned
    #[arg(long)]
    pub dry_run: bool,
}

impl CloneArgs {
    /// Execute the clone command
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        if self.dry_run {
            let client = CheClient::from_config(&config.api)?;
            let workspace = client.current_workspace().await?;
            let tasks = plan_clones(&workspace.config.projects, &config.projects.root).await;

            println!("[Dry run] {} project(s) to clone", tasks.len());
            for task in tasks {
                println!(
                    "  {} -> {}{}",
                    task.source_location,
                    task.target_path.display(),
                    task.branch
                        .map(|b| format!(" (branch {})", b))
                        .unwrap_or_default()
                );
            }
            return Ok(());
        }

        let sync = workspace_sync(config)?;
        let report = sync.clone_missing_projects().await?;
        print_clone_report("Workspace projects", &report);

        let mut failed = report.failed.len();

        if let Some(id) = self.factory_id.as_deref() {
            match sync.bootstrap_factory(id, &PrintActionHandler).await {
                Some((factory_report, actions)) => {
                    print_clone_report("Factory projects", &factory_report);
                    println!("Factory actions handled: {}", actions);
                    failed += factory_report.failed.len();
                }
                None => anyhow::bail!("Unable to get factory {}", id),
            }
        }

        if failed > 0 {
            anyhow::bail!("{} project(s) failed to clone", failed);
        }

        Ok(())
    }
}
