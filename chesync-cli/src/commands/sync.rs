//! Sync command - clone missing projects and watch for git changes

use chesync_core::Config;
use clap::Args;

use super::{print_startup_report, workspace_sync, PrintActionHandler};

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Factory whose projects and actions are imported at startup
    #[arg(long, env = "CHE_FACTORY_ID")]
    pub factory_id: Option<String>,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(&self, config: Config) -> anyhow::Result<()> {
        let mut sync = workspace_sync(config)?;

        let report = sync
            .start(self.factory_id.as_deref(), &PrintActionHandler)
            .await?;
        print_startup_report(&report);

        println!();
        println!(
            "Watching {} for git changes (Ctrl-C to stop)...",
            sync.config().projects.root.display()
        );

        tokio::signal::ctrl_c().await?;
        tracing::info!("Interrupted, stopping watch");
        sync.dispose();

        Ok(())
    }
}
