use kube::Client;
use tokio::task::JoinHandle;
use tracing::info;

use crate::{config::ReconcilerConfig, controller::run_controller};

/// Spawn the Kubernetes controller loop.
pub fn spawn_controller(
    client: Client,
    cfg: ReconcilerConfig,
) -> JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move { run_controller(client, cfg).await })
}

/// Run the controller until it stops or the process receives Ctrl-C.
pub async fn run(client: Client, cfg: ReconcilerConfig) -> anyhow::Result<()> {
    let controller = spawn_controller(client, cfg);
    tokio::select! {
        res = controller => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}
