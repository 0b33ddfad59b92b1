use envconfig::Envconfig;
use kube::Client;
use soperator_reconciler::{
    config::ReconcilerConfig, init_tracing, install_crypto_provider, runtime,
};
use tracing::info;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing("info");
    install_crypto_provider();

    let cfg = ReconcilerConfig::init_from_env()?.apply_profile_defaults();
    info!(?cfg, "Starting soperator reconciler");

    let client = Client::try_default().await?;
    runtime::run(client, cfg).await
}
