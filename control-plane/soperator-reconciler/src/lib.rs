pub mod config;
pub mod controller;
pub mod crd;
pub mod reconciler;
pub mod runtime;
pub mod values;

use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub fn init_tracing(default_env: &str) {
    let filter = EnvFilter::builder()
        .with_env_var("RUST_LOG")
        .from_env_lossy()
        .add_directive(
            default_env
                .parse()
                .unwrap_or_else(|_| LevelFilter::INFO.into()),
        );

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .try_init();
}

/// Ensure rustls uses the aws-lc-rs provider explicitly.
/// This avoids runtime errors when no default provider is set.
pub fn install_crypto_provider() {
    if let Err(e) = rustls::crypto::CryptoProvider::install_default(
        rustls::crypto::aws_lc_rs::default_provider(),
    ) {
        // It's fine if a compatible provider was already installed.
        tracing::debug!(
            ?e,
            "CryptoProvider already installed or incompatible; proceeding"
        );
    }
}
