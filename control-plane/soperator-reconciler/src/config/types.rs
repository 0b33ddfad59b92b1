use std::time::Duration;

use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct ReconcilerConfig {
    #[envconfig(from = "SOPERATOR_PROFILE", default = "dev")]
    pub profile: String,

    /// Namespace to watch for SlurmClusters; unset watches all namespaces.
    /// Env: SOPERATOR_K8S_NAMESPACE
    #[envconfig(from = "SOPERATOR_K8S_NAMESPACE")]
    pub k8s_namespace: Option<String>,

    #[envconfig(
        from = "SOPERATOR_FIELD_MANAGER",
        default = "soperator-reconciler"
    )]
    pub field_manager: String,

    /// Upper bound for a single API server call.
    /// Env: SOPERATOR_REQUEST_TIMEOUT_SECS
    #[envconfig(from = "SOPERATOR_REQUEST_TIMEOUT_SECS", default = "30")]
    pub request_timeout_secs: u64,

    #[envconfig(nested)]
    pub requeue: RequeueConfig,

    #[envconfig(nested)]
    pub features: FeaturesConfig,
}

#[derive(Envconfig, Clone, Debug)]
pub struct RequeueConfig {
    #[envconfig(from = "SOPERATOR_REQUEUE_SECS", default = "300")]
    pub success_secs: u64,
    #[envconfig(from = "SOPERATOR_ERROR_REQUEUE_SECS", default = "30")]
    pub error_secs: u64,
    /// Stale writes usually succeed on the next read; retry them sooner.
    /// Env: SOPERATOR_CONFLICT_REQUEUE_SECS
    #[envconfig(from = "SOPERATOR_CONFLICT_REQUEUE_SECS", default = "2")]
    pub conflict_secs: u64,
}

#[derive(Envconfig, Clone, Debug, Default)]
pub struct FeaturesConfig {
    /// If Some, env explicitly set; otherwise, profile defaults apply
    #[envconfig(from = "SOPERATOR_FEATURES_OTEL_COLLECTOR")]
    pub otel_collector: Option<bool>,
}

impl ReconcilerConfig {
    /// Apply profile → defaults mapping, while respecting explicit env overrides.
    ///
    /// - dev: otel_collector=false
    /// - edge, full/prod/production: otel_collector=true
    pub fn apply_profile_defaults(mut self) -> Self {
        let def_otel = match self.profile.as_str() {
            "edge" | "full" | "prod" | "production" => true,
            _ /* dev */ => false,
        };

        if self.features.otel_collector.is_none() {
            self.features.otel_collector = Some(def_otel);
        }

        self
    }

    pub fn otel_collector_enabled(&self) -> bool {
        self.features.otel_collector.unwrap_or(false)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
