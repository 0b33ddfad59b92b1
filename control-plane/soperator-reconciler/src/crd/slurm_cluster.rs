use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const SLURM_CLUSTER_KIND: &str = "SlurmCluster";

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
#[kube(
    group = "slurm.nebius.ai",
    version = "v1",
    kind = "SlurmCluster",
    plural = "slurmclusters",
    namespaced,
    status = "SlurmClusterStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct SlurmClusterSpec {
    /// Telemetry settings; absent means no telemetry children are managed
    pub telemetry: Option<Telemetry>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Telemetry {
    pub jobs_telemetry: Option<JobsTelemetry>,
    /// Overrides for the OpenTelemetryCollector that receives job events
    pub otel_collector: Option<OtelCollectorSettings>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JobsTelemetry {
    /// Emit Slurm job events to an OpenTelemetry collector
    #[serde(default)]
    pub send_jobs_events: bool,
    /// OTLP gRPC port the collector listens on (default 4317)
    pub otel_collector_port: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OtelCollectorSettings {
    /// Collector container image
    pub image: Option<String>,
    pub replicas: Option<i32>,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlurmClusterStatus {
    pub phase: Option<String>,
    pub observed_generation: Option<i64>,
}
