use std::collections::BTreeMap;

use kube::ResourceExt;
use serde_json::json;

use crate::crd::otel_collector::{
    OpenTelemetryCollector, OpenTelemetryCollectorSpec,
};
use crate::crd::slurm_cluster::{JobsTelemetry, SlurmCluster};

pub const DEFAULT_COLLECTOR_IMAGE: &str =
    "otel/opentelemetry-collector-contrib:0.98.0";
pub const DEFAULT_OTLP_GRPC_PORT: i32 = 4317;
const COMPONENT_LABEL: &str = "app.kubernetes.io/component";
const INSTANCE_LABEL: &str = "app.kubernetes.io/instance";

/// The collector a cluster wants, or `None` when job events are not exported
/// (or the feature is switched off operator-wide).
pub fn render_otel_collector(
    cluster: &SlurmCluster,
    feature_enabled: bool,
) -> Option<OpenTelemetryCollector> {
    if !feature_enabled {
        return None;
    }
    let telemetry = cluster.spec.telemetry.as_ref()?;
    let jobs = telemetry
        .jobs_telemetry
        .as_ref()
        .filter(|j| j.send_jobs_events)?;
    let settings = telemetry.otel_collector.clone().unwrap_or_default();

    let mut collector = OpenTelemetryCollector::new(
        &cluster.name_any(),
        OpenTelemetryCollectorSpec {
            mode: Some("deployment".into()),
            image: Some(
                settings
                    .image
                    .unwrap_or_else(|| DEFAULT_COLLECTOR_IMAGE.to_string()),
            ),
            replicas: Some(settings.replicas.unwrap_or(1)),
            config: Some(pipeline_config(jobs)),
        },
    );
    collector.metadata.namespace = cluster.namespace();
    collector.metadata.labels = Some(BTreeMap::from([
        (COMPONENT_LABEL.to_string(), "otel-collector".to_string()),
        (INSTANCE_LABEL.to_string(), cluster.name_any()),
    ]));
    Some(collector)
}

fn pipeline_config(jobs: &JobsTelemetry) -> serde_json::Value {
    let port = jobs.otel_collector_port.unwrap_or(DEFAULT_OTLP_GRPC_PORT);
    json!({
        "receivers": {
            "otlp": {
                "protocols": {
                    "grpc": { "endpoint": format!("0.0.0.0:{port}") }
                }
            }
        },
        "processors": { "batch": {} },
        "exporters": { "debug": {} },
        "service": {
            "pipelines": {
                "logs": {
                    "receivers": ["otlp"],
                    "processors": ["batch"],
                    "exporters": ["debug"]
                }
            }
        }
    })
}
