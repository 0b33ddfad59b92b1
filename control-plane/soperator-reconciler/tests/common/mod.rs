#![allow(dead_code)]

use kube::{Client, Config};
use serde_json::{Value, json};
use soperator_reconciler::crd::slurm_cluster::{
    JobsTelemetry, SlurmCluster, SlurmClusterSpec, Telemetry,
};
use wiremock::{MockServer, ResponseTemplate};

pub const NS: &str = "slurm";
pub const CLUSTER: &str = "c1";
pub const COLLECTORS_PATH: &str =
    "/apis/opentelemetry.io/v1beta1/namespaces/slurm/opentelemetrycollectors";

pub fn collector_path(name: &str) -> String {
    format!("{COLLECTORS_PATH}/{name}")
}

// Env guard utilities
pub struct EnvGuard {
    key: &'static str,
    old: Option<String>,
}
impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            if let Some(ref v) = self.old {
                std::env::set_var(self.key, v);
            } else {
                std::env::remove_var(self.key);
            }
        }
    }
}
pub fn set_env(key: &'static str, val: &str) -> EnvGuard {
    let old = std::env::var(key).ok();
    unsafe {
        std::env::set_var(key, val);
    }
    EnvGuard { key, old }
}
pub fn unset_env(key: &'static str) -> EnvGuard {
    let old = std::env::var(key).ok();
    unsafe {
        std::env::remove_var(key);
    }
    EnvGuard { key, old }
}

/// kube client talking to a wiremock server standing in for the API server.
pub fn kube_client(server: &MockServer) -> Client {
    soperator_reconciler::install_crypto_provider();
    let uri: http::Uri = server.uri().parse().expect("mock server uri");
    Client::try_from(Config::new(uri)).expect("kube client")
}

pub fn cluster_with_job_events() -> SlurmCluster {
    let mut c = SlurmCluster::new(
        CLUSTER,
        SlurmClusterSpec {
            telemetry: Some(Telemetry {
                jobs_telemetry: Some(JobsTelemetry {
                    send_jobs_events: true,
                    otel_collector_port: None,
                }),
                otel_collector: None,
            }),
        },
    );
    c.metadata.namespace = Some(NS.into());
    c.metadata.uid = Some("c1-uid".into());
    c
}

pub fn owner_ref_json(kind: &str, name: &str, uid: &str) -> Value {
    json!({
        "apiVersion": "slurm.nebius.ai/v1",
        "kind": kind,
        "name": name,
        "uid": uid,
        "controller": true,
        "blockOwnerDeletion": true,
    })
}

/// Stored collector as the API server would return it.
pub fn collector_json(spec: Value, owners: Vec<Value>) -> Value {
    json!({
        "apiVersion": "opentelemetry.io/v1beta1",
        "kind": "OpenTelemetryCollector",
        "metadata": {
            "name": CLUSTER,
            "namespace": NS,
            "uid": "col-uid",
            "resourceVersion": "5",
            "ownerReferences": owners,
        },
        "spec": spec,
        "status": { "version": "0.98.0" },
    })
}

pub fn status_response(code: u16, reason: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code,
    }))
}
