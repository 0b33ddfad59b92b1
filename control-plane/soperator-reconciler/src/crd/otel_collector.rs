//! Minimal typed view of the OpenTelemetry operator's collector resource.
//!
//! The CRD itself is installed by the OpenTelemetry operator; only the fields
//! this operator writes are modelled, everything else in the spec is kept in
//! `config` as free-form YAML-compatible JSON.

use kube::CustomResource;
use serde::{Deserialize, Serialize};

use crate::reconciler::HasSpec;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[kube(
    group = "opentelemetry.io",
    version = "v1beta1",
    kind = "OpenTelemetryCollector",
    plural = "opentelemetrycollectors",
    namespaced,
    status = "OpenTelemetryCollectorStatus",
    schema = "disabled"
)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetryCollectorSpec {
    /// deployment | daemonset | statefulset | sidecar
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenTelemetryCollectorStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<CollectorScale>,
}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectorScale {
    pub replicas: Option<i32>,
    pub status_replicas: Option<String>,
}

impl HasSpec for OpenTelemetryCollector {
    type Spec = OpenTelemetryCollectorSpec;

    fn spec(&self) -> &Self::Spec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut Self::Spec {
        &mut self.spec
    }
}
