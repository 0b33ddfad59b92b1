//! Binding of the engine to the OpenTelemetryCollector that receives Slurm
//! job events.

use crate::crd::otel_collector::OpenTelemetryCollector;

use super::client::ResourceClient;
use super::engine::ChildReconciler;
use super::merge::ReplaceSpec;
use super::ownership::ParentRef;
use super::ObjectKey;

/// The collector spec is owned entirely by the cluster; replace it wholesale.
pub type OtelMerge = ReplaceSpec<OpenTelemetryCollector>;

pub type OtelReconciler<C> =
    ChildReconciler<OpenTelemetryCollector, C, OtelMerge>;

/// The collector lives next to its cluster and shares its name.
pub fn otel_collector_key(cluster: &ParentRef) -> ObjectKey {
    ObjectKey::new(&cluster.namespace, &cluster.name)
}

pub fn otel_reconciler<C>(client: C) -> OtelReconciler<C>
where
    C: ResourceClient<OpenTelemetryCollector>,
{
    ChildReconciler::new(client, OtelMerge::new(), otel_collector_key)
}
