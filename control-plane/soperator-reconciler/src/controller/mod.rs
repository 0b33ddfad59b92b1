use std::sync::Arc;

use futures_util::StreamExt;
use kube::{
    Client, Resource, ResourceExt,
    api::Api,
    runtime::{
        Controller,
        controller::Action,
        events::{EventType, Recorder, Reporter},
        watcher::Config,
    },
};
use tokio::time::Duration;
use tracing::{error, info, instrument};

pub mod events;

use crate::config::ReconcilerConfig;
use crate::crd::otel_collector::OpenTelemetryCollector;
use crate::crd::slurm_cluster::SlurmCluster;
use crate::reconciler::{
    ErrorClass, KubeResourceClient, OtelReconciler, Outcome, ParentRef,
    ReconcileError, otel_reconciler,
};
use crate::values::otel::render_otel_collector;
use events::{
    REASON_CHILD_CREATED, REASON_CHILD_DELETED, REASON_FOREIGN_CHILD,
    emit_event,
};

#[derive(thiserror::Error, Debug)]
pub enum ReconcileErr {
    #[error(transparent)]
    Child(#[from] ReconcileError),
}

impl ReconcileErr {
    pub fn class(&self) -> ErrorClass {
        match self {
            ReconcileErr::Child(e) => e.class(),
        }
    }
}

pub struct ControllerContext {
    pub cfg: ReconcilerConfig,
    pub otel: OtelReconciler<KubeResourceClient<OpenTelemetryCollector>>,
    pub recorder: Recorder,
}

impl ControllerContext {
    pub fn new(client: Client, cfg: ReconcilerConfig) -> Self {
        let otel = otel_reconciler(KubeResourceClient::new(
            client.clone(),
            cfg.field_manager.clone(),
            cfg.request_timeout(),
        ));
        let reporter = Reporter {
            controller: cfg.field_manager.clone(),
            instance: std::env::var("CONTROLLER_POD_NAME").ok(),
        };
        Self {
            recorder: Recorder::new(client, reporter),
            otel,
            cfg,
        }
    }
}

pub async fn run_controller(
    client: Client,
    cfg: ReconcilerConfig,
) -> anyhow::Result<()> {
    let (clusters, collectors): (
        Api<SlurmCluster>,
        Api<OpenTelemetryCollector>,
    ) = match cfg.k8s_namespace.as_deref() {
        Some(ns) => (
            Api::namespaced(client.clone(), ns),
            Api::namespaced(client.clone(), ns),
        ),
        None => (Api::all(client.clone()), Api::all(client.clone())),
    };
    let watch_collectors = cfg.otel_collector_enabled();
    let ctx = Arc::new(ControllerContext::new(client, cfg));

    let mut controller = Controller::new(clusters, Config::default());
    if watch_collectors {
        controller = controller.owns(collectors, Config::default());
    }

    controller
        .run(reconcile, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj_ref, action)) => {
                    info!(cluster = %obj_ref, "reconciled: requeue={:?}", action)
                }
                Err(e) => error!(error = ?e, "controller error"),
            }
        })
        .await;

    Ok(())
}

#[instrument(skip_all, fields(ns = %obj.namespace().unwrap_or_else(|| "default".into()), name = %obj.name_any()))]
pub async fn reconcile(
    obj: Arc<SlurmCluster>,
    ctx: Arc<ControllerContext>,
) -> Result<Action, ReconcileErr> {
    // Owned children are removed by the garbage collector once the cluster
    // itself is gone.
    if obj.meta().deletion_timestamp.is_some() {
        return Ok(Action::await_change());
    }

    let parent = ParentRef::from_resource(obj.as_ref());
    let desired =
        render_otel_collector(&obj, ctx.cfg.otel_collector_enabled());
    let outcome = ctx.otel.reconcile(&parent, desired.as_ref(), &[]).await?;
    info!(%outcome, "reconcile: OpenTelemetryCollector");

    let obj_ref = obj.object_ref(&());
    match outcome {
        Outcome::Created => {
            emit_event(
                &ctx.recorder,
                &obj_ref,
                EventType::Normal,
                REASON_CHILD_CREATED,
                "Create",
                Some(format!("Created OpenTelemetryCollector {}", parent.name)),
            )
            .await
        }
        Outcome::Deleted => {
            emit_event(
                &ctx.recorder,
                &obj_ref,
                EventType::Normal,
                REASON_CHILD_DELETED,
                "Delete",
                Some(format!("Deleted OpenTelemetryCollector {}", parent.name)),
            )
            .await
        }
        Outcome::Foreign => {
            emit_event(
                &ctx.recorder,
                &obj_ref,
                EventType::Warning,
                REASON_FOREIGN_CHILD,
                "Skip",
                Some(format!(
                    "OpenTelemetryCollector {} exists but is not owned by this cluster",
                    parent.name
                )),
            )
            .await
        }
        Outcome::Patched | Outcome::Unchanged | Outcome::Absent => {}
    }

    Ok(Action::requeue(Duration::from_secs(ctx.cfg.requeue.success_secs)))
}

/// Requeue delay after a failed pass. Stale writes are retried quickly,
/// everything else waits for the regular error backoff.
pub fn error_requeue_after(class: ErrorClass, cfg: &ReconcilerConfig) -> Duration {
    match class {
        ErrorClass::Conflict => Duration::from_secs(cfg.requeue.conflict_secs),
        ErrorClass::NotFound | ErrorClass::Gone | ErrorClass::Other => {
            Duration::from_secs(cfg.requeue.error_secs)
        }
    }
}

fn error_policy(
    obj: Arc<SlurmCluster>,
    err: &ReconcileErr,
    ctx: Arc<ControllerContext>,
) -> Action {
    let class = err.class();
    error!(
        ns = %obj.namespace().unwrap_or_default(),
        name = %obj.name_any(),
        %class,
        error = %err,
        "reconcile failed"
    );
    Action::requeue(error_requeue_after(class, &ctx.cfg))
}
