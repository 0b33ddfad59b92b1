use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder};
use tracing::debug;

pub const REASON_CHILD_CREATED: &str = "ChildCreated";
pub const REASON_CHILD_DELETED: &str = "ChildDeleted";
pub const REASON_FOREIGN_CHILD: &str = "ForeignChild";

pub async fn emit_event(
    recorder: &Recorder,
    obj_ref: &ObjectReference,
    type_: EventType,
    reason: &str,
    action: &str,
    note: Option<String>,
) {
    if let Err(e) = recorder
        .publish(
            &Event {
                type_,
                reason: reason.into(),
                note,
                action: action.into(),
                secondary: None,
            },
            obj_ref,
        )
        .await
    {
        debug!(error = %e, reason, "failed to publish event");
    }
}
