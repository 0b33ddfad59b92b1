use std::fmt;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{
    ObjectMeta, OwnerReference,
};
use kube::{Resource, ResourceExt};

/// Identity of the parent driving a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub uid: Option<String>,
}

impl ParentRef {
    pub fn from_resource<P>(parent: &P) -> Self
    where
        P: Resource<DynamicType = ()>,
    {
        Self {
            api_version: P::api_version(&()).into_owned(),
            kind: P::kind(&()).into_owned(),
            namespace: parent.namespace().unwrap_or_else(|| "default".into()),
            name: parent.name_any(),
            uid: parent.uid(),
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind, self.namespace, self.name)
    }
}

/// Whether `child` records `parent` among its owners. Owner references are
/// namespace-local, so only kind and name take part in the match.
pub fn is_owned_by(child: &ObjectMeta, parent: &ParentRef) -> bool {
    child
        .owner_references
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|r| r.kind == parent.kind && r.name == parent.name)
}

/// Controller reference stamped on every child created for `parent`.
pub fn controller_owner_ref(parent: &ParentRef) -> OwnerReference {
    OwnerReference {
        api_version: parent.api_version.clone(),
        kind: parent.kind.clone(),
        name: parent.name.clone(),
        uid: parent.uid.clone().unwrap_or_default(),
        controller: Some(true),
        block_owner_deletion: Some(true),
    }
}

/// Append `extra` to `refs`, skipping entries that already name the same owner.
pub fn merge_owner_refs(refs: &mut Vec<OwnerReference>, extra: &[OwnerReference]) {
    for r in extra {
        let dup = refs.iter().any(|have| {
            have.kind == r.kind
                && have.name == r.name
                && (have.uid.is_empty() || r.uid.is_empty() || have.uid == r.uid)
        });
        if !dup {
            // Only one reference may claim to be the controller.
            let mut r = r.clone();
            if refs.iter().any(|have| have.controller == Some(true)) {
                r.controller = None;
            }
            refs.push(r);
        }
    }
}
