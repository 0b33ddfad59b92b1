//! Reconciliation of a single owned child resource on behalf of a parent.
//!
//! [`ChildReconciler`] drives one child kind toward a desired object: it
//! creates the child when missing, patches its spec when it drifts, and
//! deletes it once it is no longer wanted, but only if the parent owns it.

use std::fmt;

pub mod client;
pub mod engine;
pub mod error;
pub mod merge;
pub mod otel;
pub mod ownership;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{KubeResourceClient, ResourceClient};
pub use engine::ChildReconciler;
pub use error::{ErrorClass, Op, ReconcileError, StoreError};
pub use merge::{HasSpec, MergeStrategy, ReplaceSpec, SpecPatch, copy_then_diff};
pub use otel::{
    OtelMerge, OtelReconciler, otel_collector_key, otel_reconciler,
};
pub use ownership::{ParentRef, controller_owner_ref, is_owned_by};

/// Namespaced identity of a child object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Result of a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The child did not exist and was created.
    Created,
    /// The child's spec drifted and was patched.
    Patched,
    /// The child already matched the desired spec; nothing was written.
    Unchanged,
    /// The owned child was deleted.
    Deleted,
    /// No child exists and none is wanted.
    Absent,
    /// An object not owned by the parent occupies the child's identity. It is
    /// left untouched until someone removes or adopts it.
    Foreign,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Created => "created",
            Outcome::Patched => "patched",
            Outcome::Unchanged => "unchanged",
            Outcome::Deleted => "deleted",
            Outcome::Absent => "absent",
            Outcome::Foreign => "foreign",
        };
        f.write_str(s)
    }
}
