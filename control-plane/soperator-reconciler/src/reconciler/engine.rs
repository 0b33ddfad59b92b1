use std::fmt::Debug;
use std::marker::PhantomData;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Resource;
use tracing::{debug, info, instrument, warn};

use super::client::ResourceClient;
use super::error::{Op, ReconcileError, StoreError};
use super::merge::MergeStrategy;
use super::ownership::{
    ParentRef, controller_owner_ref, is_owned_by, merge_owner_refs,
};
use super::{ObjectKey, Outcome};

/// Derives the child's identity from its parent.
pub type ChildKeyFn = fn(&ParentRef) -> ObjectKey;

/// Reconciles one child kind `K` through store client `C` using merge
/// strategy `M`.
///
/// Holds no per-pass state; a single instance can serve concurrent passes
/// for different parents.
pub struct ChildReconciler<K, C, M> {
    client: C,
    merge: M,
    child_key: ChildKeyFn,
    _kind: PhantomData<fn() -> K>,
}

impl<K, C, M> ChildReconciler<K, C, M>
where
    K: Resource<DynamicType = ()> + Clone + Debug + Send + Sync,
    C: ResourceClient<K>,
    M: MergeStrategy<K>,
{
    pub fn new(client: C, merge: M, child_key: ChildKeyFn) -> Self {
        Self {
            client,
            merge,
            child_key,
            _kind: PhantomData,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn child_key(&self, parent: &ParentRef) -> ObjectKey {
        (self.child_key)(parent)
    }

    /// Drive the child of `parent` toward `desired`. `None` means the child
    /// should not exist and is handled by [`Self::delete_if_owned`].
    ///
    /// `extra_owner_refs` are attached next to the parent's controller
    /// reference when the child is created.
    #[instrument(skip_all, fields(parent = %parent, kind = %K::kind(&())))]
    pub async fn reconcile(
        &self,
        parent: &ParentRef,
        desired: Option<&K>,
        extra_owner_refs: &[OwnerReference],
    ) -> Result<Outcome, ReconcileError> {
        let Some(desired) = desired else {
            info!("child not desired; deleting it if owned");
            return self.delete_if_owned(parent).await;
        };

        let key = self.child_key(parent);
        match self.client.get(&key).await {
            Ok(existing) => self.update(parent, &key, existing, desired).await,
            Err(e) if e.is_not_found() => {
                self.create(parent, &key, desired, extra_owner_refs).await
            }
            Err(e) => Err(self.fail(Op::Get, parent, &key, e)),
        }
    }

    /// Delete the child of `parent`, but only when the parent owns it.
    ///
    /// NotFound is success. Every other read failure, Gone included, is
    /// returned: a terminating object is not the same as an absent one.
    #[instrument(skip_all, fields(parent = %parent, kind = %K::kind(&())))]
    pub async fn delete_if_owned(
        &self,
        parent: &ParentRef,
    ) -> Result<Outcome, ReconcileError> {
        let key = self.child_key(parent);
        let existing = match self.client.get(&key).await {
            Ok(obj) => obj,
            Err(e) if e.is_not_found() => {
                info!(child = %key, "child not found, skipping deletion");
                return Ok(Outcome::Absent);
            }
            Err(e) => return Err(self.fail(Op::Get, parent, &key, e)),
        };

        if !is_owned_by(existing.meta(), parent) {
            info!(child = %key, "child is not owned by parent, skipping deletion");
            return Ok(Outcome::Foreign);
        }

        match self.client.delete(&existing).await {
            Ok(()) => {
                info!(child = %key, "deleted owned child");
                Ok(Outcome::Deleted)
            }
            Err(e) if e.is_not_found() => {
                debug!(child = %key, "child vanished before delete");
                Ok(Outcome::Absent)
            }
            Err(e) => Err(self.fail(Op::Delete, parent, &key, e)),
        }
    }

    async fn create(
        &self,
        parent: &ParentRef,
        key: &ObjectKey,
        desired: &K,
        extra_owner_refs: &[OwnerReference],
    ) -> Result<Outcome, ReconcileError> {
        let mut obj = desired.clone();
        let meta = obj.meta_mut();
        meta.name = Some(key.name.clone());
        meta.namespace = Some(key.namespace.clone());
        // Server-managed fields must not leak from a template object.
        meta.uid = None;
        meta.resource_version = None;
        meta.generation = None;
        meta.creation_timestamp = None;
        meta.deletion_timestamp = None;
        meta.managed_fields = None;

        let mut refs = vec![controller_owner_ref(parent)];
        if let Some(own) = meta.owner_references.take() {
            merge_owner_refs(&mut refs, &own);
        }
        merge_owner_refs(&mut refs, extra_owner_refs);
        meta.owner_references = Some(refs);

        self.client
            .create(&obj)
            .await
            .map_err(|e| self.fail(Op::Create, parent, key, e))?;
        info!(child = %key, "created child");
        Ok(Outcome::Created)
    }

    async fn update(
        &self,
        parent: &ParentRef,
        key: &ObjectKey,
        existing: K,
        desired: &K,
    ) -> Result<Outcome, ReconcileError> {
        if !is_owned_by(existing.meta(), parent) {
            warn!(child = %key, "child exists but is not owned by parent; leaving it untouched");
            return Ok(Outcome::Foreign);
        }

        let mut working = existing.clone();
        let patch = self
            .merge
            .merge(&mut working, desired)
            .map_err(|e| self.fail(Op::Merge, parent, key, e))?;
        if patch.is_empty() {
            debug!(child = %key, "child spec in sync");
            return Ok(Outcome::Unchanged);
        }

        debug!(child = %key, ops = patch.operations().len(), "patching child spec");
        self.client
            .patch(&existing, &patch)
            .await
            .map_err(|e| self.fail(Op::Patch, parent, key, e))?;
        info!(child = %key, "patched child");
        Ok(Outcome::Patched)
    }

    fn fail(
        &self,
        op: Op,
        parent: &ParentRef,
        key: &ObjectKey,
        source: StoreError,
    ) -> ReconcileError {
        ReconcileError {
            op,
            kind: K::kind(&()).into_owned(),
            child: key.clone(),
            parent: parent.clone(),
            source,
        }
    }
}
