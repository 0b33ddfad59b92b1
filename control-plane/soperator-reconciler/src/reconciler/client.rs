use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use json_patch::PatchOperation;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, Patch, PatchParams, PostParams, Preconditions};
use kube::{Client, Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::trace;

use super::ObjectKey;
use super::error::StoreError;
use super::merge::SpecPatch;

/// Store operations for a single child kind.
///
/// Implementations must report failures through [`StoreError`] so the engine
/// can tell NotFound, Gone and Conflict apart from everything else.
#[async_trait]
pub trait ResourceClient<K>: Send + Sync {
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError>;

    async fn create(&self, obj: &K) -> Result<K, StoreError>;

    /// Apply `patch` to `existing`. The write must be rejected with
    /// [`StoreError::Conflict`] when `existing` is no longer the latest
    /// revision.
    async fn patch(&self, existing: &K, patch: &SpecPatch)
    -> Result<K, StoreError>;

    async fn delete(&self, existing: &K) -> Result<(), StoreError>;
}

/// [`ResourceClient`] backed by the Kubernetes API server.
pub struct KubeResourceClient<K> {
    client: Client,
    field_manager: String,
    timeout: Duration,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Clone for KubeResourceClient<K> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            field_manager: self.field_manager.clone(),
            timeout: self.timeout,
            _kind: PhantomData,
        }
    }
}

impl<K> KubeResourceClient<K> {
    pub fn new(
        client: Client,
        field_manager: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
            timeout,
            _kind: PhantomData,
        }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, kube::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(res) => res.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        }
    }
}

impl<K> KubeResourceClient<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
{
    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn api_for(&self, obj: &K) -> Api<K> {
        let ns = obj.namespace().unwrap_or_else(|| "default".into());
        self.api(&ns)
    }
}

#[async_trait]
impl<K> ResourceClient<K> for KubeResourceClient<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError> {
        trace!(%key, kind = %K::kind(&()), "get");
        let api = self.api(&key.namespace);
        self.bounded(api.get(&key.name)).await
    }

    async fn create(&self, obj: &K) -> Result<K, StoreError> {
        let pp = PostParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        };
        let api = self.api_for(obj);
        self.bounded(api.create(&pp, obj)).await
    }

    async fn patch(
        &self,
        existing: &K,
        patch: &SpecPatch,
    ) -> Result<K, StoreError> {
        let mut ops = Vec::with_capacity(patch.operations().len() + 1);
        // Pin the revision we diffed against; the API server answers 409 if
        // the object moved on since.
        if let Some(rv) = existing.resource_version() {
            ops.push(serde_json::from_value::<PatchOperation>(json!({
                "op": "replace",
                "path": "/metadata/resourceVersion",
                "value": rv,
            }))?);
        }
        ops.extend(patch.operations().iter().cloned());

        let pp = PatchParams {
            field_manager: Some(self.field_manager.clone()),
            ..Default::default()
        };
        let body: Patch<()> = Patch::Json(json_patch::Patch(ops));
        let api = self.api_for(existing);
        self.bounded(api.patch(&existing.name_any(), &pp, &body)).await
    }

    async fn delete(&self, existing: &K) -> Result<(), StoreError> {
        // Never delete a same-named replacement of the object we inspected.
        let dp = DeleteParams {
            preconditions: existing.uid().map(|uid| Preconditions {
                uid: Some(uid),
                resource_version: None,
            }),
            ..Default::default()
        };
        let api = self.api_for(existing);
        self.bounded(api.delete(&existing.name_any(), &dp))
            .await
            .map(|_| ())
    }
}
