//! In-memory [`ResourceClient`] used by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use kube::{Resource, ResourceExt};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::client::ResourceClient;
use super::error::{Op, StoreError};
use super::merge::SpecPatch;
use super::ObjectKey;

/// Failure to inject for every call of one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    NotFound,
    Gone,
    Conflict,
    Timeout,
}

impl Fault {
    fn error(self) -> StoreError {
        match self {
            Fault::NotFound => StoreError::NotFound("injected".into()),
            Fault::Gone => StoreError::Gone("the resource is gone".into()),
            Fault::Conflict => {
                StoreError::Conflict("the object has been modified".into())
            }
            Fault::Timeout => {
                StoreError::Timeout(std::time::Duration::from_secs(1))
            }
        }
    }
}

pub struct MemoryStore<K> {
    objects: Mutex<BTreeMap<ObjectKey, K>>,
    faults: Mutex<HashMap<Op, Fault>>,
    next_uid: AtomicUsize,
    pub creates: AtomicUsize,
    pub patches: AtomicUsize,
    pub deletes: AtomicUsize,
}

fn key_of<K: Resource>(obj: &K) -> ObjectKey {
    ObjectKey::new(
        obj.namespace().unwrap_or_else(|| "default".into()),
        obj.name_any(),
    )
}

impl<K> MemoryStore<K>
where
    K: Resource<DynamicType = ()> + Clone + Serialize + DeserializeOwned,
{
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            faults: Mutex::new(HashMap::new()),
            next_uid: AtomicUsize::new(1),
            creates: AtomicUsize::new(0),
            patches: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    /// Seed an object as if something else had created it.
    pub fn with(self, mut obj: K) -> Self {
        let n = self.next_uid.fetch_add(1, Ordering::SeqCst);
        let meta = obj.meta_mut();
        meta.uid.get_or_insert_with(|| format!("uid-{n}"));
        meta.resource_version.get_or_insert_with(|| "1".into());
        self.objects.lock().unwrap().insert(key_of(&obj), obj);
        self
    }

    pub fn fail(&self, op: Op, fault: Fault) {
        self.faults.lock().unwrap().insert(op, fault);
    }

    pub fn heal(&self, op: Op) {
        self.faults.lock().unwrap().remove(&op);
    }

    pub fn stored(&self, key: &ObjectKey) -> Option<K> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Simulate a concurrent writer bumping the stored revision.
    pub fn touch(&self, key: &ObjectKey) {
        let mut objects = self.objects.lock().unwrap();
        if let Some(obj) = objects.get_mut(key) {
            bump(obj);
        }
    }

    pub fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
            + self.patches.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    fn injected(&self, op: Op) -> Result<(), StoreError> {
        match self.faults.lock().unwrap().get(&op) {
            Some(f) => Err(f.error()),
            None => Ok(()),
        }
    }
}

fn bump<K: Resource>(obj: &mut K) {
    let meta = obj.meta_mut();
    let rv = meta
        .resource_version
        .as_deref()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(0);
    meta.resource_version = Some((rv + 1).to_string());
}

#[async_trait]
impl<K> ResourceClient<K> for MemoryStore<K>
where
    K: Resource<DynamicType = ()>
        + Clone
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static,
{
    async fn get(&self, key: &ObjectKey) -> Result<K, StoreError> {
        self.injected(Op::Get)?;
        self.stored(key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn create(&self, obj: &K) -> Result<K, StoreError> {
        self.injected(Op::Create)?;
        let key = key_of(obj);
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&key) {
            return Err(StoreError::Conflict(format!("{key} already exists")));
        }
        let mut obj = obj.clone();
        let n = self.next_uid.fetch_add(1, Ordering::SeqCst);
        obj.meta_mut().uid = Some(format!("uid-{n}"));
        obj.meta_mut().resource_version = Some("1".into());
        objects.insert(key, obj.clone());
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(obj)
    }

    async fn patch(
        &self,
        existing: &K,
        patch: &SpecPatch,
    ) -> Result<K, StoreError> {
        self.injected(Op::Patch)?;
        let key = key_of(existing);
        let mut objects = self.objects.lock().unwrap();
        let current = objects
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if current.resource_version() != existing.resource_version() {
            return Err(StoreError::Conflict(format!(
                "{key} has been modified"
            )));
        }
        let mut doc = serde_json::to_value(current)?;
        json_patch::patch(&mut doc, patch.operations())
            .expect("patch applies to stored object");
        let mut updated: K = serde_json::from_value(doc)?;
        bump(&mut updated);
        objects.insert(key, updated.clone());
        self.patches.fetch_add(1, Ordering::SeqCst);
        Ok(updated)
    }

    async fn delete(&self, existing: &K) -> Result<(), StoreError> {
        self.injected(Op::Delete)?;
        let key = key_of(existing);
        let mut objects = self.objects.lock().unwrap();
        match objects.get(&key) {
            Some(cur) if cur.uid() == existing.uid() => {
                objects.remove(&key);
                self.deletes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Some(_) => Err(StoreError::Conflict(format!("{key} uid changed"))),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }
}
