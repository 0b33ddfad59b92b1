//! Merge strategies project the desired spec of one child kind onto the
//! object currently stored in the cluster.
//!
//! A strategy snapshots the existing object *before* touching it and diffs
//! the snapshot against the mutated copy. Diffing after the copy would
//! compare the new state with itself and always yield an empty patch.

use std::marker::PhantomData;

use json_patch::{Patch, PatchOperation};
use serde::Serialize;

use super::error::StoreError;

const SPEC_PATH: &str = "/spec";

/// Child kinds whose mutable section lives under `.spec`.
pub trait HasSpec {
    type Spec: Clone;

    fn spec(&self) -> &Self::Spec;
    fn spec_mut(&mut self) -> &mut Self::Spec;
}

/// JSON Patch confined to the `/spec` subtree of a child object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecPatch(Patch);

impl SpecPatch {
    pub fn is_empty(&self) -> bool {
        self.0.0.is_empty()
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.0.0
    }

    pub fn into_inner(self) -> Patch {
        self.0
    }
}

/// Computes the patch turning `existing` into an object whose spec matches
/// `desired`. Implementations must not talk to the store.
pub trait MergeStrategy<K>: Send + Sync {
    fn merge(
        &self,
        existing: &mut K,
        desired: &K,
    ) -> Result<SpecPatch, StoreError>;
}

impl<K, F> MergeStrategy<K> for F
where
    F: Fn(&mut K, &K) -> Result<SpecPatch, StoreError> + Send + Sync,
{
    fn merge(
        &self,
        existing: &mut K,
        desired: &K,
    ) -> Result<SpecPatch, StoreError> {
        self(existing, desired)
    }
}

/// Snapshot `existing`, apply `copy`, and return the `/spec` part of the
/// difference. Changes `copy` makes outside the spec are dropped from the
/// patch.
pub fn copy_then_diff<K, F>(
    existing: &mut K,
    desired: &K,
    copy: F,
) -> Result<SpecPatch, StoreError>
where
    K: Serialize,
    F: FnOnce(&mut K, &K),
{
    let before = serde_json::to_value(&*existing)?;
    copy(existing, desired);
    let after = serde_json::to_value(&*existing)?;

    let ops = json_patch::diff(&before, &after)
        .0
        .into_iter()
        .filter(|op| targets_spec(op))
        .collect();
    Ok(SpecPatch(Patch(ops)))
}

fn targets_spec(op: &PatchOperation) -> bool {
    let path = match op {
        PatchOperation::Add(o) => o.path.as_str(),
        PatchOperation::Remove(o) => o.path.as_str(),
        PatchOperation::Replace(o) => o.path.as_str(),
        PatchOperation::Move(o) => o.path.as_str(),
        PatchOperation::Copy(o) => o.path.as_str(),
        PatchOperation::Test(o) => o.path.as_str(),
    };
    path == SPEC_PATH || path.starts_with("/spec/")
}

/// Replaces the whole spec of `K` with the desired one.
pub struct ReplaceSpec<K>(PhantomData<fn() -> K>);

impl<K> ReplaceSpec<K> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K> Default for ReplaceSpec<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> MergeStrategy<K> for ReplaceSpec<K>
where
    K: HasSpec + Serialize,
{
    fn merge(
        &self,
        existing: &mut K,
        desired: &K,
    ) -> Result<SpecPatch, StoreError> {
        copy_then_diff(existing, desired, |dst, src| {
            *dst.spec_mut() = src.spec().clone();
        })
    }
}
