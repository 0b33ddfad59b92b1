use std::fmt;
use std::time::Duration;

use super::ObjectKey;
use super::ownership::ParentRef;

/// Coarse classification of a store failure, used by callers to choose a
/// retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The object does not exist; safe to conclude it is absent.
    NotFound,
    /// The object identity is permanently invalid or terminating (HTTP 410).
    Gone,
    /// Optimistic-concurrency rejection of a write based on a stale read.
    Conflict,
    Other,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorClass::NotFound => write!(f, "not-found"),
            ErrorClass::Gone => write!(f, "gone"),
            ErrorClass::Conflict => write!(f, "conflict"),
            ErrorClass::Other => write!(f, "other"),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("gone: {0}")]
    Gone(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("kube api: {0}")]
    Kube(#[source] kube::Error),
}

impl StoreError {
    pub fn class(&self) -> ErrorClass {
        match self {
            StoreError::NotFound(_) => ErrorClass::NotFound,
            StoreError::Gone(_) => ErrorClass::Gone,
            StoreError::Conflict(_) => ErrorClass::Conflict,
            StoreError::Timeout(_)
            | StoreError::Serialization(_)
            | StoreError::Kube(_) => ErrorClass::Other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.class() == ErrorClass::NotFound
    }
}

impl From<kube::Error> for StoreError {
    fn from(e: kube::Error) -> Self {
        match e {
            kube::Error::Api(ae) if ae.code == 404 => {
                StoreError::NotFound(ae.message)
            }
            kube::Error::Api(ae) if ae.code == 410 => {
                StoreError::Gone(ae.message)
            }
            kube::Error::Api(ae) if ae.code == 409 => {
                StoreError::Conflict(ae.message)
            }
            other => StoreError::Kube(other),
        }
    }
}

/// The step of a reconciliation pass that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    Create,
    Merge,
    Patch,
    Delete,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Get => write!(f, "getting"),
            Op::Create => write!(f, "creating"),
            Op::Merge => write!(f, "computing patch"),
            Op::Patch => write!(f, "patching"),
            Op::Delete => write!(f, "deleting"),
        }
    }
}

/// A failed reconciliation pass, carrying enough identity to correlate the
/// parent and child without a backtrace.
#[derive(thiserror::Error, Debug)]
#[error("reconciling {kind} {child} for {parent}: {op}: {source}")]
pub struct ReconcileError {
    pub op: Op,
    pub kind: String,
    pub child: ObjectKey,
    pub parent: ParentRef,
    #[source]
    pub source: StoreError,
}

impl ReconcileError {
    pub fn class(&self) -> ErrorClass {
        self.source.class()
    }

    /// Whether the scheduler should re-drive the pass later. Everything except
    /// a local serialization bug is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self.source, StoreError::Serialization(_))
    }
}
