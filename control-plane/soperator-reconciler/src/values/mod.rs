//! Desired state of child resources, computed from a SlurmCluster.

pub mod otel;
