pub mod otel_collector;
pub mod slurm_cluster;
