mod types;

pub use types::{FeaturesConfig, ReconcilerConfig, RequeueConfig};
