//! Per-resource metric stores and the watch tasks that keep them current.

pub mod base;
pub mod metrics_store;
pub mod watch;

// Re-export the primary store items so code outside can do
// "use crate::store::{MetricsStore, MetricsWriter};"
pub use base::MetricsWriter;
pub use metrics_store::{MetricsStore, MultiStoreMetricsWriter};
pub use watch::{decode_object, WatchClient, WatchParams, WatchStream};
