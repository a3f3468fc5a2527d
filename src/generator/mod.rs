//! Metric generation: samples, family generators, composition and filtering.

mod family;
mod metric;

pub use family::{extract_headers, filter_families, ComposedGenerator, FamilyGenerator};
pub use metric::{write_float, Metric, MetricFamily, MetricType};
