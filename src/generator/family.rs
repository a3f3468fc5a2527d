//! Family generators and the composition pipeline that turns a kind's
//! generators into one object -> text function.

use std::fmt;
use std::sync::Arc;

use super::metric::{escape_help, Metric, MetricFamily, MetricType};
use crate::filter::AllowDenyList;
use crate::models::KubeObject;

type GenerateFn<K> = Arc<dyn Fn(&K) -> Vec<Metric> + Send + Sync>;

/// Declares one metric family and how to derive its samples from an object.
pub struct FamilyGenerator<K> {
    pub name: String,
    pub help: String,
    pub metric_type: MetricType,
    generate: GenerateFn<K>,
}

impl<K> FamilyGenerator<K> {
    pub fn new<F>(
        name: impl Into<String>,
        help: impl Into<String>,
        metric_type: MetricType,
        generate: F,
    ) -> Self
    where
        F: Fn(&K) -> Vec<Metric> + Send + Sync + 'static,
    {
        FamilyGenerator {
            name: name.into(),
            help: help.into(),
            metric_type,
            generate: Arc::new(generate),
        }
    }

    /// Runs the transform and names the resulting family.
    pub fn generate(&self, obj: &K) -> MetricFamily {
        MetricFamily {
            name: self.name.clone(),
            metrics: (self.generate)(obj),
        }
    }

    /// The `# HELP` / `# TYPE` header block of this family.
    pub fn header(&self) -> String {
        format!(
            "# HELP {name} {help}\n# TYPE {name} {kind}",
            name = self.name,
            help = escape_help(&self.help),
            kind = self.metric_type
        )
    }
}

impl<K> Clone for FamilyGenerator<K> {
    fn clone(&self) -> Self {
        FamilyGenerator {
            name: self.name.clone(),
            help: self.help.clone(),
            metric_type: self.metric_type,
            generate: self.generate.clone(),
        }
    }
}

impl<K> fmt::Debug for FamilyGenerator<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyGenerator")
            .field("name", &self.name)
            .field("metric_type", &self.metric_type)
            .finish()
    }
}

/// Keeps only the families whose name the allow/deny list accepts.
pub fn filter_families<K>(
    list: &AllowDenyList,
    generators: Vec<FamilyGenerator<K>>,
) -> Vec<FamilyGenerator<K>> {
    generators
        .into_iter()
        .filter(|g| list.is_included(&g.name))
        .collect()
}

/// Header blocks in generator order.
pub fn extract_headers<K>(generators: &[FamilyGenerator<K>]) -> Vec<String> {
    generators.iter().map(FamilyGenerator::header).collect()
}

/// All generators of one kind composed into a single transform. Every
/// emitted sample is prefixed with the object's identity labels.
pub struct ComposedGenerator<K> {
    identity_label: &'static str,
    generators: Vec<FamilyGenerator<K>>,
}

impl<K: KubeObject> ComposedGenerator<K> {
    pub fn new(identity_label: &'static str, generators: Vec<FamilyGenerator<K>>) -> Self {
        ComposedGenerator {
            identity_label,
            generators,
        }
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        extract_headers(&self.generators)
    }

    /// Produces every family for `obj` with identity labels injected.
    pub fn families(&self, obj: &K) -> Vec<MetricFamily> {
        let meta = obj.metadata();
        let namespace = meta.namespace.as_deref().unwrap_or_default();
        let name = meta.name.as_deref().unwrap_or_default();
        let uid = meta.uid.as_deref().unwrap_or_default();
        let keys = ["namespace", self.identity_label, "uid"];
        let values = [namespace, name, uid];

        self.generators
            .iter()
            .map(|generator| {
                let mut family = generator.generate(obj);
                for metric in &mut family.metrics {
                    metric.prepend_labels(&keys, &values);
                }
                family
            })
            .collect()
    }

    /// Renders `obj` into one text block per family, index-aligned with
    /// [`ComposedGenerator::headers`].
    pub fn render(&self, obj: &K) -> Vec<String> {
        self.families(obj).iter().map(MetricFamily::to_text).collect()
    }
}
