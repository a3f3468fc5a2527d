use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use super::base::MetricsWriter;
use crate::generator::ComposedGenerator;
use crate::models::KubeObject;

type FamilyTexts = Vec<String>;

/// In-memory snapshot of one resource partition, kept as pre-rendered
/// exposition text per object and family.
///
/// Only the owning watch task mutates the store. Objects are rendered before
/// the write lock is taken and each entry is swapped in whole, so concurrent
/// readers never see a partially updated object.
pub struct MetricsStore<K> {
    headers: Vec<String>,
    generator: Arc<ComposedGenerator<K>>,
    metrics: RwLock<BTreeMap<String, FamilyTexts>>,
}

impl<K: KubeObject> MetricsStore<K> {
    pub fn new(headers: Vec<String>, generator: Arc<ComposedGenerator<K>>) -> Self {
        debug_assert_eq!(headers.len(), generator.len());
        MetricsStore {
            headers,
            generator,
            metrics: RwLock::new(BTreeMap::new()),
        }
    }

    /// Inserts the object, replacing any earlier rendering under its key.
    pub fn add(&self, obj: &K) {
        let key = obj.store_key();
        let rendered = self.generator.render(obj);
        self.write_guard().insert(key, rendered);
    }

    /// Removes an object by its store key. Deletions do not need a decodable
    /// object, only its metadata.
    pub fn delete(&self, key: &str) {
        self.write_guard().remove(key);
    }

    /// Swaps the whole content for `objs`, used after a (re)list.
    pub fn replace(&self, objs: &[K]) {
        let rendered: BTreeMap<String, FamilyTexts> = objs
            .iter()
            .map(|obj| (obj.store_key(), self.generator.render(obj)))
            .collect();
        *self.write_guard() = rendered;
    }

    pub fn len(&self) -> usize {
        self.read_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn headers(&self) -> &[String] {
        &self.headers
    }

    pub(crate) fn read_guard(&self) -> RwLockReadGuard<'_, BTreeMap<String, FamilyTexts>> {
        // A panic while holding the lock cannot leave a half-written entry,
        // so the poisoned map is still consistent.
        self.metrics.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, FamilyTexts>> {
        self.metrics.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: KubeObject> MetricsWriter for MetricsStore<K> {
    fn write_all(&self, w: &mut dyn Write) -> io::Result<()> {
        let metrics = self.read_guard();
        for (i, header) in self.headers.iter().enumerate() {
            w.write_all(header.as_bytes())?;
            w.write_all(b"\n")?;
            for families in metrics.values() {
                w.write_all(families[i].as_bytes())?;
            }
        }
        Ok(())
    }
}

/// Writes several partitions of the same resource as one block: each family
/// header once, followed by the samples of every partition.
pub struct MultiStoreMetricsWriter<K> {
    stores: Vec<Arc<MetricsStore<K>>>,
}

impl<K: KubeObject> MultiStoreMetricsWriter<K> {
    pub fn new(stores: Vec<Arc<MetricsStore<K>>>) -> Self {
        MultiStoreMetricsWriter { stores }
    }
}

impl<K: KubeObject> MetricsWriter for MultiStoreMetricsWriter<K> {
    fn write_all(&self, w: &mut dyn Write) -> io::Result<()> {
        let Some(first) = self.stores.first() else {
            return Ok(());
        };
        let guards: Vec<_> = self.stores.iter().map(|s| s.read_guard()).collect();

        for (i, header) in first.headers().iter().enumerate() {
            w.write_all(header.as_bytes())?;
            w.write_all(b"\n")?;
            for metrics in &guards {
                for families in metrics.values() {
                    w.write_all(families[i].as_bytes())?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FamilyGenerator, Metric, MetricType};
    use crate::models::Cluster;

    fn generator() -> Arc<ComposedGenerator<Cluster>> {
        Arc::new(ComposedGenerator::new(
            "cluster",
            vec![
                FamilyGenerator::new("capi_one", "One.", MetricType::Gauge, |_: &Cluster| {
                    vec![Metric::value(1.0)]
                }),
                FamilyGenerator::new("capi_paused", "Paused.", MetricType::Gauge, |c: &Cluster| {
                    vec![Metric::value(if c.spec.paused { 1.0 } else { 0.0 })]
                }),
            ],
        ))
    }

    fn store() -> MetricsStore<Cluster> {
        let generator = generator();
        MetricsStore::new(generator.headers(), generator)
    }

    fn cluster(name: &str, ns: &str, paused: bool) -> Cluster {
        serde_json::from_value(serde_json::json!({
            "metadata": {"name": name, "namespace": ns, "uid": format!("{}-uid", name)},
            "spec": {"paused": paused}
        }))
        .unwrap()
    }

    fn render(writer: &dyn MetricsWriter) -> String {
        let mut out = Vec::new();
        writer.write_all(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_empty_store_writes_headers_only() {
        assert_eq!(
            render(&store()),
            "# HELP capi_one One.\n# TYPE capi_one gauge\n# HELP capi_paused Paused.\n# TYPE capi_paused gauge\n"
        );
    }

    #[test]
    fn test_add_replaces_and_delete_removes() {
        let store = store();
        store.add(&cluster("a", "ns", false));
        store.add(&cluster("b", "ns", false));
        assert_eq!(store.len(), 2);

        store.add(&cluster("a", "ns", true));
        let text = render(&store);
        assert!(text.contains("capi_paused{namespace=\"ns\",cluster=\"a\",uid=\"a-uid\"} 1\n"));
        assert!(text.contains("capi_paused{namespace=\"ns\",cluster=\"b\",uid=\"b-uid\"} 0\n"));

        store.delete(&cluster("a", "ns", true).store_key());
        let text = render(&store);
        assert!(!text.contains("cluster=\"a\""));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_replace_drops_stale_objects() {
        let store = store();
        store.add(&cluster("a", "ns", false));
        store.replace(&[cluster("b", "ns", false), cluster("c", "ns", false)]);
        let text = render(&store);
        assert!(!text.contains("cluster=\"a\""));
        assert!(text.contains("cluster=\"b\""));
        assert!(text.contains("cluster=\"c\""));
    }

    #[test]
    fn test_render_is_idempotent() {
        let store = store();
        store.add(&cluster("a", "ns", false));
        store.add(&cluster("b", "ns", true));
        assert_eq!(render(&store), render(&store));
    }

    #[test]
    fn test_multi_store_writes_each_header_once() {
        let generator = generator();
        let first = Arc::new(MetricsStore::new(generator.headers(), generator.clone()));
        let second = Arc::new(MetricsStore::new(generator.headers(), generator));
        first.add(&cluster("a", "ns1", false));
        second.add(&cluster("b", "ns2", false));

        let writer = MultiStoreMetricsWriter::new(vec![first, second]);
        let text = render(&writer);
        assert_eq!(text.matches("# HELP capi_one").count(), 1);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "# HELP capi_one One.",
                "# TYPE capi_one gauge",
                "capi_one{namespace=\"ns1\",cluster=\"a\",uid=\"a-uid\"} 1",
                "capi_one{namespace=\"ns2\",cluster=\"b\",uid=\"b-uid\"} 1",
                "# HELP capi_paused Paused.",
                "# TYPE capi_paused gauge",
                "capi_paused{namespace=\"ns1\",cluster=\"a\",uid=\"a-uid\"} 0",
                "capi_paused{namespace=\"ns2\",cluster=\"b\",uid=\"b-uid\"} 0",
            ]
        );
    }
}
