use std::collections::BTreeMap;
use std::sync::Arc;

use kube::api::{ApiResource, GroupVersionKind};
use tracing::warn;

use crate::builder::StoreContext;
use crate::generator::FamilyGenerator;
use crate::models::KubeObject;
use crate::store::{MetricsWriter, WatchClient, WatchParams, WatchStream};

/// Produces the family generators of a kind for a set of allowed label keys.
pub type GeneratorFactory<K> = fn(&[String]) -> Vec<FamilyGenerator<K>>;

/// Static definition of one watched kind.
pub struct ResourceDescriptor<K> {
    name: &'static str,
    identity_label: &'static str,
    api_resource: ApiResource,
    generators: GeneratorFactory<K>,
}

impl<K: KubeObject> ResourceDescriptor<K> {
    /// `name` is the plural resource name used in configuration,
    /// `identity_label` the label carrying the object name on every sample.
    pub fn new(
        name: &'static str,
        identity_label: &'static str,
        api_resource: ApiResource,
        generators: GeneratorFactory<K>,
    ) -> Self {
        ResourceDescriptor {
            name,
            identity_label,
            api_resource,
            generators,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn identity_label(&self) -> &'static str {
        self.identity_label
    }

    pub fn api_resource(&self) -> &ApiResource {
        &self.api_resource
    }

    pub fn metric_families(&self, allow_labels: &[String]) -> Vec<FamilyGenerator<K>> {
        (self.generators)(allow_labels)
    }

    /// Opens the list/watch stream of one partition.
    pub fn list_watch(&self, client: &dyn WatchClient, params: &WatchParams) -> WatchStream {
        client.watch(&self.api_resource, params)
    }
}

/// Builds an [`ApiResource`] for a custom resource.
pub fn api_resource(group: &str, version: &str, kind: &str, plural: &str) -> ApiResource {
    ApiResource::from_gvk_with_plural(&GroupVersionKind::gvk(group, version, kind), plural)
}

/// Type-erased view of a [`ResourceDescriptor`], so kinds with different
/// object types can live in one [`Registry`].
pub trait Resource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Every family name the kind can emit, before any filtering.
    fn family_names(&self) -> Vec<String>;

    /// Creates the kind's stores, starts their watch tasks and returns the
    /// handle rendering them.
    fn build_stores(&self, ctx: &mut StoreContext<'_>) -> Arc<dyn MetricsWriter>;
}

impl<K: KubeObject> Resource for ResourceDescriptor<K> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn family_names(&self) -> Vec<String> {
        self.metric_families(&[])
            .into_iter()
            .map(|g| g.name)
            .collect()
    }

    fn build_stores(&self, ctx: &mut StoreContext<'_>) -> Arc<dyn MetricsWriter> {
        ctx.build_stores(self)
    }
}

/// The kinds available for enabling, keyed by plural name.
pub struct Registry {
    resources: BTreeMap<&'static str, Box<dyn Resource>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Registry {
            resources: BTreeMap::new(),
        }
    }

    pub fn register<R: Resource + 'static>(&mut self, resource: R) {
        let name = resource.name();
        if self.resources.insert(name, Box::new(resource)).is_some() {
            warn!("Resource '{}' registered twice, keeping the last one", name);
        }
    }

    pub fn with<R: Resource + 'static>(mut self, resource: R) -> Self {
        self.register(resource);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Resource> {
        self.resources.get(name).map(|r| r.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }
}

/// Registers every Cluster API kind this exporter knows.
impl Default for Registry {
    fn default() -> Self {
        Registry::new()
            .with(super::cluster::descriptor())
            .with(super::kubeadm_control_plane::descriptor())
            .with(super::machine::descriptor())
            .with(super::machine_deployment::descriptor())
            .with(super::machine_set::descriptor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names_are_sorted() {
        assert_eq!(
            Registry::default().names(),
            vec![
                "clusters",
                "kubeadmcontrolplanes",
                "machinedeployments",
                "machines",
                "machinesets"
            ]
        );
    }

    #[test]
    fn test_family_names_are_unique_across_default_kinds() {
        let registry = Registry::default();
        let mut all: Vec<String> = registry
            .names()
            .into_iter()
            .flat_map(|name| registry.get(name).unwrap().family_names())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn test_api_resource() {
        let ar = api_resource("cluster.x-k8s.io", "v1beta1", "Cluster", "clusters");
        assert_eq!(ar.api_version, "cluster.x-k8s.io/v1beta1");
        assert_eq!(ar.plural, "clusters");
    }
}
