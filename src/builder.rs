//! Wires enabled resources into stores, watch tasks and render handles.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::info;

use crate::error::BuildError;
use crate::filter::{exclude_namespaces_field_selector, AllowDenyList, LabelsAllowList, NamespaceScope};
use crate::generator::{extract_headers, filter_families, ComposedGenerator};
use crate::models::KubeObject;
use crate::resources::{Registry, Resource, ResourceDescriptor};
use crate::store::watch::WatchTask;
use crate::store::{MetricsStore, MetricsWriter, MultiStoreMetricsWriter, WatchClient, WatchParams};
use crate::telemetry::Telemetry;

/// Render handles in resource order plus the watch tasks feeding them.
pub struct BuiltStores {
    pub writers: Vec<Arc<dyn MetricsWriter>>,
    pub tasks: JoinSet<()>,
}

/// Collects the store configuration, then starts everything in [`Builder::build`].
pub struct Builder {
    registry: Arc<Registry>,
    client: Arc<dyn WatchClient>,
    enabled_resources: Vec<String>,
    namespaces: NamespaceScope,
    namespace_filter: Option<String>,
    allow_deny_list: Option<AllowDenyList>,
    allow_labels: LabelsAllowList,
    allow_annotations: LabelsAllowList,
    use_apiserver_cache: bool,
    telemetry: Telemetry,
}

impl Builder {
    pub fn new(registry: Arc<Registry>, client: Arc<dyn WatchClient>) -> Self {
        Builder {
            registry,
            client,
            enabled_resources: Vec::new(),
            namespaces: NamespaceScope::All,
            namespace_filter: None,
            allow_deny_list: None,
            allow_labels: HashMap::new(),
            allow_annotations: HashMap::new(),
            use_apiserver_cache: false,
            telemetry: Telemetry::new(),
        }
    }

    /// Validates the resource names against the registry. Build order is
    /// sorted and duplicates are dropped.
    pub fn with_enabled_resources(mut self, resources: &[String]) -> Result<Self, BuildError> {
        for name in resources {
            if !self.registry.contains(name) {
                return Err(BuildError::UnknownResource {
                    name: name.clone(),
                    available: self.registry.names().join(","),
                });
            }
        }

        let mut enabled = resources.to_vec();
        enabled.sort();
        enabled.dedup();
        self.enabled_resources = enabled;
        Ok(self)
    }

    /// Sets the watched namespaces and the namespaces excluded from every watch.
    pub fn with_namespaces(mut self, namespaces: NamespaceScope, denylist: &[String]) -> Self {
        self.namespaces = namespaces;
        self.namespace_filter = exclude_namespaces_field_selector(denylist);
        self
    }

    pub fn with_allow_deny_list(mut self, list: AllowDenyList) -> Self {
        self.allow_deny_list = Some(list);
        self
    }

    /// Object label keys turned into `label_*` labels, per resource.
    pub fn with_allow_labels(mut self, labels: LabelsAllowList) -> Self {
        self.allow_labels = labels;
        self
    }

    /// No family emits annotations yet; the list is only kept and reported.
    pub fn with_allow_annotations(mut self, annotations: LabelsAllowList) -> Self {
        self.allow_annotations = annotations;
        self
    }

    pub fn with_apiserver_cache(mut self, enabled: bool) -> Self {
        self.use_apiserver_cache = enabled;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Creates one store per resource and namespace, starts their watch tasks
    /// and returns the render handles in resource order. Tasks stop once
    /// `shutdown` turns `true`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(&self, shutdown: watch::Receiver<bool>) -> Result<BuiltStores, BuildError> {
        let allow_deny = self
            .allow_deny_list
            .as_ref()
            .ok_or(BuildError::MissingAllowDenyList)?;

        let resources = self
            .enabled_resources
            .iter()
            .map(|name| {
                self.registry
                    .get(name)
                    .ok_or_else(|| BuildError::UnknownResource {
                        name: name.clone(),
                        available: self.registry.names().join(","),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        check_unique_families(&resources)?;

        let mut tasks = JoinSet::new();
        let mut ctx = StoreContext {
            client: self.client.as_ref(),
            allow_deny,
            allow_labels: &self.allow_labels,
            namespaces: &self.namespaces,
            namespace_filter: self.namespace_filter.as_deref(),
            use_apiserver_cache: self.use_apiserver_cache,
            telemetry: &self.telemetry,
            shutdown: &shutdown,
            tasks: &mut tasks,
        };
        let writers: Vec<Arc<dyn MetricsWriter>> =
            resources.iter().map(|r| r.build_stores(&mut ctx)).collect();

        info!(
            event_name = "builder.stores.built",
            event_domain = "builder",
            namespaces = ?self.namespaces,
            annotation_allowlists = self.allow_annotations.len(),
            "Active resources: {}",
            self.enabled_resources.join(",")
        );

        Ok(BuiltStores { writers, tasks })
    }
}

fn check_unique_families(resources: &[&dyn Resource]) -> Result<(), BuildError> {
    let mut owners: HashMap<String, &'static str> = HashMap::new();
    for resource in resources {
        for family in resource.family_names() {
            if let Some(first) = owners.insert(family.clone(), resource.name()) {
                return Err(BuildError::DuplicateFamily {
                    family,
                    first: first.to_string(),
                    second: resource.name().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Everything needed to start the stores of one resource.
pub struct StoreContext<'a> {
    client: &'a dyn WatchClient,
    allow_deny: &'a AllowDenyList,
    allow_labels: &'a LabelsAllowList,
    namespaces: &'a NamespaceScope,
    namespace_filter: Option<&'a str>,
    use_apiserver_cache: bool,
    telemetry: &'a Telemetry,
    shutdown: &'a watch::Receiver<bool>,
    tasks: &'a mut JoinSet<()>,
}

impl<'a> StoreContext<'a> {
    pub(crate) fn build_stores<K: KubeObject>(
        &mut self,
        descriptor: &ResourceDescriptor<K>,
    ) -> Arc<dyn MetricsWriter> {
        let allow_labels = self
            .allow_labels
            .get(descriptor.name())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let families = filter_families(self.allow_deny, descriptor.metric_families(allow_labels));
        let headers = extract_headers(&families);
        let generator = Arc::new(ComposedGenerator::new(descriptor.identity_label(), families));

        let scope: &'a NamespaceScope = self.namespaces;
        let namespaces = match scope {
            NamespaceScope::All => {
                return self.start_store(descriptor, None, headers, generator);
            }
            NamespaceScope::Explicit(namespaces) => namespaces,
        };

        let mut stores: Vec<Arc<MetricsStore<K>>> = namespaces
            .iter()
            .map(|ns| {
                self.start_store(descriptor, Some(ns.as_str()), headers.clone(), generator.clone())
            })
            .collect();
        if stores.len() == 1 {
            if let Some(store) = stores.pop() {
                return store;
            }
        }
        Arc::new(MultiStoreMetricsWriter::new(stores))
    }

    fn start_store<K: KubeObject>(
        &mut self,
        descriptor: &ResourceDescriptor<K>,
        namespace: Option<&str>,
        headers: Vec<String>,
        generator: Arc<ComposedGenerator<K>>,
    ) -> Arc<MetricsStore<K>> {
        let store = Arc::new(MetricsStore::new(headers, generator));
        let params = WatchParams {
            namespace: namespace.map(str::to_string),
            field_selector: self.namespace_filter.map(str::to_string),
            use_apiserver_cache: self.use_apiserver_cache,
        };
        let stream = descriptor.list_watch(self.client, &params);
        let task = WatchTask::new(
            descriptor.name(),
            namespace,
            store.clone(),
            self.telemetry.clone(),
        );
        self.tasks.spawn(task.run(stream, self.shutdown.clone()));
        store
    }
}
