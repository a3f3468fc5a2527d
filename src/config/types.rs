use std::collections::HashMap;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use crate::resources::Registry;

/// Environment variable holding the path of the configuration file.
pub const CONFIG_PATH_ENV: &str = "CASM_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
/// Prefix of environment variables overriding file values, e.g.
/// `CASM_BIND_ADDRESS` or `CASM_LOGGING__LEVEL`.
pub const ENV_PREFIX: &str = "CASM_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ConfigV1 {
    /// Address serving the Cluster API metrics.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Address serving the exporter's own metrics. Disabled when unset.
    #[serde(default)]
    pub telemetry_address: Option<String>,
    /// Plural names of the watched resources. Defaults to all of them.
    #[serde(default = "default_resources")]
    pub resources: Vec<String>,
    /// Namespaces to watch. Empty watches all namespaces.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Namespaces excluded from every watch.
    #[serde(default)]
    pub namespaces_denylist: Vec<String>,
    /// Metric families to expose, as names or regular expressions.
    #[serde(default)]
    pub metric_allowlist: Vec<String>,
    /// Metric families to hide. Mutually exclusive with `metric_allowlist`.
    #[serde(default)]
    pub metric_denylist: Vec<String>,
    /// Per resource, the object labels exposed on the `*_labels` families.
    /// `["*"]` exposes every label.
    #[serde(default)]
    pub metric_labels_allowlist: HashMap<String, Vec<String>>,
    /// Per resource, the object annotations allowed as metric labels.
    #[serde(default)]
    pub metric_annotations_allowlist: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub enable_gzip_encoding: bool,
    /// List from the API server cache (`resourceVersion=0`).
    #[serde(default)]
    pub use_apiserver_cache: bool,
    /// Kubeconfig file; in-cluster or `$KUBECONFIG` configuration otherwise.
    #[serde(default)]
    pub kubeconfig: Option<String>,
    #[serde(default)]
    pub kube_context: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_resources() -> Vec<String> {
    Registry::default()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Loads the YAML file named by `CASM_CONFIG` (default `./config.yaml`),
/// then applies `CASM_` environment overrides.
pub fn load_config() -> Result<ConfigV1, figment::Error> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));
    extract_config(figment)
}

/// Extracts a versioned configuration from any figment.
pub fn extract_config(figment: Figment) -> Result<ConfigV1, figment::Error> {
    // handle configuration migration between versions here when necessary
    match figment.extract::<Config>()? {
        Config::ConfigV1(c) => Ok(c),
    }
}

/// Print the JSON schema for the configuration to stdout.
pub fn print_schema() -> Result<(), serde_json::Error> {
    let schema = schema_for!(Config);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_yaml(yaml: &str) -> Result<ConfigV1, figment::Error> {
        extract_config(Figment::new().merge(Yaml::string(yaml)))
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = from_yaml("version: 1.0.0\n").unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.telemetry_address, None);
        assert_eq!(config.resources.len(), 5);
        assert!(config.namespaces.is_empty());
        assert!(!config.enable_gzip_encoding);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_full_config() {
        let config = from_yaml(
            r#"
version: 1.0.0
bind_address: 127.0.0.1:9000
telemetry_address: 127.0.0.1:9001
resources: [clusters, machines]
namespaces: [team-a, team-b]
namespaces_denylist: [kube-system]
metric_denylist: ["capi_machine_info"]
metric_labels_allowlist:
  clusters: ["*"]
  machines: [cluster.x-k8s.io/cluster-name]
enable_gzip_encoding: true
use_apiserver_cache: true
kube_context: management
logging:
  level: debug
  format: console
"#,
        )
        .unwrap();

        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.telemetry_address.as_deref(), Some("127.0.0.1:9001"));
        assert_eq!(config.resources, vec!["clusters", "machines"]);
        assert_eq!(config.namespaces, vec!["team-a", "team-b"]);
        assert_eq!(config.metric_denylist, vec!["capi_machine_info"]);
        assert_eq!(config.metric_labels_allowlist["clusters"], vec!["*"]);
        assert!(config.enable_gzip_encoding);
        assert!(config.use_apiserver_cache);
        assert_eq!(config.kube_context.as_deref(), Some("management"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.service_name, "cluster-api-state-metrics");
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        assert!(from_yaml("version: 2.0.0\n").is_err());
        assert!(from_yaml("bind_address: 0.0.0.0:1\n").is_err());
    }
}
