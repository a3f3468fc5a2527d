use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Deserialize;

use super::{Condition, KubeObject};

/// `machines.cluster.x-k8s.io`
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Machine {
    pub metadata: ObjectMeta,
    pub spec: MachineSpec,
    pub status: MachineStatus,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineSpec {
    pub cluster_name: String,
    #[serde(rename = "providerID")]
    pub provider_id: Option<String>,
    pub failure_domain: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineStatus {
    pub node_ref: Option<NodeReference>,
    /// Kubernetes version reported by the node.
    pub version: Option<String>,
    pub phase: Option<String>,
    pub addresses: Vec<MachineAddress>,
    pub conditions: Vec<Condition>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct NodeReference {
    pub kind: Option<String>,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct MachineAddress {
    #[serde(rename = "type")]
    pub type_: String,
    pub address: String,
}

impl KubeObject for Machine {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// `machinedeployments.cluster.x-k8s.io`
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct MachineDeployment {
    pub metadata: ObjectMeta,
    pub spec: MachineDeploymentSpec,
    pub status: MachineDeploymentStatus,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineDeploymentSpec {
    pub replicas: Option<i32>,
    pub paused: bool,
    pub strategy: Option<MachineDeploymentStrategy>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineDeploymentStrategy {
    pub rolling_update: Option<MachineRollingUpdateDeployment>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineRollingUpdateDeployment {
    pub max_surge: Option<IntOrString>,
    pub max_unavailable: Option<IntOrString>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineDeploymentStatus {
    pub replicas: i32,
    pub updated_replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub unavailable_replicas: i32,
    pub phase: Option<String>,
    pub conditions: Vec<Condition>,
}

impl KubeObject for MachineDeployment {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}

/// `machinesets.cluster.x-k8s.io`
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct MachineSet {
    pub metadata: ObjectMeta,
    pub spec: MachineSetSpec,
    pub status: MachineSetStatus,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineSetSpec {
    pub replicas: Option<i32>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MachineSetStatus {
    pub replicas: i32,
    pub fully_labeled_replicas: i32,
    pub ready_replicas: i32,
    pub available_replicas: i32,
    pub conditions: Vec<Condition>,
}

impl KubeObject for MachineSet {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
