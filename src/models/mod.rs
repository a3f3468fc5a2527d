//! Typed views of the watched Cluster API objects.
//!
//! Only the fields that feed a metric family are modelled; everything else in
//! the object is ignored during decoding.

mod cluster;
mod control_plane;
mod machine;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub use cluster::{Cluster, ClusterSpec, ClusterStatus};
pub use control_plane::{
    KubeadmControlPlane, KubeadmControlPlaneRolloutStrategy, KubeadmControlPlaneSpec,
    KubeadmControlPlaneStatus, RollingUpdate,
};
pub use machine::{
    Machine, MachineAddress, MachineDeployment, MachineDeploymentSpec, MachineDeploymentStatus,
    MachineDeploymentStrategy, MachineRollingUpdateDeployment, MachineSet, MachineSetSpec,
    MachineSetStatus, MachineSpec, MachineStatus, NodeReference,
};

/// An object that can be decoded from a watch event and carries standard
/// Kubernetes metadata.
pub trait KubeObject: DeserializeOwned + Send + Sync + 'static {
    fn metadata(&self) -> &ObjectMeta;

    /// Key under which the object is stored.
    fn store_key(&self) -> String {
        store_key(self.metadata())
    }
}

/// The uid of an object, or `namespace/name` when it has none.
pub fn store_key(meta: &ObjectMeta) -> String {
    match meta.uid.as_deref() {
        Some(uid) if !uid.is_empty() => uid.to_string(),
        _ => format!(
            "{}/{}",
            meta.namespace.as_deref().unwrap_or_default(),
            meta.name.as_deref().unwrap_or_default()
        ),
    }
}

/// A Cluster API status condition.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    /// "True", "False" or "Unknown".
    pub status: String,
    pub reason: Option<String>,
    pub message: Option<String>,
}
