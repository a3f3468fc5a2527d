use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;

use super::{Condition, KubeObject};

/// `clusters.cluster.x-k8s.io`
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Cluster {
    pub metadata: ObjectMeta,
    pub spec: ClusterSpec,
    pub status: ClusterStatus,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterSpec {
    pub paused: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterStatus {
    pub phase: Option<String>,
    pub conditions: Vec<Condition>,
    pub infrastructure_ready: bool,
    pub control_plane_ready: bool,
}

impl KubeObject for Cluster {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
