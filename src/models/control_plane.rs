use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use serde::Deserialize;

use super::{Condition, KubeObject};

/// `kubeadmcontrolplanes.controlplane.cluster.x-k8s.io`
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct KubeadmControlPlane {
    pub metadata: ObjectMeta,
    pub spec: KubeadmControlPlaneSpec,
    pub status: KubeadmControlPlaneStatus,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct KubeadmControlPlaneSpec {
    pub replicas: Option<i32>,
    pub version: String,
    pub rollout_strategy: Option<KubeadmControlPlaneRolloutStrategy>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct KubeadmControlPlaneRolloutStrategy {
    pub rolling_update: Option<RollingUpdate>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RollingUpdate {
    pub max_surge: Option<IntOrString>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct KubeadmControlPlaneStatus {
    pub replicas: i32,
    pub ready_replicas: i32,
    pub unavailable_replicas: i32,
    pub updated_replicas: i32,
    pub initialized: bool,
    pub ready: bool,
    pub conditions: Vec<Condition>,
}

impl KubeObject for KubeadmControlPlane {
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
}
