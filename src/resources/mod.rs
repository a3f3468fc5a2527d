//! The Cluster API kinds this exporter can watch and the metric families
//! each of them produces.

pub mod cluster;
pub(crate) mod common;
pub mod descriptor;
pub mod kubeadm_control_plane;
pub mod machine;
pub mod machine_deployment;
pub mod machine_set;

pub use descriptor::{api_resource, GeneratorFactory, Registry, Resource, ResourceDescriptor};

pub const CLUSTER_API_GROUP: &str = "cluster.x-k8s.io";
pub const CONTROL_PLANE_API_GROUP: &str = "controlplane.cluster.x-k8s.io";
pub const CLUSTER_API_VERSION: &str = "v1beta1";
