use super::common::{
    condition_metrics, created_metric, labels_metric, phase_metrics, CREATED_HELP, LABELS_HELP,
};
use super::{api_resource, ResourceDescriptor, CLUSTER_API_GROUP, CLUSTER_API_VERSION};
use crate::generator::{FamilyGenerator, MetricType};
use crate::models::Cluster;

pub const CLUSTER_PHASES: [&str; 6] = [
    "Pending",
    "Provisioning",
    "Provisioned",
    "Deleting",
    "Failed",
    "Unknown",
];

pub fn descriptor() -> ResourceDescriptor<Cluster> {
    ResourceDescriptor::new(
        "clusters",
        "cluster",
        api_resource(CLUSTER_API_GROUP, CLUSTER_API_VERSION, "Cluster", "clusters"),
        metric_families,
    )
}

fn metric_families(allow_labels: &[String]) -> Vec<FamilyGenerator<Cluster>> {
    let allow_labels = allow_labels.to_vec();
    vec![
        FamilyGenerator::new(
            "capi_cluster_labels",
            LABELS_HELP,
            MetricType::Gauge,
            move |c: &Cluster| labels_metric(&c.metadata, &allow_labels),
        ),
        FamilyGenerator::new(
            "capi_cluster_created",
            CREATED_HELP,
            MetricType::Gauge,
            |c: &Cluster| created_metric(&c.metadata),
        ),
        FamilyGenerator::new(
            "capi_cluster_status_phase",
            "The clusters current phase.",
            MetricType::Gauge,
            |c: &Cluster| phase_metrics(c.status.phase.as_deref(), &CLUSTER_PHASES),
        ),
        FamilyGenerator::new(
            "capi_cluster_status_condition",
            "The current status conditions of a cluster.",
            MetricType::Gauge,
            |c: &Cluster| condition_metrics(&c.status.conditions),
        ),
    ]
}
