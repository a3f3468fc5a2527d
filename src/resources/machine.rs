use super::common::{
    condition_metrics, created_metric, labels_metric, owner_metrics, phase_metrics, CREATED_HELP,
    LABELS_HELP,
};
use super::{api_resource, ResourceDescriptor, CLUSTER_API_GROUP, CLUSTER_API_VERSION};
use crate::generator::{FamilyGenerator, Metric, MetricType};
use crate::models::Machine;

pub const MACHINE_PHASES: [&str; 8] = [
    "Pending",
    "Provisioning",
    "Provisioned",
    "Running",
    "Deleting",
    "Deleted",
    "Failed",
    "Unknown",
];

pub fn descriptor() -> ResourceDescriptor<Machine> {
    ResourceDescriptor::new(
        "machines",
        "machine",
        api_resource(CLUSTER_API_GROUP, CLUSTER_API_VERSION, "Machine", "machines"),
        metric_families,
    )
}

fn metric_families(allow_labels: &[String]) -> Vec<FamilyGenerator<Machine>> {
    let allow_labels = allow_labels.to_vec();
    vec![
        FamilyGenerator::new(
            "capi_machine_labels",
            LABELS_HELP,
            MetricType::Gauge,
            move |m: &Machine| labels_metric(&m.metadata, &allow_labels),
        ),
        FamilyGenerator::new(
            "capi_machine_created",
            CREATED_HELP,
            MetricType::Gauge,
            |m: &Machine| created_metric(&m.metadata),
        ),
        FamilyGenerator::new(
            "capi_machine_status_phase",
            "The machines current phase.",
            MetricType::Gauge,
            |m: &Machine| phase_metrics(m.status.phase.as_deref(), &MACHINE_PHASES),
        ),
        FamilyGenerator::new(
            "capi_machine_status_condition",
            "The current status conditions of a machine.",
            MetricType::Gauge,
            |m: &Machine| condition_metrics(&m.status.conditions),
        ),
        FamilyGenerator::new(
            "capi_machine_owner",
            "Information about the machine's owner.",
            MetricType::Gauge,
            |m: &Machine| owner_metrics(m.metadata.owner_references.as_ref()),
        ),
        FamilyGenerator::new(
            "capi_machine_status_noderef",
            "Information about the machine's node reference.",
            MetricType::Gauge,
            |m: &Machine| {
                m.status
                    .node_ref
                    .iter()
                    .map(|node| Metric::with_labels([("name", node.name.as_str())], 1.0))
                    .collect()
            },
        ),
        FamilyGenerator::new(
            "capi_machine_info",
            "Information about a machine.",
            MetricType::Gauge,
            info_metric,
        ),
    ]
}

/// Optional fields only appear as labels when set; `version` is the one the
/// node runs, not the desired one. `internal_ip` is always present and holds
/// the last `InternalIP` address.
fn info_metric(m: &Machine) -> Vec<Metric> {
    let mut labels: Vec<(&str, &str)> = Vec::with_capacity(4);
    if let Some(version) = m.status.version.as_deref() {
        labels.push(("version", version));
    }
    if let Some(provider_id) = m.spec.provider_id.as_deref() {
        labels.push(("provider_id", provider_id));
    }
    if let Some(failure_domain) = m.spec.failure_domain.as_deref() {
        labels.push(("failure_domain", failure_domain));
    }
    let internal_ip = m
        .status
        .addresses
        .iter()
        .rev()
        .find(|a| a.type_ == "InternalIP")
        .map(|a| a.address.as_str())
        .unwrap_or_default();
    labels.push(("internal_ip", internal_ip));

    vec![Metric::with_labels(labels, 1.0)]
}
