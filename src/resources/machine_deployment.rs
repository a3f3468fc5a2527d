use super::common::{
    bool_float64, condition_metrics, created_metric, labels_metric, optional_value,
    owner_metrics, phase_metrics, rolling_update_metric, CREATED_HELP, LABELS_HELP,
};
use super::{api_resource, ResourceDescriptor, CLUSTER_API_GROUP, CLUSTER_API_VERSION};
use crate::generator::{FamilyGenerator, Metric, MetricType};
use crate::models::{MachineDeployment, MachineRollingUpdateDeployment};

pub const MACHINE_DEPLOYMENT_PHASES: [&str; 5] =
    ["ScalingUp", "ScalingDown", "Running", "Failed", "Unknown"];

pub fn descriptor() -> ResourceDescriptor<MachineDeployment> {
    ResourceDescriptor::new(
        "machinedeployments",
        "machinedeployment",
        api_resource(
            CLUSTER_API_GROUP,
            CLUSTER_API_VERSION,
            "MachineDeployment",
            "machinedeployments",
        ),
        metric_families,
    )
}

fn rolling_update(md: &MachineDeployment) -> Option<&MachineRollingUpdateDeployment> {
    md.spec.strategy.as_ref()?.rolling_update.as_ref()
}

fn metric_families(allow_labels: &[String]) -> Vec<FamilyGenerator<MachineDeployment>> {
    let allow_labels = allow_labels.to_vec();
    vec![
        FamilyGenerator::new(
            "capi_machinedeployment_labels",
            LABELS_HELP,
            MetricType::Gauge,
            move |md: &MachineDeployment| labels_metric(&md.metadata, &allow_labels),
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_created",
            CREATED_HELP,
            MetricType::Gauge,
            |md: &MachineDeployment| created_metric(&md.metadata),
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_spec_paused",
            "Whether the machinedeployment is paused and will not be processed by the machinedeployment controller.",
            MetricType::Gauge,
            |md: &MachineDeployment| vec![Metric::value(bool_float64(md.spec.paused))],
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_spec_replicas",
            "Number of desired replicas for a machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| optional_value(md.spec.replicas),
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_spec_strategy_rollingupdate_max_surge",
            "Maximum number of replicas that can be scheduled above the desired number of replicas during a rolling update of a machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| {
                let max_surge = rolling_update(md).and_then(|r| r.max_surge.as_ref());
                rolling_update_metric(max_surge, md.spec.replicas, true)
            },
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_spec_strategy_rollingupdate_max_unavailable",
            "Maximum number of unavailable replicas during a rolling update of a machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| {
                let max_unavailable = rolling_update(md).and_then(|r| r.max_unavailable.as_ref());
                rolling_update_metric(max_unavailable, md.spec.replicas, false)
            },
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_status_phase",
            "The machinedeployments current phase.",
            MetricType::Gauge,
            |md: &MachineDeployment| {
                phase_metrics(md.status.phase.as_deref(), &MACHINE_DEPLOYMENT_PHASES)
            },
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_status_condition",
            "The current status conditions of a machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| condition_metrics(&md.status.conditions),
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_status_replicas",
            "The number of replicas per machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| vec![Metric::value(md.status.replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_status_replicas_available",
            "The number of available replicas per machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| vec![Metric::value(md.status.available_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_status_replicas_unavailable",
            "The number of unavailable replicas per machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| vec![Metric::value(md.status.unavailable_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_status_replicas_updated",
            "The number of updated replicas per machinedeployment.",
            MetricType::Gauge,
            |md: &MachineDeployment| vec![Metric::value(md.status.updated_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machinedeployment_owner",
            "Information about the machinedeployment's owner.",
            MetricType::Gauge,
            |md: &MachineDeployment| owner_metrics(md.metadata.owner_references.as_ref()),
        ),
    ]
}
