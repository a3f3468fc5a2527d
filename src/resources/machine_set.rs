use super::common::{
    condition_metrics, created_metric, labels_metric, optional_value, owner_metrics,
    CREATED_HELP, LABELS_HELP,
};
use super::{api_resource, ResourceDescriptor, CLUSTER_API_GROUP, CLUSTER_API_VERSION};
use crate::generator::{FamilyGenerator, Metric, MetricType};
use crate::models::MachineSet;

pub fn descriptor() -> ResourceDescriptor<MachineSet> {
    ResourceDescriptor::new(
        "machinesets",
        "machineset",
        api_resource(CLUSTER_API_GROUP, CLUSTER_API_VERSION, "MachineSet", "machinesets"),
        metric_families,
    )
}

fn metric_families(allow_labels: &[String]) -> Vec<FamilyGenerator<MachineSet>> {
    let allow_labels = allow_labels.to_vec();
    vec![
        FamilyGenerator::new(
            "capi_machineset_labels",
            LABELS_HELP,
            MetricType::Gauge,
            move |ms: &MachineSet| labels_metric(&ms.metadata, &allow_labels),
        ),
        FamilyGenerator::new(
            "capi_machineset_created",
            CREATED_HELP,
            MetricType::Gauge,
            |ms: &MachineSet| created_metric(&ms.metadata),
        ),
        FamilyGenerator::new(
            "capi_machineset_spec_replicas",
            "Number of desired replicas for a machineset.",
            MetricType::Gauge,
            |ms: &MachineSet| optional_value(ms.spec.replicas),
        ),
        FamilyGenerator::new(
            "capi_machineset_status_replicas",
            "The number of replicas per machineset.",
            MetricType::Gauge,
            |ms: &MachineSet| vec![Metric::value(ms.status.replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machineset_status_replicas_available",
            "The number of available replicas per machineset.",
            MetricType::Gauge,
            |ms: &MachineSet| vec![Metric::value(ms.status.available_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machineset_status_replicas_fully_labeled",
            "The number of fully labeled replicas per machineset.",
            MetricType::Gauge,
            |ms: &MachineSet| vec![Metric::value(ms.status.fully_labeled_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machineset_status_replicas_ready",
            "The number of ready replicas per machineset.",
            MetricType::Gauge,
            |ms: &MachineSet| vec![Metric::value(ms.status.ready_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_machineset_status_condition",
            "The current status conditions of a machineset.",
            MetricType::Gauge,
            |ms: &MachineSet| condition_metrics(&ms.status.conditions),
        ),
        FamilyGenerator::new(
            "capi_machineset_owner",
            "Information about the machineset's owner.",
            MetricType::Gauge,
            |ms: &MachineSet| owner_metrics(ms.metadata.owner_references.as_ref()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::common::testing::{decode, render, samples};
    use serde_json::json;

    #[test]
    fn test_machine_set_replicas() {
        let ms: MachineSet = decode(json!({
            "metadata": {"name": "ms1", "namespace": "ns1", "uid": "u1"},
            "spec": {"replicas": 2},
            "status": {"replicas": 2, "fullyLabeledReplicas": 2, "readyReplicas": 1}
        }));
        let text = render(&descriptor(), &[ms]);
        let prefix = r#"namespace="ns1",machineset="ms1",uid="u1""#;

        assert_eq!(
            samples(&text, "capi_machineset_spec_replicas"),
            vec![format!("capi_machineset_spec_replicas{{{}}} 2", prefix)]
        );
        assert_eq!(
            samples(&text, "capi_machineset_status_replicas_fully_labeled"),
            vec![format!("capi_machineset_status_replicas_fully_labeled{{{}}} 2", prefix)]
        );
        assert_eq!(
            samples(&text, "capi_machineset_status_replicas_ready"),
            vec![format!("capi_machineset_status_replicas_ready{{{}}} 1", prefix)]
        );
        assert_eq!(
            samples(&text, "capi_machineset_status_replicas_available"),
            vec![format!("capi_machineset_status_replicas_available{{{}}} 0", prefix)]
        );
    }

    #[test]
    fn test_every_sample_starts_with_identity_labels() {
        let objs: Vec<MachineSet> = (0..3)
            .map(|i| {
                decode(json!({
                    "metadata": {"name": format!("ms{}", i), "namespace": "ns1", "uid": format!("u{}", i)}
                }))
            })
            .collect();
        let text = render(&descriptor(), &objs);

        for line in text.lines().filter(|l| !l.starts_with('#')) {
            let labels = &line[line.find('{').unwrap() + 1..];
            assert!(labels.starts_with("namespace=\"ns1\",machineset=\"ms"), "{}", line);
            assert!(labels.contains(",uid=\"u"), "{}", line);
        }
    }
}
