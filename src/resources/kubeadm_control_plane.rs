use super::common::{
    condition_metrics, created_metric, labels_metric, optional_value, owner_metrics,
    rolling_update_metric, CREATED_HELP, LABELS_HELP,
};
use super::{api_resource, ResourceDescriptor, CLUSTER_API_VERSION, CONTROL_PLANE_API_GROUP};
use crate::generator::{FamilyGenerator, Metric, MetricType};
use crate::models::KubeadmControlPlane;

pub fn descriptor() -> ResourceDescriptor<KubeadmControlPlane> {
    ResourceDescriptor::new(
        "kubeadmcontrolplanes",
        "kubeadmcontrolplane",
        api_resource(
            CONTROL_PLANE_API_GROUP,
            CLUSTER_API_VERSION,
            "KubeadmControlPlane",
            "kubeadmcontrolplanes",
        ),
        metric_families,
    )
}

fn metric_families(allow_labels: &[String]) -> Vec<FamilyGenerator<KubeadmControlPlane>> {
    let allow_labels = allow_labels.to_vec();
    vec![
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_labels",
            LABELS_HELP,
            MetricType::Gauge,
            move |kcp: &KubeadmControlPlane| labels_metric(&kcp.metadata, &allow_labels),
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_created",
            CREATED_HELP,
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| created_metric(&kcp.metadata),
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_status_replicas",
            "The number of replicas per kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| vec![Metric::value(kcp.status.replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_status_replicas_ready",
            "The number of ready replicas per kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| vec![Metric::value(kcp.status.ready_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_status_replicas_unavailable",
            "The number of unavailable replicas per kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| {
                vec![Metric::value(kcp.status.unavailable_replicas as f64)]
            },
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_status_replicas_updated",
            "The number of updated replicas per kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| vec![Metric::value(kcp.status.updated_replicas as f64)],
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_spec_replicas",
            "Number of desired replicas for a kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| optional_value(kcp.spec.replicas),
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_spec_strategy_rollingupdate_max_surge",
            "Maximum number of replicas that can be scheduled above the desired number of replicas during a rolling update of a kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| {
                let max_surge = kcp
                    .spec
                    .rollout_strategy
                    .as_ref()
                    .and_then(|s| s.rolling_update.as_ref())
                    .and_then(|r| r.max_surge.as_ref());
                rolling_update_metric(max_surge, kcp.spec.replicas, true)
            },
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_owner",
            "Information about the kubeadmcontrolplane's owner.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| owner_metrics(kcp.metadata.owner_references.as_ref()),
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_info",
            "Information about a kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| {
                vec![Metric::with_labels(
                    [("version", kcp.spec.version.as_str())],
                    1.0,
                )]
            },
        ),
        FamilyGenerator::new(
            "capi_kubeadmcontrolplane_status_condition",
            "The current status conditions of a kubeadmcontrolplane.",
            MetricType::Gauge,
            |kcp: &KubeadmControlPlane| condition_metrics(&kcp.status.conditions),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::common::testing::{decode, render, samples};
    use serde_json::json;

    const PREFIX: &str = r#"namespace="ns1",kubeadmcontrolplane="kcp1",uid="u1""#;

    #[test]
    fn test_replicas_and_max_surge() {
        let kcp: KubeadmControlPlane = decode(json!({
            "metadata": {"name": "kcp1", "namespace": "ns1", "uid": "u1"},
            "spec": {
                "replicas": 3,
                "version": "v1.29.2",
                "rolloutStrategy": {"rollingUpdate": {"maxSurge": "25%"}}
            },
            "status": {"replicas": 3, "readyReplicas": 2, "unavailableReplicas": 1}
        }));
        let text = render(&descriptor(), &[kcp]);

        assert_eq!(
            samples(&text, "capi_kubeadmcontrolplane_spec_replicas"),
            vec![format!("capi_kubeadmcontrolplane_spec_replicas{{{}}} 3", PREFIX)]
        );
        assert_eq!(
            samples(&text, "capi_kubeadmcontrolplane_spec_strategy_rollingupdate_max_surge"),
            vec![format!(
                "capi_kubeadmcontrolplane_spec_strategy_rollingupdate_max_surge{{{}}} 1",
                PREFIX
            )]
        );
        assert_eq!(
            samples(&text, "capi_kubeadmcontrolplane_status_replicas_ready"),
            vec![format!("capi_kubeadmcontrolplane_status_replicas_ready{{{}}} 2", PREFIX)]
        );
        assert_eq!(
            samples(&text, "capi_kubeadmcontrolplane_status_replicas_updated"),
            vec![format!("capi_kubeadmcontrolplane_status_replicas_updated{{{}}} 0", PREFIX)]
        );
        assert_eq!(
            samples(&text, "capi_kubeadmcontrolplane_info"),
            vec![format!(
                "capi_kubeadmcontrolplane_info{{{},version=\"v1.29.2\"}} 1",
                PREFIX
            )]
        );
        assert_eq!(
            samples(&text, "capi_kubeadmcontrolplane_owner"),
            vec![format!(
                "capi_kubeadmcontrolplane_owner{{{},owner_kind=\"<none>\",owner_name=\"<none>\",owner_is_controller=\"<none>\"}} 1",
                PREFIX
            )]
        );
    }

    #[test]
    fn test_unset_replicas_produce_no_spec_samples() {
        let kcp: KubeadmControlPlane = decode(json!({
            "metadata": {"name": "kcp1", "namespace": "ns1", "uid": "u1"},
            "spec": {"rolloutStrategy": {"rollingUpdate": {"maxSurge": 1}}}
        }));
        let text = render(&descriptor(), &[kcp]);

        assert!(samples(&text, "capi_kubeadmcontrolplane_spec_replicas").is_empty());
        assert!(
            samples(&text, "capi_kubeadmcontrolplane_spec_strategy_rollingupdate_max_surge")
                .is_empty()
        );
        assert!(samples(&text, "capi_kubeadmcontrolplane_created").is_empty());
    }

    #[test]
    fn test_invalid_max_surge_is_skipped() {
        let kcp: KubeadmControlPlane = decode(json!({
            "metadata": {"name": "kcp1", "namespace": "ns1", "uid": "u1"},
            "spec": {"replicas": 3, "rolloutStrategy": {"rollingUpdate": {"maxSurge": "lots"}}}
        }));
        let text = render(&descriptor(), &[kcp]);

        assert!(
            samples(&text, "capi_kubeadmcontrolplane_spec_strategy_rollingupdate_max_surge")
                .is_empty()
        );
        assert_eq!(samples(&text, "capi_kubeadmcontrolplane_spec_replicas").len(), 1);
    }
}
