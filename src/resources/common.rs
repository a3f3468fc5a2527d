//! Family building blocks shared by several kinds.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::filter::create_label_keys_values;
use crate::generator::Metric;
use crate::models::Condition;

const CONDITION_STATUSES: [&str; 3] = ["True", "False", "Unknown"];
const NONE: &str = "<none>";

pub(crate) const LABELS_HELP: &str = "Kubernetes labels converted to Prometheus labels.";
pub(crate) const CREATED_HELP: &str = "Unix creation timestamp";

pub(crate) fn bool_float64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// One sample with value 1 carrying the allowed object labels.
pub(crate) fn labels_metric(meta: &ObjectMeta, allowed: &[String]) -> Vec<Metric> {
    let (label_keys, label_values) = create_label_keys_values(meta.labels.as_ref(), allowed);
    vec![Metric {
        label_keys,
        label_values,
        value: 1.0,
        timestamp_ms: None,
    }]
}

/// The creation time in unix seconds, or nothing when unset.
pub(crate) fn created_metric(meta: &ObjectMeta) -> Vec<Metric> {
    meta.creation_timestamp
        .iter()
        .map(|t| Metric::value(t.0.timestamp() as f64))
        .collect()
}

/// One sample per entry of `phases`, 1 for the current one. An unset or
/// empty phase produces nothing.
pub(crate) fn phase_metrics(phase: Option<&str>, phases: &[&str]) -> Vec<Metric> {
    match phase {
        Some(current) if !current.is_empty() => phases
            .iter()
            .map(|p| Metric::with_labels([("phase", *p)], bool_float64(*p == current)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Three samples per condition, one for each possible status.
pub(crate) fn condition_metrics(conditions: &[Condition]) -> Vec<Metric> {
    conditions
        .iter()
        .flat_map(|c| {
            CONDITION_STATUSES.iter().map(move |status| {
                Metric::with_labels(
                    [
                        ("condition", c.type_.clone()),
                        ("status", status.to_lowercase()),
                    ],
                    bool_float64(c.status.eq_ignore_ascii_case(status)),
                )
            })
        })
        .collect()
}

/// One sample per owner reference, or a single `<none>` sample.
pub(crate) fn owner_metrics(owners: Option<&Vec<OwnerReference>>) -> Vec<Metric> {
    let keys = ["owner_kind", "owner_name", "owner_is_controller"];
    match owners {
        Some(owners) if !owners.is_empty() => owners
            .iter()
            .map(|owner| {
                let controller = owner.controller.unwrap_or(false).to_string();
                Metric::with_labels(
                    keys.into_iter()
                        .zip([owner.kind.clone(), owner.name.clone(), controller]),
                    1.0,
                )
            })
            .collect(),
        _ => vec![Metric::with_labels(keys.into_iter().zip([NONE; 3]), 1.0)],
    }
}

/// A single sample for a present value.
pub(crate) fn optional_value(value: Option<i32>) -> Vec<Metric> {
    value.map(|v| Metric::value(v as f64)).into_iter().collect()
}

/// Resolves an int-or-percent against `total`. Percentages round up when
/// `round_up` is set and down otherwise. Returns `None` for strings that are
/// not a percentage.
pub(crate) fn scaled_int_or_percent(value: &IntOrString, total: i32, round_up: bool) -> Option<i32> {
    match value {
        IntOrString::Int(v) => Some(*v),
        IntOrString::String(s) => {
            let percent: i64 = s.strip_suffix('%')?.trim().parse().ok()?;
            let scaled = percent * i64::from(total);
            let value = if round_up {
                (scaled + 99).div_euclid(100)
            } else {
                scaled.div_euclid(100)
            };
            i32::try_from(value).ok()
        }
    }
}

/// The sample of a rolling update bound, present only when both the bound
/// and the desired replica count are set.
pub(crate) fn rolling_update_metric(
    value: Option<&IntOrString>,
    replicas: Option<i32>,
    round_up: bool,
) -> Vec<Metric> {
    let (Some(value), Some(replicas)) = (value, replicas) else {
        return Vec::new();
    };
    scaled_int_or_percent(value, replicas, round_up)
        .map(|v| Metric::value(v as f64))
        .into_iter()
        .collect()
}
