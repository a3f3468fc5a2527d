use std::collections::{BTreeMap, HashMap};

/// Allows every key of a resource. Expensive: each object label becomes a
/// series label on every scrape.
pub const LABEL_WILDCARD: &str = "*";

/// Per-resource (plural name) list of Kubernetes label or annotation keys
/// that may be turned into Prometheus labels.
pub type LabelsAllowList = HashMap<String, Vec<String>>;

/// Returns the `label_*` keys and values for the allowed subset of `labels`,
/// sorted by the original key.
pub fn create_label_keys_values(
    labels: Option<&BTreeMap<String, String>>,
    allowed: &[String],
) -> (Vec<String>, Vec<String>) {
    create_prometheus_keys_values("label", labels, allowed)
}

pub(crate) fn create_prometheus_keys_values(
    prefix: &str,
    data: Option<&BTreeMap<String, String>>,
    allowed: &[String],
) -> (Vec<String>, Vec<String>) {
    let Some(data) = data else {
        return (Vec::new(), Vec::new());
    };
    let wildcard = allowed.first().is_some_and(|k| k == LABEL_WILDCARD);

    let selected: Vec<(String, &String)> = data
        .iter()
        .filter(|(key, _)| wildcard || allowed.iter().any(|a| a == *key))
        .map(|(key, value)| (format!("{}_{}", prefix, sanitize_label_name(key)), value))
        .collect();

    // Keys colliding after sanitising get `_conflictN` suffixes, numbered in
    // original key order.
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for (name, _) in &selected {
        *occurrences.entry(name.as_str()).or_default() += 1;
    }
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut keys = Vec::with_capacity(selected.len());
    let mut values = Vec::with_capacity(selected.len());
    for (name, value) in &selected {
        if occurrences[name.as_str()] > 1 {
            let n = seen.entry(name.as_str()).or_default();
            *n += 1;
            keys.push(format!("{}_conflict{}", name, n));
        } else {
            keys.push(name.clone());
        }
        values.push((*value).clone());
    }
    (keys, values)
}

/// Replaces every character that is not valid in a Prometheus label name.
pub fn sanitize_label_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("app.kubernetes.io/name".to_string(), "web".to_string()),
            ("team".to_string(), "infra".to_string()),
        ])
    }

    #[test]
    fn test_only_allowed_keys_are_kept() {
        let (keys, values) = create_label_keys_values(Some(&labels()), &["team".to_string()]);
        assert_eq!(keys, vec!["label_team"]);
        assert_eq!(values, vec!["infra"]);
    }

    #[test]
    fn test_wildcard_keeps_everything_sanitized() {
        let (keys, values) =
            create_label_keys_values(Some(&labels()), &[LABEL_WILDCARD.to_string()]);
        assert_eq!(keys, vec!["label_app_kubernetes_io_name", "label_team"]);
        assert_eq!(values, vec!["web", "infra"]);
    }

    #[test]
    fn test_keys_colliding_after_sanitizing_stay_distinct() {
        let labels = BTreeMap::from([
            ("app.kubernetes.io".to_string(), "x".to_string()),
            ("app_kubernetes_io".to_string(), "y".to_string()),
            ("team".to_string(), "infra".to_string()),
        ]);
        let (keys, values) = create_label_keys_values(Some(&labels), &[LABEL_WILDCARD.to_string()]);
        assert_eq!(
            keys,
            vec![
                "label_app_kubernetes_io_conflict1",
                "label_app_kubernetes_io_conflict2",
                "label_team"
            ]
        );
        assert_eq!(values, vec!["x", "y", "infra"]);

        let allowed = ["app.kubernetes.io".to_string(), "app_kubernetes_io".to_string()];
        let (keys, _) = create_label_keys_values(Some(&labels), &allowed);
        assert_eq!(
            keys,
            vec!["label_app_kubernetes_io_conflict1", "label_app_kubernetes_io_conflict2"]
        );
    }

    #[test]
    fn test_no_allow_list_means_no_labels() {
        let (keys, values) = create_label_keys_values(Some(&labels()), &[]);
        assert!(keys.is_empty());
        assert!(values.is_empty());

        let (keys, _) = create_label_keys_values(None, &[LABEL_WILDCARD.to_string()]);
        assert!(keys.is_empty());
    }
}
