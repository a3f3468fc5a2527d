use regex::Regex;

use crate::error::FilterError;

/// Decides which metric families are exposed.
///
/// Built from either an allowlist or a denylist, never both. Each entry is an
/// exact family name or a regular expression, matched against the whole name.
#[derive(Debug, Clone)]
pub struct AllowDenyList {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
    is_allow_list: bool,
}

impl AllowDenyList {
    /// Compiles the configured patterns. Empty inputs on both sides produce a
    /// list that includes everything.
    pub fn new(allow: &[String], deny: &[String]) -> Result<Self, FilterError> {
        if !allow.is_empty() && !deny.is_empty() {
            return Err(FilterError::AllowAndDenySet);
        }

        let is_allow_list = !allow.is_empty();
        let source = if is_allow_list { allow } else { deny };

        let mut patterns: Vec<String> = source
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        patterns.sort();
        patterns.dedup();

        let compiled = patterns
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
                    FilterError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AllowDenyList {
            patterns,
            compiled,
            is_allow_list,
        })
    }

    /// A list that excludes nothing.
    pub fn allow_all() -> Self {
        AllowDenyList {
            patterns: Vec::new(),
            compiled: Vec::new(),
            is_allow_list: false,
        }
    }

    pub fn is_included(&self, name: &str) -> bool {
        let matched = self.compiled.iter().any(|r| r.is_match(name));
        if self.is_allow_list {
            matched
        } else {
            !matched
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        !self.is_included(name)
    }

    /// Human readable summary for startup logs.
    pub fn status(&self) -> String {
        if self.is_allow_list {
            format!(
                "Including the following lists that were on allowlist: {:?}",
                self.patterns
            )
        } else {
            format!(
                "Excluding the following lists that were on denylist: {:?}",
                self.patterns
            )
        }
    }
}

impl Default for AllowDenyList {
    fn default() -> Self {
        Self::allow_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_both_lists_set_is_an_error() {
        let result = AllowDenyList::new(&strings(&["a"]), &strings(&["b"]));
        assert!(matches!(result, Err(FilterError::AllowAndDenySet)));
    }

    #[test]
    fn test_allow_list_exact_and_regex() {
        let list =
            AllowDenyList::new(&strings(&["capi_cluster_labels", "capi_machine_.*"]), &[]).unwrap();
        assert!(list.is_included("capi_cluster_labels"));
        assert!(list.is_included("capi_machine_info"));
        assert!(!list.is_included("capi_cluster_created"));
        // Patterns are anchored, a prefix match is not enough.
        assert!(!list.is_included("capi_cluster_labels_extra"));
    }

    #[test]
    fn test_deny_list() {
        let list = AllowDenyList::new(&[], &strings(&["capi_cluster_created"])).unwrap();
        assert!(list.is_excluded("capi_cluster_created"));
        assert!(list.is_included("capi_cluster_labels"));
    }

    #[test]
    fn test_empty_lists_include_everything() {
        let list = AllowDenyList::new(&[], &[]).unwrap();
        assert!(list.is_included("anything"));
        assert!(list.status().starts_with("Excluding"));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = AllowDenyList::new(&strings(&["capi_("]), &[]);
        assert!(matches!(result, Err(FilterError::InvalidPattern { .. })));
    }
}
