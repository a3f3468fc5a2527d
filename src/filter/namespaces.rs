use crate::error::BuildError;

/// Which namespaces are watched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NamespaceScope {
    /// One cluster-wide watch.
    #[default]
    All,
    /// One watch per namespace, in configuration order.
    Explicit(Vec<String>),
}

impl NamespaceScope {
    /// Interprets a configured namespace list. An empty list, or a list that
    /// only contains the empty string, selects all namespaces.
    pub fn from_list(namespaces: &[String]) -> Result<Self, BuildError> {
        let trimmed: Vec<&str> = namespaces.iter().map(|ns| ns.trim()).collect();
        if trimmed.iter().all(|ns| ns.is_empty()) {
            return Ok(NamespaceScope::All);
        }
        if trimmed.iter().any(|ns| ns.is_empty()) {
            return Err(BuildError::ConflictingNamespaces(namespaces.to_vec()));
        }

        let mut explicit: Vec<String> = Vec::with_capacity(trimmed.len());
        for ns in trimmed {
            if !explicit.iter().any(|existing| existing == ns) {
                explicit.push(ns.to_string());
            }
        }
        Ok(NamespaceScope::Explicit(explicit))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, NamespaceScope::All)
    }
}

/// Builds the field selector excluding every namespace of the denylist, or
/// `None` when nothing is denied.
pub fn exclude_namespaces_field_selector(denylist: &[String]) -> Option<String> {
    let selectors: Vec<String> = denylist
        .iter()
        .map(|ns| ns.trim())
        .filter(|ns| !ns.is_empty())
        .map(|ns| format!("metadata.namespace!={}", ns))
        .collect();

    if selectors.is_empty() {
        None
    } else {
        Some(selectors.join(","))
    }
}
