//! Build-time filters: which families, which object labels and which
//! namespaces end up in the exposition.

mod allow_deny;
mod labels;
mod namespaces;

pub use allow_deny::AllowDenyList;
pub use labels::{
    create_label_keys_values, sanitize_label_name, LabelsAllowList, LABEL_WILDCARD,
};
pub use namespaces::{exclude_namespaces_field_selector, NamespaceScope};
