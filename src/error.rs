//! Configuration-time errors. Anything in here aborts startup; runtime
//! watch and render failures are logged instead.

use thiserror::Error;

/// Invalid metric or label filter configuration.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error(
        "allowlist and denylist are both set, they are mutually exclusive, only one of them can be set"
    )]
    AllowAndDenySet,

    #[error("invalid metric pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while assembling stores from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("resource {name} does not exist. Available resources: {available}")]
    UnknownResource { name: String, available: String },

    #[error("the all-namespaces selector cannot be combined with explicit namespaces: {0:?}")]
    ConflictingNamespaces(Vec<String>),

    #[error("an allow/deny list must be configured before building stores")]
    MissingAllowDenyList,

    #[error("metric family {family} is declared by both {first} and {second}")]
    DuplicateFamily {
        family: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Invalid service configuration outside of the store filters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}
