use thiserror::Error;

/// Errors raised while looking up the hosted zone of a custom domain.
/// Lookups are never retried; every variant is fatal to the build.
#[derive(Debug, Error)]
pub enum ZoneLookupError {
    #[error("No hosted zone found for domain '{domain}'")]
    NotFound { domain: String },

    #[error("Failed to list hosted zones for '{domain}'\n{reason}")]
    Request { domain: String, reason: String },
}

/// Errors raised while building a site topology or rendering it to templates.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    ZoneLookup(#[from] ZoneLookupError),

    #[error("Invalid domain {domain:?}\n{reason}")]
    InvalidDomain { domain: String, reason: String },

    #[error("Invalid bucket name {name:?}\n{reason}")]
    InvalidBucketName { name: String, reason: String },

    #[error("Invalid stack name {name:?}\nMust only consist of alphanumeric characters and hyphens, Must start with an alphabetical character, and cannot be longer than 128 characters.")]
    InvalidStackName { name: String },

    #[error("{0}")]
    InvalidRegion(String),

    #[error("Failed to serialize template\n{0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors raised while loading site settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse site settings\n{0}")]
    Parse(#[from] toml::de::Error),

    #[error("Site settings must provide a non-empty site_name")]
    MissingSiteName,
}
