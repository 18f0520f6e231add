//! Shared domain types and configuration for InboxIntel.
//!
//! Holds the campaign input model (and its validation), the scoring policy
//! that parameterizes the engine, and application configuration loaded from
//! the environment.

pub mod app_config;
pub mod campaigns;
pub mod config;
pub mod policy;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use campaigns::{load_campaigns, Campaign, CampaignsFile, Category, RawCampaign};
pub use config::{load_app_config, load_app_config_from_env};
pub use policy::{
    load_policy, CategoryPriors, InsightPolicy, OverallWeights, PerformanceWeights, ScoringPolicy,
    StatsPolicy, UrgencyWeights,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read {path}: {source}")]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// A malformed or missing field on a campaign (or report) input.
///
/// `field` uses the external contract name, e.g. `sentAt` or `ctaCount`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
