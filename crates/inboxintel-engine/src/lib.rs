//! Scoring and aggregation engine for competitor email campaigns.
//!
//! Scores each campaign for urgency and estimated performance, aggregates
//! brand-level statistics, selects evidence-backed insights, and assembles
//! an [`IntelligenceReport`]. Pure and deterministic: no I/O, no randomness.

pub mod error;
pub mod insights;
pub mod report;
pub mod scorer;
pub mod stats;
pub mod types;

mod signals;

pub use error::EngineError;
pub use insights::generate;
pub use report::build_report;
pub use scorer::score_campaign;
pub use stats::aggregate;
pub use types::{BrandStats, CampaignSignals, Insights, IntelligenceReport, ScoredCampaign};
