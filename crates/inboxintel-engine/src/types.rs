use inboxintel_core::Campaign;
use serde::{Deserialize, Serialize};

/// Text-derived signals extracted once per campaign and reused by the
/// aggregator and insight rules. Never serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CampaignSignals {
    /// Distinct urgency keywords found in subject and content.
    pub keyword_hits: u32,
    /// An explicit time, date, or countdown phrase was found.
    pub has_deadline: bool,
    /// An urgency glyph (fire, alarm clock, hourglass, ...) was found.
    pub has_urgency_emoji: bool,
    /// The subject contains at least one emoji.
    pub subject_has_emoji: bool,
    /// Subject words containing at least one letter or digit.
    pub subject_words: u32,
}

/// A campaign together with its computed scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCampaign {
    #[serde(flatten)]
    pub campaign: Campaign,
    /// Time-pressure and scarcity strength in `[0, 100]`.
    pub urgency_score: f64,
    /// Structural effectiveness estimate in `[0, 100]`.
    pub performance_score: f64,
    #[serde(skip)]
    pub signals: CampaignSignals,
}

/// Brand-level statistics over every campaign in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandStats {
    /// Campaigns per 7-day window.
    pub avg_frequency: f64,
    /// Hour bucket with the best mean performance, e.g. `"14:00"` (UTC).
    pub best_send_time: String,
    /// Weekday with the best mean performance, e.g. `"Tuesday"`.
    pub best_day: String,
    pub emoji_usage_rate: f64,
    /// Mean subject word count, rounded.
    pub avg_subject_length: u32,
    pub urgency_frequency: f64,
}

/// A generated insight. The rank only orders selection and is not exposed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Insight {
    pub text: String,
    pub rank: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    pub working: Vec<String>,
    pub opportunities: Vec<String>,
}

/// The complete intelligence report for one brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelligenceReport {
    pub brand: String,
    pub overall_score: f64,
    pub total_campaigns: usize,
    pub stats: BrandStats,
    /// Most recent first.
    pub campaigns: Vec<ScoredCampaign>,
    pub top_performing_subject: String,
    pub insights: Insights,
}

/// Round to one decimal place.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
