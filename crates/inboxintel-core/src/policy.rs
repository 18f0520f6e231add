//! Scoring policy: every weight, threshold and band the engine uses.
//!
//! Defaults are exposed as named constants so callers and tests can refer to
//! them directly. A YAML file may override any subset of fields.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const URGENCY_KEYWORD_MAX_POINTS: f64 = 40.0;
pub const URGENCY_KEYWORD_HIT_CAP: u32 = 4;
pub const URGENCY_HIGH_CATEGORY_POINTS: f64 = 20.0;
pub const URGENCY_LAUNCH_CATEGORY_POINTS: f64 = 10.0;
pub const URGENCY_DEADLINE_POINTS: f64 = 20.0;
pub const URGENCY_MULTI_CTA_POINTS: f64 = 10.0;
pub const URGENCY_MULTI_CTA_MIN: u32 = 2;
pub const URGENCY_EMOJI_POINTS: f64 = 10.0;

pub const PERF_SUBJECT_POINTS: f64 = 25.0;
pub const PERF_SUBJECT_BAND_MIN: u32 = 4;
pub const PERF_SUBJECT_BAND_MAX: u32 = 8;
pub const PERF_SUBJECT_ZERO_AT: u32 = 16;
pub const PERF_CTA_POINTS: f64 = 25.0;
pub const PERF_CTA_NEAR_POINTS: f64 = 15.0;
pub const PERF_CTA_PENALTY_POINTS: f64 = 5.0;
pub const PERF_CTA_BAND_MIN: u32 = 1;
pub const PERF_CTA_BAND_MAX: u32 = 3;
pub const PERF_EMOJI_POINTS: f64 = 10.0;
pub const PERF_URGENCY_FACTOR: f64 = 0.2;
pub const PERF_URGENCY_CAP: f64 = 20.0;

pub const PRIOR_WELCOME: f64 = 30.0;
pub const PRIOR_ABANDONED_CART: f64 = 28.0;
pub const PRIOR_PRODUCT_LAUNCH: f64 = 22.0;
pub const PRIOR_PROMOTIONAL: f64 = 20.0;
pub const PRIOR_NEWSLETTER: f64 = 15.0;

pub const DEFAULT_URGENCY_THRESHOLD: f64 = 50.0;
pub const DEFAULT_MAX_INSIGHTS: usize = 4;

pub const INSIGHT_EMOJI_STRENGTH: f64 = 50.0;
pub const INSIGHT_URGENCY_STRENGTH: f64 = 40.0;
pub const INSIGHT_DEADLINE_STRENGTH: f64 = 25.0;
pub const INSIGHT_FOCUSED_CTA_STRENGTH: f64 = 60.0;
pub const INSIGHT_CADENCE_MIN: f64 = 2.0;
pub const INSIGHT_CADENCE_MAX: f64 = 5.0;
pub const INSIGHT_LOW_FREQUENCY: f64 = 1.0;
pub const INSIGHT_HIGH_FREQUENCY: f64 = 7.0;
pub const INSIGHT_LOW_URGENCY: f64 = 20.0;
pub const INSIGHT_URGENCY_FATIGUE: f64 = 80.0;
pub const INSIGHT_LOW_EMOJI: f64 = 30.0;
pub const INSIGHT_CTA_SPRAWL: f64 = 25.0;
pub const INSIGHT_SINGLE_SLOT_MIN_CAMPAIGNS: usize = 3;

pub const OVERALL_PERFORMANCE_WEIGHT: f64 = 0.5;
pub const OVERALL_URGENCY_WEIGHT: f64 = 0.3;
pub const OVERALL_CADENCE_WEIGHT: f64 = 0.2;
pub const OVERALL_URGENCY_MIDPOINT: f64 = 45.0;
pub const OVERALL_PREFERRED_FREQUENCY: f64 = 3.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyWeights {
    pub keyword_max_points: f64,
    pub keyword_hit_cap: u32,
    /// Baseline for `promotional` and `abandoned-cart`.
    pub high_category_points: f64,
    /// Baseline for `product-launch`.
    pub launch_category_points: f64,
    pub deadline_points: f64,
    pub multi_cta_points: f64,
    pub multi_cta_min: u32,
    pub emoji_points: f64,
}

impl Default for UrgencyWeights {
    fn default() -> Self {
        Self {
            keyword_max_points: URGENCY_KEYWORD_MAX_POINTS,
            keyword_hit_cap: URGENCY_KEYWORD_HIT_CAP,
            high_category_points: URGENCY_HIGH_CATEGORY_POINTS,
            launch_category_points: URGENCY_LAUNCH_CATEGORY_POINTS,
            deadline_points: URGENCY_DEADLINE_POINTS,
            multi_cta_points: URGENCY_MULTI_CTA_POINTS,
            multi_cta_min: URGENCY_MULTI_CTA_MIN,
            emoji_points: URGENCY_EMOJI_POINTS,
        }
    }
}

/// Per-category performance priors, each expected in `[10, 30]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPriors {
    pub welcome: f64,
    pub abandoned_cart: f64,
    pub product_launch: f64,
    pub promotional: f64,
    pub newsletter: f64,
}

impl Default for CategoryPriors {
    fn default() -> Self {
        Self {
            welcome: PRIOR_WELCOME,
            abandoned_cart: PRIOR_ABANDONED_CART,
            product_launch: PRIOR_PRODUCT_LAUNCH,
            promotional: PRIOR_PROMOTIONAL,
            newsletter: PRIOR_NEWSLETTER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceWeights {
    pub subject_points: f64,
    pub subject_band_min: u32,
    pub subject_band_max: u32,
    /// Word count at (and beyond) which the subject signal reaches zero.
    pub subject_zero_at: u32,
    pub cta_points: f64,
    /// Points for a count one above the preferred band.
    pub cta_near_points: f64,
    pub cta_penalty_points: f64,
    pub cta_band_min: u32,
    pub cta_band_max: u32,
    pub emoji_points: f64,
    pub urgency_factor: f64,
    pub urgency_cap: f64,
    pub priors: CategoryPriors,
}

impl Default for PerformanceWeights {
    fn default() -> Self {
        Self {
            subject_points: PERF_SUBJECT_POINTS,
            subject_band_min: PERF_SUBJECT_BAND_MIN,
            subject_band_max: PERF_SUBJECT_BAND_MAX,
            subject_zero_at: PERF_SUBJECT_ZERO_AT,
            cta_points: PERF_CTA_POINTS,
            cta_near_points: PERF_CTA_NEAR_POINTS,
            cta_penalty_points: PERF_CTA_PENALTY_POINTS,
            cta_band_min: PERF_CTA_BAND_MIN,
            cta_band_max: PERF_CTA_BAND_MAX,
            emoji_points: PERF_EMOJI_POINTS,
            urgency_factor: PERF_URGENCY_FACTOR,
            urgency_cap: PERF_URGENCY_CAP,
            priors: CategoryPriors::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsPolicy {
    /// A campaign counts toward `urgencyFrequency` when its score is strictly above this.
    pub urgency_threshold: f64,
}

impl Default for StatsPolicy {
    fn default() -> Self {
        Self {
            urgency_threshold: DEFAULT_URGENCY_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightPolicy {
    /// Maximum insights per list.
    pub max_per_list: usize,
    /// Emoji usage rate (%) strictly above which emoji counts as a strength.
    pub emoji_strength: f64,
    /// Urgency frequency (%) at or above which urgency counts as a strength.
    pub urgency_strength: f64,
    /// Share (%) of campaigns with an explicit deadline to count as a strength.
    pub deadline_strength: f64,
    /// Share (%) of campaigns inside the CTA band to count as a strength.
    pub focused_cta_strength: f64,
    /// Campaigns per week counted as a steady cadence, inclusive.
    pub cadence_min: f64,
    pub cadence_max: f64,
    /// Campaigns per week below which cadence is an opportunity.
    pub low_frequency: f64,
    /// Campaigns per week above which list fatigue is flagged.
    pub high_frequency: f64,
    /// Urgency frequency (%) below which urgency is an opportunity.
    pub low_urgency: f64,
    /// Urgency frequency (%) above which subscriber fatigue is flagged.
    pub urgency_fatigue: f64,
    /// Emoji usage rate (%) below which emoji is an opportunity.
    pub low_emoji: f64,
    /// Share (%) of campaigns with zero or too many CTAs that gets flagged.
    pub cta_sprawl: f64,
    /// Minimum campaigns before a single send hour is flagged.
    pub single_slot_min_campaigns: usize,
}

impl Default for InsightPolicy {
    fn default() -> Self {
        Self {
            max_per_list: DEFAULT_MAX_INSIGHTS,
            emoji_strength: INSIGHT_EMOJI_STRENGTH,
            urgency_strength: INSIGHT_URGENCY_STRENGTH,
            deadline_strength: INSIGHT_DEADLINE_STRENGTH,
            focused_cta_strength: INSIGHT_FOCUSED_CTA_STRENGTH,
            cadence_min: INSIGHT_CADENCE_MIN,
            cadence_max: INSIGHT_CADENCE_MAX,
            low_frequency: INSIGHT_LOW_FREQUENCY,
            high_frequency: INSIGHT_HIGH_FREQUENCY,
            low_urgency: INSIGHT_LOW_URGENCY,
            urgency_fatigue: INSIGHT_URGENCY_FATIGUE,
            low_emoji: INSIGHT_LOW_EMOJI,
            cta_sprawl: INSIGHT_CTA_SPRAWL,
            single_slot_min_campaigns: INSIGHT_SINGLE_SLOT_MIN_CAMPAIGNS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverallWeights {
    pub performance_weight: f64,
    pub urgency_weight: f64,
    pub cadence_weight: f64,
    pub urgency_midpoint: f64,
    /// Campaigns per week at which the cadence component saturates.
    pub preferred_frequency: f64,
}

impl Default for OverallWeights {
    fn default() -> Self {
        Self {
            performance_weight: OVERALL_PERFORMANCE_WEIGHT,
            urgency_weight: OVERALL_URGENCY_WEIGHT,
            cadence_weight: OVERALL_CADENCE_WEIGHT,
            urgency_midpoint: OVERALL_URGENCY_MIDPOINT,
            preferred_frequency: OVERALL_PREFERRED_FREQUENCY,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub urgency: UrgencyWeights,
    pub performance: PerformanceWeights,
    pub stats: StatsPolicy,
    pub insights: InsightPolicy,
    pub overall: OverallWeights,
}

impl ScoringPolicy {
    /// Check that the policy is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let u = &self.urgency;
        let p = &self.performance;
        let o = &self.overall;
        let weights = [
            ("urgency.keyword_max_points", u.keyword_max_points),
            ("urgency.high_category_points", u.high_category_points),
            ("urgency.launch_category_points", u.launch_category_points),
            ("urgency.deadline_points", u.deadline_points),
            ("urgency.multi_cta_points", u.multi_cta_points),
            ("urgency.emoji_points", u.emoji_points),
            ("performance.subject_points", p.subject_points),
            ("performance.cta_points", p.cta_points),
            ("performance.cta_near_points", p.cta_near_points),
            ("performance.cta_penalty_points", p.cta_penalty_points),
            ("performance.emoji_points", p.emoji_points),
            ("performance.urgency_factor", p.urgency_factor),
            ("performance.urgency_cap", p.urgency_cap),
            ("performance.priors.welcome", p.priors.welcome),
            ("performance.priors.abandoned_cart", p.priors.abandoned_cart),
            ("performance.priors.product_launch", p.priors.product_launch),
            ("performance.priors.promotional", p.priors.promotional),
            ("performance.priors.newsletter", p.priors.newsletter),
            ("overall.performance_weight", o.performance_weight),
            ("overall.urgency_weight", o.urgency_weight),
            ("overall.cadence_weight", o.cadence_weight),
        ];
        if let Some((name, value)) = weights
            .iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(ConfigError::Validation(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }

        if u.keyword_hit_cap == 0 {
            return Err(ConfigError::Validation(
                "urgency.keyword_hit_cap must be at least 1".to_string(),
            ));
        }
        if p.subject_band_min > p.subject_band_max || p.subject_band_max >= p.subject_zero_at {
            return Err(ConfigError::Validation(format!(
                "performance subject band [{}, {}] must satisfy min <= max < zero_at ({})",
                p.subject_band_min, p.subject_band_max, p.subject_zero_at
            )));
        }
        if p.cta_band_min > p.cta_band_max {
            return Err(ConfigError::Validation(format!(
                "performance cta band [{}, {}] is inverted",
                p.cta_band_min, p.cta_band_max
            )));
        }
        if !(0.0..=100.0).contains(&self.stats.urgency_threshold) {
            return Err(ConfigError::Validation(format!(
                "stats.urgency_threshold must be within [0, 100], got {}",
                self.stats.urgency_threshold
            )));
        }
        let i = &self.insights;
        if i.max_per_list == 0 {
            return Err(ConfigError::Validation(
                "insights.max_per_list must be at least 1".to_string(),
            ));
        }
        let insight_thresholds = [
            ("insights.emoji_strength", i.emoji_strength),
            ("insights.urgency_strength", i.urgency_strength),
            ("insights.deadline_strength", i.deadline_strength),
            ("insights.focused_cta_strength", i.focused_cta_strength),
            ("insights.cadence_min", i.cadence_min),
            ("insights.cadence_max", i.cadence_max),
            ("insights.low_frequency", i.low_frequency),
            ("insights.high_frequency", i.high_frequency),
            ("insights.low_urgency", i.low_urgency),
            ("insights.urgency_fatigue", i.urgency_fatigue),
            ("insights.low_emoji", i.low_emoji),
            ("insights.cta_sprawl", i.cta_sprawl),
        ];
        if let Some((name, value)) = insight_thresholds
            .iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(ConfigError::Validation(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
        if i.cadence_min > i.cadence_max {
            return Err(ConfigError::Validation(format!(
                "insights cadence band [{}, {}] is inverted",
                i.cadence_min, i.cadence_max
            )));
        }
        if !o.preferred_frequency.is_finite() || o.preferred_frequency <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "overall.preferred_frequency must be positive, got {}",
                o.preferred_frequency
            )));
        }

        Ok(())
    }
}

/// Load and validate a scoring policy from a YAML file.
///
/// Omitted sections and fields keep their defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_policy(path: &Path) -> Result<ScoringPolicy, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let policy: ScoringPolicy = serde_yaml::from_str(&content)?;
    policy.validate()?;

    Ok(policy)
}
