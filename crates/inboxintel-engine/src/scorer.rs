//! Rule-weighted campaign scorer for urgency and estimated performance.

use inboxintel_core::{Campaign, Category, PerformanceWeights, ScoringPolicy, UrgencyWeights};

use crate::error::EngineError;
use crate::signals::extract_signals;
use crate::types::{round1, CampaignSignals, ScoredCampaign};

/// Score a single campaign.
///
/// Urgency comes from the collector-supplied override when present, otherwise
/// from the weighted signal table. Performance is always derived. Both scores
/// are rounded to one decimal and lie in `[0, 100]`.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] if the campaign has an empty `id` or
/// `subject`, or an urgency override outside `[0, 100]`.
pub fn score_campaign(
    campaign: &Campaign,
    policy: &ScoringPolicy,
) -> Result<ScoredCampaign, EngineError> {
    if campaign.id.trim().is_empty() {
        return Err(EngineError::validation("id", "must be non-empty"));
    }
    if campaign.subject.trim().is_empty() {
        return Err(EngineError::validation(
            "subject",
            format!("campaign '{}' has an empty subject", campaign.id),
        ));
    }

    let signals = extract_signals(campaign);

    let urgency = match campaign.urgency_override {
        Some(score) if score.is_finite() && (0.0..=100.0).contains(&score) => score,
        Some(score) => {
            return Err(EngineError::validation(
                "urgencyScore",
                format!(
                    "campaign '{}' has urgency score {score} outside [0, 100]",
                    campaign.id
                ),
            ))
        }
        None => urgency_score(campaign, &signals, &policy.urgency),
    };
    let urgency = round1(urgency);
    let performance = round1(performance_score(
        campaign,
        &signals,
        urgency,
        &policy.performance,
    ));

    Ok(ScoredCampaign {
        campaign: campaign.clone(),
        urgency_score: urgency,
        performance_score: performance,
        signals,
    })
}

/// Weighted urgency sum, each component within its own sub-range.
pub(crate) fn urgency_score(
    campaign: &Campaign,
    signals: &CampaignSignals,
    weights: &UrgencyWeights,
) -> f64 {
    let cap = weights.keyword_hit_cap.max(1);
    let hits = signals.keyword_hits.min(cap);
    let keywords = weights.keyword_max_points * f64::from(hits) / f64::from(cap);

    let category = match campaign.category {
        Category::Promotional | Category::AbandonedCart => weights.high_category_points,
        Category::ProductLaunch => weights.launch_category_points,
        Category::Welcome | Category::Newsletter => 0.0,
    };

    let deadline = if signals.has_deadline {
        weights.deadline_points
    } else {
        0.0
    };

    let cta = if campaign.cta_count >= weights.multi_cta_min {
        weights.multi_cta_points
    } else {
        0.0
    };

    let emoji = if signals.has_urgency_emoji {
        weights.emoji_points
    } else {
        0.0
    };

    (keywords + category + deadline + cta + emoji).clamp(0.0, 100.0)
}

/// Structural-quality proxy for campaign effectiveness.
pub(crate) fn performance_score(
    campaign: &Campaign,
    signals: &CampaignSignals,
    urgency: f64,
    weights: &PerformanceWeights,
) -> f64 {
    let subject = subject_length_points(signals.subject_words, weights);
    let cta = cta_points(campaign.cta_count, weights);
    let prior = category_prior(campaign.category, weights);
    let emoji = if signals.subject_has_emoji {
        weights.emoji_points
    } else {
        0.0
    };
    let urgency_bonus = (urgency * weights.urgency_factor).clamp(0.0, weights.urgency_cap);

    (subject + cta + prior + emoji + urgency_bonus).clamp(0.0, 100.0)
}

/// Full points inside the preferred band, decaying linearly to zero at zero
/// words and at `subject_zero_at` words.
fn subject_length_points(words: u32, weights: &PerformanceWeights) -> f64 {
    let max = weights.subject_points;
    if words < weights.subject_band_min {
        max * f64::from(words) / f64::from(weights.subject_band_min)
    } else if words <= weights.subject_band_max {
        max
    } else if words >= weights.subject_zero_at {
        0.0
    } else {
        let over = f64::from(words - weights.subject_band_max);
        let span = f64::from(weights.subject_zero_at - weights.subject_band_max);
        max * (1.0 - over / span)
    }
}

fn cta_points(count: u32, weights: &PerformanceWeights) -> f64 {
    if (weights.cta_band_min..=weights.cta_band_max).contains(&count) {
        weights.cta_points
    } else if count == weights.cta_band_max + 1 {
        weights.cta_near_points
    } else {
        weights.cta_penalty_points
    }
}

fn category_prior(category: Category, weights: &PerformanceWeights) -> f64 {
    let priors = &weights.priors;
    match category {
        Category::Welcome => priors.welcome,
        Category::AbandonedCart => priors.abandoned_cart,
        Category::ProductLaunch => priors.product_launch,
        Category::Promotional => priors.promotional,
        Category::Newsletter => priors.newsletter,
    }
}
