//! Report assembly: score, aggregate, generate insights, blend the overall score.

use std::collections::HashSet;

use inboxintel_core::{Campaign, OverallWeights, ScoringPolicy};

use crate::error::EngineError;
use crate::insights::generate;
use crate::scorer::score_campaign;
use crate::stats::{aggregate, canonical_order};
use crate::types::{round1, BrandStats, IntelligenceReport, ScoredCampaign};

/// Build the intelligence report for `brand` from its campaigns.
///
/// Either returns a fully populated report or fails; there are no partial
/// results. Identical input always yields an identical report.
///
/// # Errors
///
/// - [`EngineError::Validation`] if `brand` is blank, a campaign id repeats,
///   or any campaign fails scoring validation.
/// - [`EngineError::EmptyInput`] if `campaigns` is empty.
pub fn build_report(
    brand: &str,
    campaigns: &[Campaign],
    policy: &ScoringPolicy,
) -> Result<IntelligenceReport, EngineError> {
    let brand = brand.trim();
    if brand.is_empty() {
        return Err(EngineError::validation("brand", "must be non-empty"));
    }
    if campaigns.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let mut seen = HashSet::with_capacity(campaigns.len());
    if let Some(dup) = campaigns.iter().find(|c| !seen.insert(c.id.as_str())) {
        return Err(EngineError::validation(
            "id",
            format!("duplicate campaign id '{}'", dup.id),
        ));
    }

    let scored = campaigns
        .iter()
        .map(|c| score_campaign(c, policy))
        .collect::<Result<Vec<_>, _>>()?;

    let stats = aggregate(&scored, &policy.stats)?;
    let insights = generate(&scored, &stats, policy);
    let overall_score = overall_score(&scored, &stats, &policy.overall);

    let campaigns = most_recent_first(scored);
    let top_performing_subject = top_performing(&campaigns)
        .map(|c| c.campaign.subject.clone())
        .unwrap_or_default();

    Ok(IntelligenceReport {
        brand: brand.to_string(),
        overall_score,
        total_campaigns: campaigns.len(),
        stats,
        campaigns,
        top_performing_subject,
        insights,
    })
}

/// Weighted blend of mean performance, closeness of urgency usage to the
/// preferred midpoint, and cadence relative to the preferred frequency.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn overall_score(
    scored: &[ScoredCampaign],
    stats: &BrandStats,
    weights: &OverallWeights,
) -> f64 {
    let ordered = canonical_order(scored);
    let mean_performance = if ordered.is_empty() {
        0.0
    } else {
        ordered.iter().map(|c| c.performance_score).sum::<f64>() / ordered.len() as f64
    };

    let urgency_fit = 100.0 - (stats.urgency_frequency - weights.urgency_midpoint).abs();
    let cadence_fit = (stats.avg_frequency / weights.preferred_frequency * 100.0).min(100.0);

    let raw = weights.performance_weight * mean_performance
        + weights.urgency_weight * urgency_fit
        + weights.cadence_weight * cadence_fit;

    round1(raw.clamp(0.0, 100.0))
}

/// Sort by `sentAt` descending; equal timestamps fall back to `id` ascending.
fn most_recent_first(mut scored: Vec<ScoredCampaign>) -> Vec<ScoredCampaign> {
    scored.sort_by(|a, b| {
        b.campaign
            .sent_at
            .cmp(&a.campaign.sent_at)
            .then_with(|| a.campaign.id.cmp(&b.campaign.id))
    });
    scored
}

/// Highest performance score; ties go to the most recent campaign.
///
/// Expects `campaigns` already ordered most recent first.
fn top_performing(campaigns: &[ScoredCampaign]) -> Option<&ScoredCampaign> {
    campaigns.iter().fold(None, |best, c| match best {
        Some(top) if c.performance_score <= top.performance_score => Some(top),
        _ => Some(c),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use inboxintel_core::Category;

    use super::*;

    fn campaign(id: &str, subject: &str, day: u32, category: Category, cta: u32) -> Campaign {
        Campaign {
            id: id.to_string(),
            subject: subject.to_string(),
            sent_at: Utc.with_ymd_and_hms(2024, 11, day, 12, 0, 0).unwrap(),
            category,
            cta_count: cta,
            content: None,
            urgency_override: None,
            has_emoji: None,
        }
    }

    #[test]
    fn blank_brand_is_validation_error() {
        let err = build_report(
            "  ",
            &[campaign("a", "Hello there friend", 1, Category::Welcome, 1)],
            &ScoringPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ref v) if v.field == "brand"));
    }

    #[test]
    fn empty_campaigns_is_empty_input() {
        let err = build_report("Acme", &[], &ScoringPolicy::default()).unwrap_err();
        assert_eq!(err, EngineError::EmptyInput);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = build_report(
            "Acme",
            &[
                campaign("a", "Hello there friend", 1, Category::Welcome, 1),
                campaign("a", "Weekly news roundup", 2, Category::Newsletter, 1),
            ],
            &ScoringPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(ref v) if v.field == "id"));
    }

    #[test]
    fn campaigns_are_most_recent_first() {
        let report = build_report(
            "Acme",
            &[
                campaign("old", "Welcome to the Family!", 1, Category::Welcome, 1),
                campaign("new", "Weekly news roundup", 9, Category::Newsletter, 1),
                campaign("mid", "Your cart is waiting", 5, Category::AbandonedCart, 2),
            ],
            &ScoringPolicy::default(),
        )
        .unwrap();
        let ids: Vec<&str> = report
            .campaigns
            .iter()
            .map(|c| c.campaign.id.as_str())
            .collect();
        assert_eq!(ids, ["new", "mid", "old"]);
        assert_eq!(report.total_campaigns, 3);
        assert_eq!(report.brand, "Acme");
    }

    #[test]
    fn top_performing_ties_prefer_most_recent() {
        // identical structure -> identical scores
        let report = build_report(
            "Acme",
            &[
                campaign("a", "Weekly news roundup inside", 3, Category::Newsletter, 1),
                campaign("b", "Monthly news roundup inside", 7, Category::Newsletter, 1),
            ],
            &ScoringPolicy::default(),
        )
        .unwrap();
        assert!(
            (report.campaigns[0].performance_score - report.campaigns[1].performance_score).abs()
                < 1e-9
        );
        assert_eq!(report.top_performing_subject, "Monthly news roundup inside");
    }

    #[test]
    fn overall_score_blend() {
        let stats = BrandStats {
            avg_frequency: 3.5,
            best_send_time: "14:00".to_string(),
            best_day: "Tuesday".to_string(),
            emoji_usage_rate: 0.0,
            avg_subject_length: 5,
            urgency_frequency: 45.0,
        };
        let c = score_campaign(
            &campaign("a", "Welcome to the Family!", 1, Category::Welcome, 1),
            &ScoringPolicy::default(),
        )
        .unwrap();
        // 0.5 * 80 + 0.3 * 100 + 0.2 * 100
        let score = overall_score(&[c], &stats, &OverallWeights::default());
        assert!((score - 90.0).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn overall_score_penalizes_urgency_distance_and_low_cadence() {
        let stats = BrandStats {
            avg_frequency: 1.75,
            best_send_time: "14:00".to_string(),
            best_day: "Tuesday".to_string(),
            emoji_usage_rate: 0.0,
            avg_subject_length: 5,
            urgency_frequency: 95.0,
        };
        let c = score_campaign(
            &campaign("a", "Welcome to the Family!", 1, Category::Welcome, 1),
            &ScoringPolicy::default(),
        )
        .unwrap();
        // 0.5 * 80 + 0.3 * 50 + 0.2 * 50
        let score = overall_score(&[c], &stats, &OverallWeights::default());
        assert!((score - 65.0).abs() < 1e-9, "got {score}");
    }
}
