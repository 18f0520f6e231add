//! Evidence-gated insight selection.
//!
//! Insights come from two fixed rule tables. A rule contributes its text only
//! when its evidence holds against the computed statistics; nothing is ever
//! emitted without supporting data. Working rules rank by the size of the
//! statistic that fired them, opportunity rules by a fixed impact weight.

use std::collections::BTreeMap;

use inboxintel_core::{Category, ScoringPolicy};

use crate::stats::{argmax_bucket, canonical_order, hour_means, percent, weekday_means};
use crate::types::{round1, BrandStats, Insight, Insights, ScoredCampaign};

/// Everything a rule may look at, computed once per report.
pub(crate) struct Evidence<'a> {
    pub stats: &'a BrandStats,
    pub policy: &'a ScoringPolicy,
    pub total: usize,
    pub mean_performance: f64,
    pub categories: BTreeMap<Category, CategoryStats>,
    /// Best hour bucket mean, present when at least two hours are used.
    pub best_hour_mean: Option<f64>,
    /// Best weekday bucket mean, present when at least two weekdays are used.
    pub best_day_mean: Option<f64>,
    /// Number of distinct hour buckets used.
    pub hours_used: usize,
    pub deadline_share: f64,
    pub focused_cta_share: f64,
    pub cta_sprawl_share: f64,
    pub subject_band_share: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CategoryStats {
    pub count: usize,
    pub performance_sum: f64,
}

impl CategoryStats {
    #[allow(clippy::cast_precision_loss)]
    fn mean(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.performance_sum / self.count as f64
        }
    }
}

impl<'a> Evidence<'a> {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn collect(
        campaigns: &'a [ScoredCampaign],
        stats: &'a BrandStats,
        policy: &'a ScoringPolicy,
    ) -> Self {
        let ordered = canonical_order(campaigns);
        let total = ordered.len();
        let perf = &policy.performance;

        let mut categories: BTreeMap<Category, CategoryStats> = BTreeMap::new();
        let mut performance_sum = 0.0;
        let mut deadlines = 0;
        let mut focused = 0;
        let mut sprawl = 0;
        let mut in_band = 0;
        for c in &ordered {
            let entry = categories.entry(c.campaign.category).or_default();
            entry.count += 1;
            entry.performance_sum += c.performance_score;
            performance_sum += c.performance_score;

            if c.signals.has_deadline {
                deadlines += 1;
            }
            let cta = c.campaign.cta_count;
            if (perf.cta_band_min..=perf.cta_band_max).contains(&cta) {
                focused += 1;
            }
            if cta == 0 || cta > perf.cta_band_max + 1 {
                sprawl += 1;
            }
            if (perf.subject_band_min..=perf.subject_band_max).contains(&c.signals.subject_words) {
                in_band += 1;
            }
        }

        let mean_performance = if total == 0 {
            0.0
        } else {
            performance_sum / total as f64
        };

        let hours = hour_means(&ordered);
        let days = weekday_means(&ordered);
        let hours_used = hours.iter().flatten().count();
        let days_used = days.iter().flatten().count();

        Self {
            stats,
            policy,
            total,
            mean_performance,
            categories,
            best_hour_mean: best_mean(&hours).filter(|_| hours_used >= 2),
            best_day_mean: best_mean(&days).filter(|_| days_used >= 2),
            hours_used,
            deadline_share: percent(deadlines, total),
            focused_cta_share: percent(focused, total),
            cta_sprawl_share: percent(sprawl, total),
            subject_band_share: percent(in_band, total),
        }
    }

    fn has_category(&self, category: Category) -> bool {
        self.categories.contains_key(&category)
    }

    /// Highest-performing category among those with at least two campaigns,
    /// provided more than one category is present.
    fn leading_category(&self) -> Option<(Category, f64)> {
        if self.categories.len() < 2 {
            return None;
        }
        let mut best: Option<(Category, f64)> = None;
        for (&category, stats) in &self.categories {
            if stats.count < 2 {
                continue;
            }
            let mean = stats.mean();
            match best {
                Some((_, top)) if mean <= top => {}
                _ => best = Some((category, mean)),
            }
        }
        best
    }
}

fn best_mean(means: &[Option<f64>]) -> Option<f64> {
    argmax_bucket(means).and_then(|idx| means[idx])
}

/// A "what the brand does well" rule: `magnitude` returns the supporting
/// statistic when the evidence holds.
struct WorkingRule {
    magnitude: fn(&Evidence<'_>) -> Option<f64>,
    render: fn(&Evidence<'_>) -> String,
}

/// A "what the brand is missing" rule with a fixed impact weight.
struct OpportunityRule {
    impact: f64,
    fires: fn(&Evidence<'_>) -> bool,
    render: fn(&Evidence<'_>) -> String,
}

const WORKING_RULES: &[WorkingRule] = &[
    // emoji usage
    WorkingRule {
        magnitude: |e| {
            let rate = e.stats.emoji_usage_rate;
            (rate > e.policy.insights.emoji_strength).then_some(rate)
        },
        render: |e| {
            format!(
                "Emoji usage in {}% of subject lines, a pattern associated with higher open rates",
                e.stats.emoji_usage_rate
            )
        },
    },
    // urgency messaging
    WorkingRule {
        magnitude: |e| {
            let rate = e.stats.urgency_frequency;
            (rate >= e.policy.insights.urgency_strength).then_some(rate)
        },
        render: |e| {
            format!(
                "Urgency messaging drives {}% of campaigns with time-pressure and scarcity language",
                e.stats.urgency_frequency
            )
        },
    },
    // countdowns and deadlines
    WorkingRule {
        magnitude: |e| {
            (e.deadline_share >= e.policy.insights.deadline_strength).then_some(e.deadline_share)
        },
        render: |e| {
            format!(
                "Explicit deadlines or countdowns appear in {}% of campaigns",
                e.deadline_share
            )
        },
    },
    // best send time
    WorkingRule {
        magnitude: |e| e.best_hour_mean.filter(|m| *m > e.mean_performance),
        render: |e| {
            format!(
                "{} sends outperform other times (avg performance {})",
                e.stats.best_send_time,
                round1(e.best_hour_mean.unwrap_or_default())
            )
        },
    },
    // best send day
    WorkingRule {
        magnitude: |e| e.best_day_mean.filter(|m| *m > e.mean_performance),
        render: |e| {
            format!(
                "{} sends consistently outperform other days (avg performance {})",
                e.stats.best_day,
                round1(e.best_day_mean.unwrap_or_default())
            )
        },
    },
    // subject length sweet spot
    WorkingRule {
        magnitude: |e| {
            let p = &e.policy.performance;
            (p.subject_band_min..=p.subject_band_max)
                .contains(&e.stats.avg_subject_length)
                .then_some(e.subject_band_share)
        },
        render: |e| {
            let p = &e.policy.performance;
            format!(
                "Subject lines average {} words, inside the {}-{} word sweet spot",
                e.stats.avg_subject_length, p.subject_band_min, p.subject_band_max
            )
        },
    },
    // focused calls to action
    WorkingRule {
        magnitude: |e| {
            let share = e.focused_cta_share;
            (share >= e.policy.insights.focused_cta_strength).then_some(share)
        },
        render: |e| {
            let p = &e.policy.performance;
            format!(
                "{}% of campaigns keep calls-to-action focused ({}-{} per email)",
                e.focused_cta_share, p.cta_band_min, p.cta_band_max
            )
        },
    },
    // steady cadence
    WorkingRule {
        magnitude: |e| {
            let f = e.stats.avg_frequency;
            let i = &e.policy.insights;
            ((i.cadence_min..=i.cadence_max).contains(&f))
                .then(|| (f / e.policy.overall.preferred_frequency * 100.0).min(100.0))
        },
        render: |e| {
            format!(
                "Steady cadence of {} emails per week keeps the brand in the inbox",
                e.stats.avg_frequency
            )
        },
    },
    // leading category
    WorkingRule {
        magnitude: |e| e.leading_category().map(|(_, mean)| mean),
        render: |e| {
            let (category, mean) = e.leading_category().unwrap_or((Category::Promotional, 0.0));
            format!(
                "{} campaigns lead performance (avg {})",
                category_label(category),
                round1(mean)
            )
        },
    },
];

const OPPORTUNITY_RULES: &[OpportunityRule] = &[
    OpportunityRule {
        impact: 95.0,
        fires: |e| !e.has_category(Category::Welcome),
        render: |_| {
            "No welcome email series detected, a significant revenue opportunity".to_string()
        },
    },
    OpportunityRule {
        impact: 90.0,
        fires: |e| !e.has_category(Category::AbandonedCart),
        render: |_| "No abandoned-cart recovery emails detected".to_string(),
    },
    OpportunityRule {
        impact: 75.0,
        fires: |e| e.stats.avg_frequency < e.policy.insights.low_frequency,
        render: |e| {
            format!(
                "Sending only {} emails per week leaves room for more touchpoints",
                e.stats.avg_frequency
            )
        },
    },
    OpportunityRule {
        impact: 65.0,
        fires: |e| e.stats.urgency_frequency < e.policy.insights.low_urgency,
        render: |e| {
            format!(
                "Urgency appears in only {}% of campaigns; test deadline-driven messaging",
                e.stats.urgency_frequency
            )
        },
    },
    OpportunityRule {
        impact: 60.0,
        fires: |e| e.stats.emoji_usage_rate < e.policy.insights.low_emoji,
        render: |e| {
            format!(
                "Emoji appear in only {}% of subject lines; test emoji to stand out in the inbox",
                e.stats.emoji_usage_rate
            )
        },
    },
    OpportunityRule {
        impact: 55.0,
        fires: |e| e.stats.avg_subject_length > e.policy.performance.subject_band_max,
        render: |e| {
            format!(
                "Could test shorter subject lines (currently averaging {} words)",
                e.stats.avg_subject_length
            )
        },
    },
    OpportunityRule {
        impact: 55.0,
        fires: |e| e.stats.avg_subject_length < e.policy.performance.subject_band_min,
        render: |e| {
            format!(
                "Could test longer subject lines (currently averaging {} words)",
                e.stats.avg_subject_length
            )
        },
    },
    OpportunityRule {
        impact: 50.0,
        fires: |e| e.cta_sprawl_share >= e.policy.insights.cta_sprawl,
        render: |e| {
            format!(
                "{}% of campaigns have no call-to-action or more than {}",
                e.cta_sprawl_share,
                e.policy.performance.cta_band_max + 1
            )
        },
    },
    OpportunityRule {
        impact: 45.0,
        fires: |e| e.stats.urgency_frequency > e.policy.insights.urgency_fatigue,
        render: |e| {
            format!(
                "Urgency in {}% of campaigns risks subscriber fatigue",
                e.stats.urgency_frequency
            )
        },
    },
    OpportunityRule {
        impact: 45.0,
        fires: |e| e.stats.avg_frequency > e.policy.insights.high_frequency,
        render: |e| {
            format!(
                "{} emails per week risks list fatigue; test a lighter cadence",
                e.stats.avg_frequency
            )
        },
    },
    OpportunityRule {
        impact: 40.0,
        fires: |e| !e.has_category(Category::ProductLaunch),
        render: |_| "No product launch announcements detected".to_string(),
    },
    OpportunityRule {
        impact: 35.0,
        fires: |e| !e.has_category(Category::Newsletter),
        render: |_| {
            "No editorial newsletter detected for non-promotional engagement".to_string()
        },
    },
    OpportunityRule {
        impact: 30.0,
        fires: |e| e.total >= e.policy.insights.single_slot_min_campaigns && e.hours_used == 1,
        render: |e| {
            format!(
                "Every campaign goes out at {}; test other send times",
                e.stats.best_send_time
            )
        },
    },
];

/// Select and rank insights for a scored campaign set.
///
/// Never fails; each list holds at most `policy.insights.max_per_list` items
/// and may be empty when no rule's evidence holds.
#[must_use]
pub fn generate(
    campaigns: &[ScoredCampaign],
    stats: &BrandStats,
    policy: &ScoringPolicy,
) -> Insights {
    if campaigns.is_empty() {
        return Insights::default();
    }

    let evidence = Evidence::collect(campaigns, stats, policy);
    let limit = policy.insights.max_per_list;

    let working = WORKING_RULES
        .iter()
        .filter_map(|rule| {
            (rule.magnitude)(&evidence).map(|rank| Insight {
                text: (rule.render)(&evidence),
                rank,
            })
        })
        .collect();

    let opportunities = OPPORTUNITY_RULES
        .iter()
        .filter(|rule| (rule.fires)(&evidence))
        .map(|rule| Insight {
            text: (rule.render)(&evidence),
            rank: rule.impact,
        })
        .collect();

    Insights {
        working: select(working, limit),
        opportunities: select(opportunities, limit),
    }
}

/// Rank descending (stable, so table order breaks ties) and truncate.
fn select(mut insights: Vec<Insight>, limit: usize) -> Vec<String> {
    insights.sort_by(|a, b| b.rank.total_cmp(&a.rank));
    insights.truncate(limit);
    insights.into_iter().map(|i| i.text).collect()
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::Promotional => "Promotional",
        Category::Newsletter => "Newsletter",
        Category::AbandonedCart => "Abandoned-cart",
        Category::Welcome => "Welcome",
        Category::ProductLaunch => "Product launch",
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use inboxintel_core::Campaign;

    use super::*;
    use crate::stats::aggregate;
    use crate::types::CampaignSignals;

    fn scored(id: &str, category: Category, day: u32, hour: u32, perf: f64) -> ScoredCampaign {
        ScoredCampaign {
            campaign: Campaign {
                id: id.to_string(),
                subject: format!("Campaign {id} subject line here"),
                sent_at: Utc.with_ymd_and_hms(2024, 11, day, hour, 0, 0).unwrap(),
                category,
                cta_count: 2,
                content: None,
                urgency_override: None,
                has_emoji: None,
            },
            urgency_score: 60.0,
            performance_score: perf,
            signals: CampaignSignals {
                subject_words: 5,
                ..CampaignSignals::default()
            },
        }
    }

    fn run(campaigns: &[ScoredCampaign], policy: &ScoringPolicy) -> (BrandStats, Insights) {
        let stats = aggregate(campaigns, &policy.stats).unwrap();
        let insights = generate(campaigns, &stats, policy);
        (stats, insights)
    }

    #[test]
    fn missing_welcome_fires_opportunity() {
        let campaigns = [scored("a", Category::Promotional, 29, 14, 90.0)];
        let (_, insights) = run(&campaigns, &ScoringPolicy::default());
        assert!(insights
            .opportunities
            .iter()
            .any(|o| o.starts_with("No welcome email series")));
    }

    #[test]
    fn welcome_present_suppresses_welcome_opportunity() {
        let campaigns = [
            scored("a", Category::Welcome, 22, 9, 80.0),
            scored("b", Category::Promotional, 29, 14, 90.0),
        ];
        let (_, insights) = run(&campaigns, &ScoringPolicy::default());
        assert!(!insights
            .opportunities
            .iter()
            .any(|o| o.contains("welcome email series")));
    }

    #[test]
    fn opportunities_rank_by_impact() {
        // Only promotional campaigns: welcome (95) must outrank abandoned-cart (90)
        let campaigns = [scored("a", Category::Promotional, 29, 14, 90.0)];
        let (_, insights) = run(&campaigns, &ScoringPolicy::default());
        assert!(insights.opportunities[0].starts_with("No welcome email series"));
        assert_eq!(
            insights.opportunities[1],
            "No abandoned-cart recovery emails detected"
        );
    }

    #[test]
    fn lists_are_bounded_by_policy() {
        let campaigns = [scored("a", Category::Promotional, 29, 14, 90.0)];
        let mut policy = ScoringPolicy::default();
        policy.insights.max_per_list = 2;
        let (_, insights) = run(&campaigns, &policy);
        assert!(insights.working.len() <= 2);
        assert_eq!(insights.opportunities.len(), 2);
    }

    #[test]
    fn emoji_rule_requires_majority_usage() {
        let mut a = scored("a", Category::Promotional, 25, 10, 80.0);
        a.signals.subject_has_emoji = true;
        let b = scored("b", Category::Promotional, 26, 10, 80.0);
        let (stats, insights) = run(&[a.clone(), b], &ScoringPolicy::default());
        assert!((stats.emoji_usage_rate - 50.0).abs() < 1e-9);
        assert!(!insights.working.iter().any(|w| w.starts_with("Emoji usage")));

        let mut c = scored("c", Category::Promotional, 27, 10, 80.0);
        c.signals.subject_has_emoji = true;
        let (_, insights) = run(&[a, c], &ScoringPolicy::default());
        assert!(insights
            .working
            .iter()
            .any(|w| w == "Emoji usage in 100% of subject lines, a pattern associated with higher open rates"));
    }

    #[test]
    fn emoji_strength_threshold_comes_from_policy() {
        let mut a = scored("a", Category::Promotional, 25, 10, 80.0);
        a.signals.subject_has_emoji = true;
        let b = scored("b", Category::Promotional, 26, 10, 80.0);
        let mut policy = ScoringPolicy::default();
        policy.insights.emoji_strength = 40.0;
        let (_, insights) = run(&[a, b], &policy);
        assert!(insights.working.iter().any(|w| w.starts_with("Emoji usage in 50%")));
    }

    #[test]
    fn cadence_thresholds_come_from_policy() {
        let campaigns = [scored("a", Category::Promotional, 29, 14, 90.0)];
        let mut policy = ScoringPolicy::default();
        policy.insights.max_per_list = 20;
        // a single campaign reports a frequency of 1 per week
        let (_, insights) = run(&campaigns, &policy);
        assert!(!insights.opportunities.iter().any(|o| o.starts_with("Sending only")));

        policy.insights.low_frequency = 2.0;
        let (_, insights) = run(&campaigns, &policy);
        assert!(insights
            .opportunities
            .iter()
            .any(|o| o == "Sending only 1 emails per week leaves room for more touchpoints"));
    }

    #[test]
    fn working_rules_rank_by_magnitude() {
        let mut campaigns: Vec<ScoredCampaign> = (0..4)
            .map(|i| scored(&format!("c{i}"), Category::Promotional, 20 + i, 10, 70.0))
            .collect();
        for c in &mut campaigns {
            c.signals.subject_has_emoji = true;
        }
        let (_, insights) = run(&campaigns, &ScoringPolicy::default());
        // emoji, urgency, subject band and cta focus all sit at 100; table order breaks the tie
        assert!(insights.working[0].starts_with("Emoji usage in 100%"));
        assert!(insights.working[1].starts_with("Urgency messaging drives 100%"));
    }

    #[test]
    fn best_time_needs_two_distinct_hours() {
        let campaigns = [
            scored("a", Category::Promotional, 25, 10, 60.0),
            scored("b", Category::Promotional, 26, 10, 90.0),
        ];
        let (_, insights) = run(&campaigns, &ScoringPolicy::default());
        assert!(!insights.working.iter().any(|w| w.contains("outperform other times")));
    }

    #[test]
    fn leading_category_needs_two_categories_with_depth() {
        let campaigns = [
            scored("a", Category::Welcome, 21, 9, 85.0),
            scored("b", Category::Welcome, 22, 9, 87.0),
            scored("c", Category::Promotional, 23, 9, 60.0),
            scored("d", Category::Promotional, 24, 9, 62.0),
        ];
        let evidence_policy = ScoringPolicy::default();
        let stats = aggregate(&campaigns, &evidence_policy.stats).unwrap();
        let evidence = Evidence::collect(&campaigns, &stats, &evidence_policy);
        let (category, mean) = evidence.leading_category().unwrap();
        assert_eq!(category, Category::Welcome);
        assert!((mean - 86.0).abs() < 1e-9);
    }

    #[test]
    fn single_send_slot_opportunity() {
        let campaigns = [
            scored("a", Category::Welcome, 21, 9, 85.0),
            scored("b", Category::AbandonedCart, 22, 9, 87.0),
            scored("c", Category::Promotional, 23, 9, 60.0),
        ];
        let mut policy = ScoringPolicy::default();
        policy.insights.max_per_list = 20;
        let (_, insights) = run(&campaigns, &policy);
        assert!(insights
            .opportunities
            .iter()
            .any(|o| o == "Every campaign goes out at 09:00; test other send times"));
    }

    #[test]
    fn fired_rules_always_have_evidence() {
        let campaigns = [
            scored("a", Category::Welcome, 21, 9, 85.0),
            scored("b", Category::Newsletter, 24, 15, 55.0),
            scored("c", Category::ProductLaunch, 27, 11, 70.0),
        ];
        let policy = ScoringPolicy::default();
        let stats = aggregate(&campaigns, &policy.stats).unwrap();
        let evidence = Evidence::collect(&campaigns, &stats, &policy);
        let insights = generate(&campaigns, &stats, &ScoringPolicy {
            insights: inboxintel_core::InsightPolicy {
                max_per_list: 100,
                ..inboxintel_core::InsightPolicy::default()
            },
            ..ScoringPolicy::default()
        });

        for rule in WORKING_RULES {
            let text = (rule.render)(&evidence);
            if insights.working.contains(&text) {
                assert!((rule.magnitude)(&evidence).is_some(), "unsupported: {text}");
            }
        }
        for rule in OPPORTUNITY_RULES {
            let text = (rule.render)(&evidence);
            let fired = (rule.fires)(&evidence);
            assert_eq!(insights.opportunities.contains(&text), fired, "{text}");
        }
    }

    #[test]
    fn empty_campaigns_yield_no_insights() {
        let stats = BrandStats {
            avg_frequency: 0.0,
            best_send_time: "00:00".to_string(),
            best_day: "Monday".to_string(),
            emoji_usage_rate: 0.0,
            avg_subject_length: 0,
            urgency_frequency: 0.0,
        };
        assert_eq!(
            generate(&[], &stats, &ScoringPolicy::default()),
            Insights::default()
        );
    }
}
