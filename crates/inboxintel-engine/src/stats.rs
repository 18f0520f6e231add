//! Brand-level aggregation over a scored campaign set.
//!
//! Every accumulation runs over a canonically ordered copy of the input
//! (by `sentAt`, then `id`) so the result does not depend on input order,
//! down to floating-point summation order.

use chrono::{Datelike, Timelike, Weekday};
use inboxintel_core::StatsPolicy;

use crate::error::EngineError;
use crate::types::{round1, BrandStats, ScoredCampaign};

const SECONDS_PER_DAY: f64 = 86_400.0;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Compute brand statistics for a non-empty campaign set.
///
/// # Errors
///
/// Returns [`EngineError::EmptyInput`] if `campaigns` is empty.
pub fn aggregate(
    campaigns: &[ScoredCampaign],
    policy: &StatsPolicy,
) -> Result<BrandStats, EngineError> {
    if campaigns.is_empty() {
        return Err(EngineError::EmptyInput);
    }

    let ordered = canonical_order(campaigns);
    let count = ordered.len();

    let emoji = ordered
        .iter()
        .filter(|c| c.signals.subject_has_emoji)
        .count();
    let urgent = ordered
        .iter()
        .filter(|c| c.urgency_score > policy.urgency_threshold)
        .count();
    let words: u64 = ordered
        .iter()
        .map(|c| u64::from(c.signals.subject_words))
        .sum();

    let best_hour = argmax_bucket(&hour_means(&ordered)).unwrap_or(0);
    let best_day = argmax_bucket(&weekday_means(&ordered)).unwrap_or(0);

    Ok(BrandStats {
        avg_frequency: avg_frequency(&ordered),
        best_send_time: format_hour(best_hour),
        best_day: weekday_name(WEEKDAYS[best_day]).to_string(),
        emoji_usage_rate: percent(emoji, count),
        avg_subject_length: mean_rounded(words, count),
        urgency_frequency: percent(urgent, count),
    })
}

/// Campaigns sorted by `sentAt` ascending, then `id`.
pub(crate) fn canonical_order(campaigns: &[ScoredCampaign]) -> Vec<&ScoredCampaign> {
    let mut ordered: Vec<&ScoredCampaign> = campaigns.iter().collect();
    ordered.sort_by(|a, b| {
        a.campaign
            .sent_at
            .cmp(&b.campaign.sent_at)
            .then_with(|| a.campaign.id.cmp(&b.campaign.id))
    });
    ordered
}

/// Campaigns per 7 days over the observed span.
///
/// A span shorter than one day yields the raw campaign count.
#[allow(clippy::cast_precision_loss)]
fn avg_frequency(ordered: &[&ScoredCampaign]) -> f64 {
    let count = ordered.len() as f64;
    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return 0.0;
    };
    let span_secs = (last.campaign.sent_at - first.campaign.sent_at).num_seconds();
    let span_days = span_secs as f64 / SECONDS_PER_DAY;
    if span_days < 1.0 {
        return count;
    }
    round1(count / span_days * 7.0)
}

/// Mean performance per UTC hour; `None` for empty buckets.
pub(crate) fn hour_means(ordered: &[&ScoredCampaign]) -> Vec<Option<f64>> {
    bucket_means(ordered, 24, |c| c.campaign.sent_at.hour() as usize)
}

/// Mean performance per weekday, Monday first; `None` for empty buckets.
pub(crate) fn weekday_means(ordered: &[&ScoredCampaign]) -> Vec<Option<f64>> {
    bucket_means(ordered, 7, |c| {
        c.campaign.sent_at.weekday().num_days_from_monday() as usize
    })
}

#[allow(clippy::cast_precision_loss)]
fn bucket_means<F>(ordered: &[&ScoredCampaign], buckets: usize, key: F) -> Vec<Option<f64>>
where
    F: Fn(&ScoredCampaign) -> usize,
{
    let mut sums = vec![(0.0_f64, 0_usize); buckets];
    for &campaign in ordered {
        let slot = &mut sums[key(campaign)];
        slot.0 += campaign.performance_score;
        slot.1 += 1;
    }
    sums.into_iter()
        .map(|(sum, n)| (n > 0).then(|| sum / n as f64))
        .collect()
}

/// Index of the highest mean; the earliest bucket wins ties.
pub(crate) fn argmax_bucket(means: &[Option<f64>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, mean) in means.iter().enumerate() {
        let Some(mean) = *mean else { continue };
        match best {
            Some((_, top)) if mean <= top => {}
            _ => best = Some((idx, mean)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 * 100.0 / total as f64)
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn mean_rounded(sum: u64, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as u32
}

pub(crate) fn format_hour(hour: usize) -> String {
    format!("{hour:02}:00")
}

pub(crate) fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
