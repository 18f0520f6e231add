//! Report and scoring command handlers for the CLI.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use inboxintel_core::{Campaign, ScoringPolicy};
use inboxintel_engine::{build_report, score_campaign, IntelligenceReport};

use crate::OutputFormat;

/// Load and validate every campaign in `path`.
///
/// Returns the brand named in the file (if any) alongside the campaigns.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if any campaign
/// fails validation. The error names the campaign position and field.
pub(crate) fn load_input(path: &Path) -> anyhow::Result<(Option<String>, Vec<Campaign>)> {
    let file = inboxintel_core::load_campaigns(path)
        .with_context(|| format!("reading campaigns from {}", path.display()))?;

    let campaigns = file
        .campaigns
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            raw.validate()
                .with_context(|| format!("campaign #{} in {}", idx + 1, path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::info!(
        path = %path.display(),
        campaigns = campaigns.len(),
        "loaded campaigns"
    );

    Ok((file.brand, campaigns))
}

/// Build and print an intelligence report.
///
/// # Errors
///
/// Returns an error if the input cannot be loaded, no brand is available,
/// or report generation fails validation.
pub(crate) fn run_analyze(
    input: &Path,
    brand_override: Option<&str>,
    format: OutputFormat,
    policy: &ScoringPolicy,
) -> anyhow::Result<()> {
    let (file_brand, campaigns) = load_input(input)?;
    let Some(brand) = brand_override.map(str::to_string).or(file_brand) else {
        anyhow::bail!("no brand given; pass --brand or set `brand` in {}", input.display());
    };

    let report = build_report(&brand, &campaigns, policy)
        .with_context(|| format!("building report for '{brand}'"))?;

    tracing::info!(
        brand = %report.brand,
        campaigns = report.total_campaigns,
        overall_score = report.overall_score,
        "report built"
    );

    match format {
        OutputFormat::Markdown => print!("{}", render_markdown(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Print per-campaign scores as a table, most recent first.
///
/// # Errors
///
/// Returns an error if the input cannot be loaded or a campaign fails scoring.
pub(crate) fn run_score(input: &Path, policy: &ScoringPolicy) -> anyhow::Result<()> {
    let (_, mut campaigns) = load_input(input)?;
    if campaigns.is_empty() {
        println!("no campaigns found in {}", input.display());
        return Ok(());
    }
    campaigns.sort_by(|a, b| b.sent_at.cmp(&a.sent_at).then_with(|| a.id.cmp(&b.id)));

    println!(
        "{:<12}{:<18}{:<16}{:<9}{:<13}SUBJECT",
        "ID", "SENT", "CATEGORY", "URGENCY", "PERFORMANCE"
    );
    for campaign in &campaigns {
        let scored = score_campaign(campaign, policy)?;
        println!(
            "{:<12}{:<18}{:<16}{:<9}{:<13}{}",
            campaign.id,
            campaign.sent_at.format("%Y-%m-%d %H:%M"),
            campaign.category,
            scored.urgency_score,
            scored.performance_score,
            campaign.subject
        );
    }

    Ok(())
}

/// Render a report as markdown.
pub(crate) fn render_markdown(report: &IntelligenceReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(out, "# {} Email Intelligence", report.brand);
    let _ = writeln!(out);
    let _ = writeln!(out, "**Overall score**: {}/100", report.overall_score);
    let _ = writeln!(out, "**Campaigns analyzed**: {}", report.total_campaigns);
    let _ = writeln!(out, "**Avg frequency**: {} per week", stats.avg_frequency);
    let _ = writeln!(out, "**Best send time**: {} UTC", stats.best_send_time);
    let _ = writeln!(out, "**Best day**: {}", stats.best_day);
    let _ = writeln!(out, "**Emoji usage**: {}%", stats.emoji_usage_rate);
    let _ = writeln!(
        out,
        "**Avg subject length**: {} words",
        stats.avg_subject_length
    );
    let _ = writeln!(out, "**Urgency frequency**: {}%", stats.urgency_frequency);
    let _ = writeln!(
        out,
        "**Top performing subject**: {}",
        report.top_performing_subject
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Campaigns");
    let _ = writeln!(out);
    let _ = writeln!(out, "| Sent | Category | Subject | Urgency | Performance |");
    let _ = writeln!(out, "|------|----------|---------|---------|-------------|");
    for c in &report.campaigns {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            c.campaign.sent_at.format("%Y-%m-%d %H:%M UTC"),
            c.campaign.category,
            escape_cell(&c.campaign.subject),
            c.urgency_score,
            c.performance_score
        );
    }

    write_list(&mut out, "What's Working", &report.insights.working);
    write_list(&mut out, "Opportunities", &report.insights.opportunities);

    out
}

fn write_list(out: &mut String, heading: &str, items: &[String]) {
    let _ = writeln!(out);
    let _ = writeln!(out, "## {heading}");
    let _ = writeln!(out);
    if items.is_empty() {
        let _ = writeln!(out, "_Nothing stood out in this dataset._");
    }
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
