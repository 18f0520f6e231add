//! Text signal extraction: urgency keywords, deadlines, emoji, word counts.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use inboxintel_core::Campaign;
use regex::Regex;

use crate::types::CampaignSignals;

/// Scarcity and time-pressure vocabulary.
///
/// Entries are lowercase and matched on whole words; multi-word entries match
/// whole phrases. Each entry counts at most once per campaign, and entries
/// overlap on purpose: a phrase and each listed word inside it count
/// separately, so "final hours" yields three hits (`final`, `hours`,
/// `final hours`) and "ending soon" two (`ending`, `ending soon`).
pub(crate) const URGENCY_KEYWORDS: &[&str] = &[
    "final",
    "hours",
    "final hours",
    "last chance",
    "last day",
    "ending soon",
    "ends",
    "ending",
    "today only",
    "tonight",
    "hurry",
    "limited",
    "limited time",
    "expires",
    "expiring",
    "deadline",
    "don't miss",
    "flash",
    "countdown",
    "almost gone",
    "running out",
    "selling fast",
    "urgent",
    "waiting",
    "missed",
    "before it's gone",
    "now or never",
];

static DEADLINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        # clock times
        \b\d{1,2}(:\d{2})?\s?(am|pm)\b
        | \b\d{1,2}:\d{2}\b
        | \b(midnight|tonight|noon|today|tomorrow)\b
        # countdowns need a lead-in or a trailing 'left'
        | \b\d+\s*(hours?|hrs?|minutes?|mins?|days?)\s+(left|remaining|to\s+go)\b
        | \b(in|only|just)\s+\d+\s*(hours?|hrs?|minutes?|mins?|days?)\b
        | \b(final|last)\s+(\d+\s+)?(hours?|minutes?|days?)\b
        | \bnext\s+\d+\s+(hours?|minutes?|days?)\b
        # numeric dates need a year or a lead-in
        | \b(0?[1-9]|1[0-2])/(0?[1-9]|[12]\d|3[01])/(\d{4}|\d{2})\b
        | \b(until|by|ends?|through|thru|before|on)\s+(0?[1-9]|1[0-2])/(0?[1-9]|[12]\d|3[01])\b
        | \b\d{4}-\d{2}-\d{2}\b
        # month names
        | \b(jan(uary)?|feb(ruary)?|mar(ch)?|apr(il)?|may|june?|july?|aug(ust)?
            |sep(t(ember)?)?|oct(ober)?|nov(ember)?|dec(ember)?)\.?\s+\d{1,2}(st|nd|rd|th)?\b
        | \b(ends?|until|through|thru|by)\s+(mon|tues|wednes|thurs|fri|satur|sun)day\b
        ",
    )
    .expect("valid deadline regex")
});

static TAGS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid tags regex"));

/// Script, style and comment blocks whose text never reaches the reader.
static HIDDEN_BLOCKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
        .expect("valid hidden blocks regex")
});

/// Wrap width for rendered content; wide enough that phrases stay on one line.
const CONTENT_WRAP_WIDTH: usize = 1_000;

/// Extract every signal the scorer and aggregator need from a campaign.
pub(crate) fn extract_signals(campaign: &Campaign) -> CampaignSignals {
    let body = campaign.content.as_deref().map(strip_html).unwrap_or_default();
    let combined = format!("{} {}", campaign.subject, body);

    CampaignSignals {
        keyword_hits: urgency_keyword_hits(&combined),
        has_deadline: has_deadline(&combined),
        has_urgency_emoji: combined.chars().any(is_urgency_emoji),
        subject_has_emoji: campaign
            .has_emoji
            .unwrap_or_else(|| campaign.subject.chars().any(is_emoji)),
        subject_words: word_count(&campaign.subject),
    }
}

/// Count distinct urgency keywords present in `text`.
pub(crate) fn urgency_keyword_hits(text: &str) -> u32 {
    let normalized = normalize_words(text);
    let hits: BTreeSet<&str> = URGENCY_KEYWORDS
        .iter()
        .copied()
        .filter(|kw| normalized.contains(&format!(" {kw} ")))
        .collect();
    u32::try_from(hits.len()).unwrap_or(u32::MAX)
}

pub(crate) fn has_deadline(text: &str) -> bool {
    DEADLINE_RE.is_match(text)
}

/// Number of whitespace-separated tokens containing a letter or digit.
///
/// Standalone emoji and punctuation are not words.
pub(crate) fn word_count(text: &str) -> u32 {
    let n = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count();
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Lowercase words joined by single spaces and padded with a space on each
/// side, so phrase lookups can use `contains(" phrase ")`.
fn normalize_words(text: &str) -> String {
    let mut out = String::from(" ");
    for word in text.split_whitespace() {
        let w = word
            .replace('\u{2019}', "'")
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if !w.is_empty() {
            out.push_str(&w);
            out.push(' ');
        }
    }
    out
}

/// Render HTML content to the text a reader sees, entities decoded.
fn strip_html(html: &str) -> String {
    let visible = HIDDEN_BLOCKS_RE.replace_all(html, " ");
    html2text::from_read(visible.as_bytes(), CONTENT_WRAP_WIDTH)
        .unwrap_or_else(|_| TAGS_RE.replace_all(&visible, " ").into_owned())
}

/// Whether `c` is a pictographic emoji (or a dingbat commonly rendered as one).
pub(crate) fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF
            | 0x2600..=0x27BF
            | 0x2300..=0x23FF
            | 0x2B00..=0x2BFF
            | 0x203C
            | 0x2049
            | 0x3030
            | 0x303D
    )
}

/// Glyphs that read as time pressure: fire, clocks, hourglasses, sirens,
/// lightning, exclamation marks, warning signs.
pub(crate) fn is_urgency_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F525
            | 0x23F0..=0x23F3
            | 0x231B
            | 0x1F550..=0x1F567
            | 0x1F6A8
            | 0x26A1
            | 0x26A0
            | 0x203C
            | 0x2757
            | 0x1F4A5
            | 0x1F3C3
    )
}
