use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ValidationError};

/// Closed set of campaign categories a collector may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Promotional,
    Newsletter,
    AbandonedCart,
    Welcome,
    ProductLaunch,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Promotional,
        Category::Newsletter,
        Category::AbandonedCart,
        Category::Welcome,
        Category::ProductLaunch,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Promotional => "promotional",
            Category::Newsletter => "newsletter",
            Category::AbandonedCart => "abandoned-cart",
            Category::Welcome => "welcome",
            Category::ProductLaunch => "product-launch",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValidationError::new("category", format!("unknown category '{s}'")))
    }
}

/// A validated competitor email campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
    pub category: Category,
    pub cta_count: u32,
    /// Raw body text or HTML, used only for derived signals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Urgency score already computed by the collector, in `[0, 100]`.
    #[serde(default, skip_serializing)]
    pub urgency_override: Option<f64>,
    /// Emoji flag already computed by the collector.
    #[serde(default, skip_serializing)]
    pub has_emoji: Option<bool>,
}

/// Campaign exactly as a collector hands it over, before validation.
///
/// Accepts the legacy `date` and `type` field names alongside `sentAt` and
/// `category`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCampaign {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "date")]
    pub sent_at: String,
    #[serde(default, alias = "type")]
    pub category: String,
    pub cta_count: Option<i64>,
    pub content: Option<String>,
    pub urgency_score: Option<f64>,
    pub has_emoji: Option<bool>,
}

impl RawCampaign {
    /// Validate every field and produce a [`Campaign`].
    ///
    /// A missing `ctaCount` is treated as zero.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first offending field.
    pub fn validate(self) -> Result<Campaign, ValidationError> {
        let id = self.id.trim().to_string();
        if id.is_empty() {
            return Err(ValidationError::new("id", "must be non-empty"));
        }

        let subject = self.subject.trim().to_string();
        if subject.is_empty() {
            return Err(ValidationError::new(
                "subject",
                format!("campaign '{id}' has an empty subject"),
            ));
        }

        let sent_at = DateTime::parse_from_rfc3339(self.sent_at.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                ValidationError::new(
                    "sentAt",
                    format!("campaign '{id}' has unparseable timestamp '{}': {e}", self.sent_at),
                )
            })?;

        let category = self.category.parse::<Category>()?;

        let cta_count = match self.cta_count {
            None => 0,
            Some(n) => u32::try_from(n).map_err(|_| {
                ValidationError::new(
                    "ctaCount",
                    format!("campaign '{id}' has invalid call-to-action count {n}"),
                )
            })?,
        };

        if let Some(score) = self.urgency_score {
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(ValidationError::new(
                    "urgencyScore",
                    format!("campaign '{id}' has urgency score {score} outside [0, 100]"),
                ));
            }
        }

        Ok(Campaign {
            id,
            subject,
            sent_at,
            category,
            cta_count,
            content: self.content.filter(|c| !c.trim().is_empty()),
            urgency_override: self.urgency_score,
            has_emoji: self.has_emoji,
        })
    }
}

/// A campaign file as written by a collector or by hand.
#[derive(Debug, Default, Deserialize)]
pub struct CampaignsFile {
    #[serde(default)]
    pub brand: Option<String>,
    pub campaigns: Vec<RawCampaign>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CampaignsDocument {
    List(Vec<RawCampaign>),
    File(CampaignsFile),
}

impl From<CampaignsDocument> for CampaignsFile {
    fn from(doc: CampaignsDocument) -> Self {
        match doc {
            CampaignsDocument::List(campaigns) => CampaignsFile {
                brand: None,
                campaigns,
            },
            CampaignsDocument::File(file) => file,
        }
    }
}

/// Load raw campaigns from a JSON (`.json`) or YAML (anything else) file.
///
/// The document may be a bare list of campaigns or an object with an optional
/// `brand` and a `campaigns` list. Campaigns are not validated here.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_campaigns(path: &Path) -> Result<CampaignsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    parse_campaigns(&content, is_json)
}

fn parse_campaigns(content: &str, is_json: bool) -> Result<CampaignsFile, ConfigError> {
    let doc: CampaignsDocument = if is_json {
        serde_json::from_str(content)?
    } else {
        serde_yaml::from_str(content)?
    };
    Ok(doc.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawCampaign {
        RawCampaign {
            id: "1".to_string(),
            subject: "FINAL HOURS: 50% Off Everything".to_string(),
            sent_at: "2024-11-29T14:00:00Z".to_string(),
            category: "promotional".to_string(),
            cta_count: Some(3),
            ..RawCampaign::default()
        }
    }

    #[test]
    fn category_parses_kebab_and_snake_case() {
        assert_eq!(
            "abandoned-cart".parse::<Category>().unwrap(),
            Category::AbandonedCart
        );
        assert_eq!(
            "Product_Launch".parse::<Category>().unwrap(),
            Category::ProductLaunch
        );
    }

    #[test]
    fn category_unknown_names_field() {
        let err = "transactional".parse::<Category>().unwrap_err();
        assert_eq!(err.field, "category");
    }

    #[test]
    fn validate_accepts_well_formed_campaign() {
        let campaign = raw().validate().unwrap();
        assert_eq!(campaign.category, Category::Promotional);
        assert_eq!(campaign.cta_count, 3);
        assert_eq!(campaign.sent_at.to_rfc3339(), "2024-11-29T14:00:00+00:00");
    }

    #[test]
    fn validate_normalizes_offset_to_utc() {
        let mut input = raw();
        input.sent_at = "2024-11-29T09:00:00-05:00".to_string();
        let campaign = input.validate().unwrap();
        assert_eq!(campaign.sent_at.to_rfc3339(), "2024-11-29T14:00:00+00:00");
    }

    #[test]
    fn validate_missing_cta_defaults_to_zero() {
        let mut input = raw();
        input.cta_count = None;
        assert_eq!(input.validate().unwrap().cta_count, 0);
    }

    #[test]
    fn validate_rejects_negative_cta() {
        let mut input = raw();
        input.cta_count = Some(-1);
        assert_eq!(input.validate().unwrap_err().field, "ctaCount");
    }

    #[test]
    fn validate_rejects_empty_subject() {
        let mut input = raw();
        input.subject = "   ".to_string();
        assert_eq!(input.validate().unwrap_err().field, "subject");
    }

    #[test]
    fn validate_rejects_empty_id() {
        let mut input = raw();
        input.id = String::new();
        assert_eq!(input.validate().unwrap_err().field, "id");
    }

    #[test]
    fn validate_rejects_bad_timestamp() {
        let mut input = raw();
        input.sent_at = "last tuesday".to_string();
        assert_eq!(input.validate().unwrap_err().field, "sentAt");
    }

    #[test]
    fn validate_rejects_out_of_range_urgency_override() {
        let mut input = raw();
        input.urgency_score = Some(140.0);
        assert_eq!(input.validate().unwrap_err().field, "urgencyScore");
    }

    #[test]
    fn validate_drops_blank_content() {
        let mut input = raw();
        input.content = Some("  \n ".to_string());
        assert!(input.validate().unwrap().content.is_none());
    }

    #[test]
    fn parse_json_list_with_legacy_field_names() {
        let json = r#"[
            {"id": "4", "subject": "Welcome to the Family!", "date": "2024-11-23T09:00:00Z",
             "type": "welcome", "ctaCount": 1}
        ]"#;
        let file = parse_campaigns(json, true).unwrap();
        assert!(file.brand.is_none());
        let campaign = file.campaigns[0].clone().validate().unwrap();
        assert_eq!(campaign.category, Category::Welcome);
    }

    #[test]
    fn parse_yaml_document_with_brand() {
        let yaml = "
brand: Acme
campaigns:
  - id: a
    subject: Your cart is waiting
    sentAt: 2024-11-22T16:30:00Z
    category: abandoned-cart
    ctaCount: 2
";
        let file = parse_campaigns(yaml, false).unwrap();
        assert_eq!(file.brand.as_deref(), Some("Acme"));
        assert_eq!(file.campaigns.len(), 1);
        assert_eq!(file.campaigns[0].cta_count, Some(2));
    }

    #[test]
    fn load_campaigns_missing_file_is_io_error() {
        let err = load_campaigns(Path::new("/nonexistent/campaigns.json")).unwrap_err();
        assert!(matches!(err, ConfigError::FileIo { .. }));
    }
}
