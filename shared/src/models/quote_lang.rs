//! Country Quote-Lang Model
//!
//! Per-country, per-language marketing copy shown on the public rate
//! page. Field names come from a fixed registry; the language tag is
//! part of the registry entry, never inferred from the key at runtime.

use serde::{Deserialize, Serialize};

/// Quote-lang row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CountryQuoteLang {
    pub id: i64,
    pub country_id: i64,
    /// Allow-listed field key (see [`QUOTE_FIELDS`])
    pub name: String,
    /// "en", "local", or none for language-neutral fields
    pub lang: Option<String>,
    pub description: String,
}

/// Registry entry for a recognized marketing field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteField {
    pub key: &'static str,
    pub lang: Option<&'static str>,
}

/// The allow-list of recognized marketing-field keys.
///
/// Any other key arriving in a country payload is ignored.
pub const QUOTE_FIELDS: &[QuoteField] = &[
    QuoteField { key: "business_title_en", lang: Some("en") },
    QuoteField { key: "business_title_local", lang: Some("local") },
    QuoteField { key: "business_description_en", lang: Some("en") },
    QuoteField { key: "business_description_local", lang: Some("local") },
    QuoteField { key: "business_cta_en", lang: Some("en") },
    QuoteField { key: "business_cta_local", lang: Some("local") },
    QuoteField { key: "personal_title_en", lang: Some("en") },
    QuoteField { key: "personal_title_local", lang: Some("local") },
    QuoteField { key: "personal_description_en", lang: Some("en") },
    QuoteField { key: "personal_description_local", lang: Some("local") },
    QuoteField { key: "personal_cta_en", lang: Some("en") },
    QuoteField { key: "personal_cta_local", lang: Some("local") },
    QuoteField { key: "footer_en", lang: Some("en") },
    QuoteField { key: "footer_local", lang: Some("local") },
    QuoteField { key: "meta_title", lang: None },
    QuoteField { key: "meta_description", lang: None },
];

/// Look up a key in the registry
pub fn quote_field(key: &str) -> Option<&'static QuoteField> {
    QUOTE_FIELDS.iter().find(|f| f.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_language_from_entry() {
        assert_eq!(quote_field("business_title_en").unwrap().lang, Some("en"));
        assert_eq!(quote_field("footer_local").unwrap().lang, Some("local"));
        assert_eq!(quote_field("meta_title").unwrap().lang, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(quote_field("business_title_fr").is_none());
        assert!(quote_field("password").is_none());
    }

    #[test]
    fn registry_keys_are_unique() {
        for (i, a) in QUOTE_FIELDS.iter().enumerate() {
            for b in &QUOTE_FIELDS[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }
}
