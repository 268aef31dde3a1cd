//! Built-in marketing rules.
//!
//! | id           | name                    | priority | threshold |
//! |--------------|-------------------------|----------|-----------|
//! | `seo-01`     | Local SEO Audit         | high     | 0.9       |
//! | `scrape-01`  | Social Media Analysis   | medium   | 0.8       |
//! | `content-01` | Content Recommendations | medium   | 0.7       |
//!
//! Each action asks the generator for a JSON-formatted answer. Structured
//! fields are taken from that answer when it parses, otherwise the rule
//! falls back to its defaults.

pub mod content;
pub mod seo;
pub mod social;

use std::sync::Arc;

use serde_json::Value;

pub use content::ContentRecommendations;
pub use seo::LocalSeoAudit;
pub use social::SocialMediaAnalysis;

use crate::rule::Rule;

/// The built-in rules, in registration order.
pub fn default_rules() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(LocalSeoAudit),
        Arc::new(SocialMediaAnalysis),
        Arc::new(ContentRecommendations),
    ]
}

/// Extract `field` from generator output that is a JSON object.
///
/// Tolerates a fenced ```json block around the object.
pub(crate) fn json_field(text: &str, field: &str) -> Option<Value> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);

    match serde_json::from_str::<Value>(body.trim()) {
        Ok(Value::Object(mut map)) => map.remove(field),
        _ => None,
    }
}
