//! Decision records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::{Payload, Rule};

/// Outcome of one rule in one cycle. Immutable once emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Unique decision id (uuid v4)
    pub id: String,
    pub rule_id: String,
    /// Name of the rule's action
    #[serde(rename = "action")]
    pub action_name: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// True iff confidence met the effective threshold
    pub auto_executed: bool,
    pub timestamp: DateTime<Utc>,
    /// Action result, `{"error": ...}` on failure, empty if not executed
    pub payload: Payload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Decision {
    /// Start a decision for `rule` with an empty payload.
    pub fn for_rule(rule: &dyn Rule, confidence: f64, auto_executed: bool) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rule_id: rule.id().to_string(),
            action_name: rule.name().to_string(),
            confidence,
            auto_executed,
            timestamp: Utc::now(),
            payload: Payload::new(),
            rationale: None,
        }
    }

    /// Replace the payload with `{"error": message}`.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        let mut payload = Payload::new();
        payload.insert("error".to_string(), Value::String(message.into()));
        self.payload = payload;
        self
    }

    /// The action's error message, if it failed
    pub fn error(&self) -> Option<&str> {
        self.payload.get("error").and_then(Value::as_str)
    }

    /// Whether the action ran and failed.
    pub fn is_failed(&self) -> bool {
        self.auto_executed && self.error().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decision() -> Decision {
        Decision {
            id: "d-1".into(),
            rule_id: "seo-01".into(),
            action_name: "Local SEO Audit".into(),
            confidence: 0.75,
            auto_executed: true,
            timestamp: Utc::now(),
            payload: Payload::new(),
            rationale: None,
        }
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(decision()).unwrap();

        assert_eq!(value["action"], json!("Local SEO Audit"));
        assert_eq!(value["rule_id"], json!("seo-01"));
        assert_eq!(value["payload"], json!({}));
        assert!(value.get("rationale").is_none());
        assert!(value.get("action_name").is_none());
    }

    #[test]
    fn test_error_payload() {
        let failed = decision().with_error("Network error: connection reset");

        assert_eq!(
            serde_json::to_value(&failed.payload).unwrap(),
            json!({"error": "Network error: connection reset"})
        );
        assert!(failed.is_failed());
        assert!(!decision().is_failed());
    }
}
