//! Business context supplied to a cycle.
//!
//! A `Context` is an immutable snapshot: the engine only ever borrows it,
//! so nothing inside a cycle can change what later rules see.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Snapshot of persona, geography and metrics for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub persona: Persona,
    #[serde(default)]
    pub geo: Geo,
    #[serde(default)]
    pub metrics: Metrics,
}

impl Context {
    pub fn new(persona: Persona, geo: Geo, metrics: Metrics) -> Self {
        Self { persona, geo, metrics }
    }

    /// Parse a context from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// The region, if present and non-blank.
    pub fn region(&self) -> Option<&str> {
        non_blank(self.geo.region.as_deref())
    }

    /// The industry, if non-blank.
    pub fn industry(&self) -> Option<&str> {
        non_blank(Some(self.persona.industry.as_str()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The business the engine acts for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone_profile: Option<Map<String, Value>>,
}

impl Persona {
    pub fn new(id: impl Into<String>, name: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            industry: industry.into(),
            tone_profile: None,
        }
    }
}

/// Geographic context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Local events, each a small string map (name, date, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<HashMap<String, String>>>,
}

impl Geo {
    pub fn in_region(region: impl Into<String>) -> Self {
        Self {
            region: Some(region.into()),
            ..Default::default()
        }
    }
}

/// Engagement metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub engagement: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_engagement: Option<f64>,
    /// Hours of the day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_posting_times: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitor_metrics: Option<Map<String, Value>>,
}
