//! Priority classes and the confidence model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Priority class of a rule.
///
/// The discriminant is the ordering weight: higher runs first. Labels
/// parse case-insensitively, both through `FromStr` and serde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
    Critical = 4,
}

impl Priority {
    /// Ordering weight (critical=4 .. low=1)
    pub fn weight(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(EngineError::UnknownPriority(other.to_string())),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = EngineError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

/// Confidence assigned to a priority class.
pub fn confidence(priority: Priority) -> f64 {
    match priority {
        Priority::Critical => 0.9,
        Priority::High => 0.75,
        Priority::Medium => 0.5,
        Priority::Low => 0.3,
    }
}

/// Confidence for a raw priority label; unrecognized labels get 0.5.
pub fn confidence_for_label(label: &str) -> f64 {
    label.parse::<Priority>().map(confidence).unwrap_or(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_mapping() {
        assert_eq!(confidence(Priority::Critical), 0.9);
        assert_eq!(confidence(Priority::High), 0.75);
        assert_eq!(confidence(Priority::Medium), 0.5);
        assert_eq!(confidence(Priority::Low), 0.3);
    }

    #[test]
    fn test_unknown_label_confidence() {
        assert_eq!(confidence_for_label("HIGH"), 0.75);
        assert_eq!(confidence_for_label("urgent"), 0.5);
    }

    #[test]
    fn test_weights_order() {
        assert_eq!(Priority::Critical.weight(), 4);
        assert_eq!(Priority::Low.weight(), 1);
        assert!(Priority::High > Priority::Medium);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!("medium".parse::<Priority>().unwrap(), Priority::Medium);
        let err = "urgent".parse::<Priority>().unwrap_err();
        assert!(matches!(err, EngineError::UnknownPriority(label) if label == "urgent"));
    }

    #[test]
    fn test_serde_matches_from_str() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::from_str::<Priority>("\"HIGH\"").unwrap(), Priority::High);
        assert_eq!(" Low ".parse::<Priority>().unwrap(), Priority::Low);

        let err = serde_json::from_str::<Priority>("\"urgent\"").unwrap_err();
        assert!(err.to_string().contains("Unknown priority: urgent"));
    }
}
