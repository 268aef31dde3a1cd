//! Error types for the decision engine.

use autopilot_llm::LlmError;
use thiserror::Error;

/// Errors raised by engine construction and configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A rule with this id is already registered
    #[error("Duplicate rule id: {0}")]
    DuplicateRuleId(String),

    /// Priority label outside the closed set
    #[error("Unknown priority: {0}")]
    UnknownPriority(String),

    /// Auto-execute threshold outside [0, 1]
    #[error("Invalid threshold for rule {rule_id}: {threshold}")]
    InvalidThreshold { rule_id: String, threshold: f64 },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML (de)serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised by a rule's condition or action.
///
/// These never escape a cycle: condition errors skip the rule and action
/// errors become the decision's error payload.
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    #[error("Condition failed: {0}")]
    Condition(String),

    #[error("Action failed: {0}")]
    Action(String),

    /// The context lacks a field the rule needs
    #[error("Missing context: {0}")]
    MissingContext(String),

    /// Failure of the external call beneath an action
    #[error(transparent)]
    External(#[from] LlmError),
}
