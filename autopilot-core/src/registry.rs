//! Rule registry - priority-ordered rule set.

use std::cmp::Reverse;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::error::{EngineError, Result};
use crate::rule::Rule;

/// Registry of rules, kept sorted by descending priority weight.
///
/// Ties keep insertion order.
pub struct RuleRegistry {
    rules: RwLock<Vec<Arc<dyn Rule>>>,
}

impl RuleRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(Vec::new()),
        }
    }

    /// Register a rule.
    ///
    /// Fails without touching the registry if the id is taken or the
    /// rule's threshold lies outside [0, 1].
    pub async fn register(&self, rule: Arc<dyn Rule>) -> Result<()> {
        if let Some(threshold) = rule.auto_execute_threshold() {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(EngineError::InvalidThreshold {
                    rule_id: rule.id().to_string(),
                    threshold,
                });
            }
        }

        let mut rules = self.rules.write().await;
        if rules.iter().any(|r| r.id() == rule.id()) {
            return Err(EngineError::DuplicateRuleId(rule.id().to_string()));
        }

        info!(
            rule_id = %rule.id(),
            rule_name = %rule.name(),
            priority = %rule.priority(),
            "Rule registered"
        );

        rules.push(rule);
        // Vec::sort_by_key is stable, so equal weights keep insertion order
        rules.sort_by_key(|r| Reverse(r.priority().weight()));
        Ok(())
    }

    /// Register several rules, stopping at the first failure.
    pub async fn register_all(&self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) -> Result<()> {
        for rule in rules {
            self.register(rule).await?;
        }
        Ok(())
    }

    /// Snapshot of the rules in evaluation order.
    pub async fn all(&self) -> Vec<Arc<dyn Rule>> {
        self.rules.read().await.clone()
    }

    /// Check if a rule id is registered.
    pub async fn contains(&self, rule_id: &str) -> bool {
        self.rules.read().await.iter().any(|r| r.id() == rule_id)
    }

    pub async fn len(&self) -> usize {
        self.rules.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rules.read().await.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
