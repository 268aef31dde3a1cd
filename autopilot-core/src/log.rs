//! Decision log - append-only history for one engine instance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::decision::Decision;

/// Append-only, in-memory decision history.
///
/// Cloning shares the same history.
#[derive(Clone, Default)]
pub struct DecisionLog {
    entries: Arc<RwLock<Vec<Decision>>>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decision.
    pub async fn append(&self, decision: Decision) {
        self.entries.write().await.push(decision);
    }

    /// All decisions in insertion order.
    pub async fn all(&self) -> Vec<Decision> {
        self.entries.read().await.clone()
    }

    /// The most recent decisions, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<Decision> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(limit).cloned().collect()
    }

    /// Decisions emitted by one rule, in insertion order.
    pub async fn by_rule(&self, rule_id: &str) -> Vec<Decision> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .filter(|d| d.rule_id == rule_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Get log statistics
    pub async fn stats(&self) -> DecisionStats {
        let entries = self.entries.read().await;

        let total = entries.len();
        let auto_executed = entries.iter().filter(|d| d.auto_executed).count();
        let failed = entries.iter().filter(|d| d.is_failed()).count();

        DecisionStats {
            total,
            auto_executed,
            failed,
            automation_rate: auto_executed as f64 / total.max(1) as f64,
        }
    }
}

/// Decision log statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionStats {
    pub total: usize,
    pub auto_executed: usize,
    pub failed: usize,
    /// auto_executed / total, 0 when empty
    pub automation_rate: f64,
}
