//! The rule capability trait.

use async_trait::async_trait;
use serde_json::{Map, Value};

use autopilot_llm::ExternalCallGateway;

use crate::context::Context;
use crate::error::RuleError;
use crate::priority::Priority;

/// Structured result of an action.
pub type Payload = Map<String, Value>;

/// A prioritized condition/action pair evaluated once per cycle.
///
/// Implementations must not keep mutable state that changes between
/// registration and evaluation; the registry hands out shared references.
#[async_trait]
pub trait Rule: Send + Sync {
    /// Unique, stable id
    fn id(&self) -> &str;

    /// Human-readable name, recorded as the decision's action name
    fn name(&self) -> &str;

    fn priority(&self) -> Priority;

    /// Per-rule auto-execute threshold in [0, 1].
    ///
    /// `None` defers to the engine's autonomy level.
    fn auto_execute_threshold(&self) -> Option<f64> {
        None
    }

    /// Whether this rule applies to the context.
    async fn evaluate_condition(&self, ctx: &Context) -> Result<bool, RuleError>;

    /// Perform the rule's action. External calls go through `gateway`.
    async fn execute_action(
        &self,
        ctx: &Context,
        gateway: &ExternalCallGateway,
    ) -> Result<Payload, RuleError>;
}
