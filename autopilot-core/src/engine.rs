//! Decision engine - runs evaluation cycles over the rule registry.
//!
//! One cycle walks the registered rules in priority order, strictly
//! sequentially:
//!
//! 1. Evaluate the condition (errors and panics skip the rule)
//! 2. Look up the confidence for the rule's priority
//! 3. Compare it with the rule's threshold, or the autonomy level
//! 4. If authorized, run the action through the external call gateway
//! 5. Record the decision, publish it, and add it to the cycle result
//!
//! A failing action still yields a decision, with `{"error": message}` as
//! its payload. Nothing one rule does can stop the rules after it.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use autopilot_llm::{ExternalCallGateway, TextGenerator};

use crate::config::EngineConfig;
use crate::context::Context;
use crate::decision::Decision;
use crate::error::Result;
use crate::log::DecisionLog;
use crate::priority::confidence;
use crate::registry::RuleRegistry;
use crate::rule::{Payload, Rule};
use crate::rules;

/// Counters for one cycle, logged when it finishes and returned by
/// `run_cycle_with_summary`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub evaluated: usize,
    pub matched: usize,
    pub auto_executed: usize,
    pub failed: usize,
    /// Rules skipped because their condition errored or panicked
    pub skipped_on_error: usize,
}

/// The rule-driven decision engine.
pub struct DecisionEngine {
    config: EngineConfig,
    registry: RuleRegistry,
    gateway: ExternalCallGateway,
    log: DecisionLog,
    events: broadcast::Sender<Decision>,
}

impl DecisionEngine {
    /// Create an engine with no rules.
    pub fn new(config: EngineConfig, gateway: ExternalCallGateway) -> Result<Self> {
        config.validate()?;
        let (events, _) = broadcast::channel(config.general.event_buffer);

        info!(
            engine_id = %config.engine_id,
            autonomy_level = config.autonomy_level,
            generator = %gateway.generator_id(),
            "Decision engine created"
        );

        Ok(Self {
            config,
            registry: RuleRegistry::new(),
            gateway,
            log: DecisionLog::new(),
            events,
        })
    }

    /// Create an engine whose gateway wraps `generator` using the
    /// config's gateway settings.
    pub fn with_generator(config: EngineConfig, generator: Arc<dyn TextGenerator>) -> Result<Self> {
        let gateway = ExternalCallGateway::new(generator, (&config.gateway).into());
        Self::new(config, gateway)
    }

    /// Register the built-in marketing rules.
    pub async fn with_default_rules(self) -> Result<Self> {
        self.registry.register_all(rules::default_rules()).await?;
        Ok(self)
    }

    /// Register a rule at runtime.
    pub async fn register(&self, rule: Arc<dyn Rule>) -> Result<()> {
        self.registry.register(rule).await
    }

    /// Run one evaluation cycle against `ctx`.
    ///
    /// Returns the decisions in evaluation order. Dropping the returned
    /// future cancels the external call currently in flight.
    pub async fn run_cycle(&self, ctx: &Context) -> Vec<Decision> {
        self.run_cycle_with_summary(ctx).await.0
    }

    /// Like `run_cycle`, also returning the cycle's counters.
    pub async fn run_cycle_with_summary(&self, ctx: &Context) -> (Vec<Decision>, CycleSummary) {
        let cycle_id = uuid::Uuid::new_v4();
        let rules = self.registry.all().await;
        let mut summary = CycleSummary::default();
        let mut decisions = Vec::new();

        info!(
            cycle_id = %cycle_id,
            persona_id = %ctx.persona.id,
            rules = rules.len(),
            "Cycle started"
        );

        for rule in rules {
            summary.evaluated += 1;

            let applies = match self.evaluate(rule.as_ref(), ctx).await {
                Ok(applies) => applies,
                Err(message) => {
                    warn!(
                        cycle_id = %cycle_id,
                        rule_id = %rule.id(),
                        error = %message,
                        "Condition failed, skipping rule"
                    );
                    summary.skipped_on_error += 1;
                    continue;
                }
            };

            if !applies {
                debug!(cycle_id = %cycle_id, rule_id = %rule.id(), "Condition not met");
                continue;
            }
            summary.matched += 1;

            let confidence = confidence(rule.priority());
            let threshold = rule
                .auto_execute_threshold()
                .unwrap_or(self.config.autonomy_level);
            let auto_executed = confidence >= threshold;

            debug!(
                cycle_id = %cycle_id,
                rule_id = %rule.id(),
                confidence = confidence,
                threshold = threshold,
                auto_executed = auto_executed,
                "Rule matched"
            );

            let mut decision = Decision::for_rule(rule.as_ref(), confidence, auto_executed);

            if auto_executed {
                summary.auto_executed += 1;
                match self.execute(rule.as_ref(), ctx).await {
                    Ok(payload) => decision.payload = payload,
                    Err(message) => {
                        error!(
                            cycle_id = %cycle_id,
                            rule_id = %rule.id(),
                            error = %message,
                            "Action failed"
                        );
                        summary.failed += 1;
                        decision = decision.with_error(message);
                    }
                }
            }

            self.record(decision.clone()).await;
            decisions.push(decision);
        }

        info!(
            cycle_id = %cycle_id,
            evaluated = summary.evaluated,
            matched = summary.matched,
            auto_executed = summary.auto_executed,
            failed = summary.failed,
            skipped_on_error = summary.skipped_on_error,
            "Cycle finished"
        );

        (decisions, summary)
    }

    /// Evaluate a condition, turning errors and panics into a message.
    async fn evaluate(&self, rule: &dyn Rule, ctx: &Context) -> std::result::Result<bool, String> {
        match AssertUnwindSafe(rule.evaluate_condition(ctx))
            .catch_unwind()
            .await
        {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic) => Err(panic_message(panic)),
        }
    }

    /// Run an action, turning errors and panics into a message.
    async fn execute(&self, rule: &dyn Rule, ctx: &Context) -> std::result::Result<Payload, String> {
        match AssertUnwindSafe(rule.execute_action(ctx, &self.gateway))
            .catch_unwind()
            .await
        {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic) => Err(panic_message(panic)),
        }
    }

    async fn record(&self, decision: Decision) {
        self.log.append(decision.clone()).await;
        // No subscribers is not an error
        let _ = self.events.send(decision);
    }

    /// Subscribe to decisions as they are emitted.
    pub fn subscribe(&self) -> broadcast::Receiver<Decision> {
        self.events.subscribe()
    }

    /// Every decision this engine has emitted, in order.
    pub async fn history(&self) -> Vec<Decision> {
        self.log.all().await
    }

    pub fn log(&self) -> &DecisionLog {
        &self.log
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn gateway(&self) -> &ExternalCallGateway {
        &self.gateway
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn autonomy_level(&self) -> f64 {
        self.config.autonomy_level
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("panicked: {}", detail)
}
