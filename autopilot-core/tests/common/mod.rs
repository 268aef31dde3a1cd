//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use autopilot_core::{
    Context, DecisionEngine, EngineConfig, Geo, Metrics, Payload, Persona, Priority, Rule,
    RuleError,
};
use autopilot_llm::{ExternalCallGateway, GatewayConfig, MockGenerator, TextGenerator};

/// Rule that always applies and asks the generator `prompt`.
pub struct PromptRule {
    pub id: &'static str,
    pub priority: Priority,
    pub threshold: Option<f64>,
    pub prompt: &'static str,
}

impl PromptRule {
    pub fn new(id: &'static str, priority: Priority, prompt: &'static str) -> Arc<dyn Rule> {
        Arc::new(Self {
            id,
            priority,
            threshold: None,
            prompt,
        })
    }
}

#[async_trait]
impl Rule for PromptRule {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.id
    }

    fn priority(&self) -> Priority {
        self.priority
    }

    fn auto_execute_threshold(&self) -> Option<f64> {
        self.threshold
    }

    async fn evaluate_condition(&self, _ctx: &Context) -> Result<bool, RuleError> {
        Ok(true)
    }

    async fn execute_action(
        &self,
        _ctx: &Context,
        gateway: &ExternalCallGateway,
    ) -> Result<Payload, RuleError> {
        let text = gateway.generate(self.prompt).await?;
        let mut payload = Payload::new();
        payload.insert("text".into(), json!(text));
        Ok(payload)
    }
}

pub fn context(industry: &str, region: Option<&str>) -> Context {
    Context::new(
        Persona::new("persona-1", "Bean There", industry),
        region.map(Geo::in_region).unwrap_or_default(),
        Metrics {
            engagement: 0.04,
            ..Default::default()
        },
    )
}

pub fn gateway(mock: &Arc<MockGenerator>) -> ExternalCallGateway {
    ExternalCallGateway::new(Arc::clone(mock) as Arc<dyn TextGenerator>, GatewayConfig::default())
}

pub fn engine(autonomy: f64, gateway: ExternalCallGateway) -> DecisionEngine {
    DecisionEngine::new(EngineConfig::with_autonomy(autonomy), gateway).unwrap()
}
