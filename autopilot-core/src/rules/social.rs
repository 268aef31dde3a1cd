//! Social media analysis rule.

use async_trait::async_trait;
use serde_json::{json, Value};

use autopilot_llm::ExternalCallGateway;

use super::json_field;
use crate::context::Context;
use crate::error::RuleError;
use crate::priority::Priority;
use crate::rule::{Payload, Rule};

/// Analyzes industry trends and competitor activity on social media.
pub struct SocialMediaAnalysis;

impl SocialMediaAnalysis {
    fn prompt(industry: &str) -> String {
        format!(
            "Analyze social media trends and competitor activity for the {} industry.\n\
             Focus on content themes, engagement patterns, and market opportunities.\n\n\
             Provide insights on:\n\
             1. Trending topics in the industry\n\
             2. Competitor content strategies\n\
             3. Engagement optimization opportunities\n\
             4. Market gaps to exploit\n\n\
             Format as JSON with trending_topics (topic, relevance) and competitor_insights.",
            industry
        )
    }

    fn default_topics() -> Value {
        json!([
            {"topic": "sustainability", "relevance": 0.8},
            {"topic": "digital transformation", "relevance": 0.7},
            {"topic": "customer experience", "relevance": 0.9}
        ])
    }

    fn default_insights() -> Value {
        json!({
            "avg_engagement": 0.05,
            "posting_frequency": "2-3 times per week",
            "top_content_types": ["educational", "behind-the-scenes", "customer stories"]
        })
    }
}

#[async_trait]
impl Rule for SocialMediaAnalysis {
    fn id(&self) -> &str {
        "scrape-01"
    }

    fn name(&self) -> &str {
        "Social Media Analysis"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn auto_execute_threshold(&self) -> Option<f64> {
        Some(0.8)
    }

    async fn evaluate_condition(&self, ctx: &Context) -> Result<bool, RuleError> {
        Ok(ctx.industry().is_some())
    }

    async fn execute_action(
        &self,
        ctx: &Context,
        gateway: &ExternalCallGateway,
    ) -> Result<Payload, RuleError> {
        let industry = ctx
            .industry()
            .ok_or_else(|| RuleError::MissingContext("persona.industry".into()))?;

        let analysis = gateway.generate(&Self::prompt(industry)).await?;

        let trending_topics = match json_field(&analysis, "trending_topics") {
            Some(Value::Array(items)) if !items.is_empty() => Value::Array(items),
            _ => Self::default_topics(),
        };

        // Competitor figures supplied by the caller win over the model's
        let competitor_insights = match (
            &ctx.metrics.competitor_metrics,
            json_field(&analysis, "competitor_insights"),
        ) {
            (Some(metrics), _) if !metrics.is_empty() => Value::Object(metrics.clone()),
            (_, Some(Value::Object(insights))) => Value::Object(insights),
            _ => Self::default_insights(),
        };

        let mut payload = Payload::new();
        payload.insert("analysis".into(), Value::String(analysis));
        payload.insert("trending_topics".into(), trending_topics);
        payload.insert("competitor_insights".into(), competitor_insights);
        Ok(payload)
    }
}
