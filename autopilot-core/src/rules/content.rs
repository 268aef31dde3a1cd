//! Content recommendation rule.

use async_trait::async_trait;
use serde_json::{json, Value};

use autopilot_llm::ExternalCallGateway;

use crate::context::Context;
use crate::error::RuleError;
use crate::priority::Priority;
use crate::rule::{Payload, Rule};

/// Posting hours used when the context has none
const DEFAULT_POSTING_TIMES: [u32; 4] = [9, 12, 17, 19];

/// Predicted performance when there is no engagement history to compare
const BASELINE_PREDICTION: f64 = 0.75;

/// Generates blog, social and email content ideas for the persona.
pub struct ContentRecommendations;

impl ContentRecommendations {
    fn prompt(ctx: &Context, industry: &str) -> String {
        format!(
            "Generate content recommendations for {}, a {} business.\n\n\
             Current engagement: {}\n\n\
             Provide:\n\
             1. 3 blog post ideas with titles and outlines\n\
             2. 5 social media post concepts\n\
             3. Email marketing subject lines\n\
             4. Content calendar suggestions\n\n\
             Format as JSON with structured recommendations.",
            ctx.persona.name, industry, ctx.metrics.engagement
        )
    }

    /// Scale the baseline by the engagement trend, clamped to [0, 1].
    fn predict(ctx: &Context) -> f64 {
        match ctx.metrics.previous_engagement {
            Some(previous) if previous > 0.0 => {
                (BASELINE_PREDICTION * ctx.metrics.engagement / previous).clamp(0.0, 1.0)
            }
            _ => BASELINE_PREDICTION,
        }
    }
}

#[async_trait]
impl Rule for ContentRecommendations {
    fn id(&self) -> &str {
        "content-01"
    }

    fn name(&self) -> &str {
        "Content Recommendations"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
    }

    fn auto_execute_threshold(&self) -> Option<f64> {
        Some(0.7)
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

        let recommendations = gateway.generate(&Self::prompt(ctx, industry)).await?;

        let posting_times = match &ctx.metrics.optimal_posting_times {
            Some(times) if !times.is_empty() => json!(times),
            _ => json!(DEFAULT_POSTING_TIMES),
        };

        let mut payload = Payload::new();
        payload.insert("recommendations".into(), Value::String(recommendations));
        payload.insert("optimal_posting_times".into(), posting_times);
        payload.insert(
            "content_performance_prediction".into(),
            json!(Self::predict(ctx)),
        );
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Geo, Metrics, Persona};
    use autopilot_llm::{GatewayConfig, MockGenerator};
    use std::sync::Arc;

    fn context(metrics: Metrics) -> Context {
        Context::new(Persona::new("p-1", "Bean There", "coffee"), Geo::default(), metrics)
    }

    #[tokio::test]
    async fn test_payload_uses_context_posting_times() {
        let gateway = ExternalCallGateway::new(
            Arc::new(MockGenerator::default().with_response("Post latte art")),
            GatewayConfig::default(),
        );
        let ctx = context(Metrics {
            engagement: 0.04,
            optimal_posting_times: Some(vec![7, 15]),
            ..Default::default()
        });

        let payload = ContentRecommendations.execute_action(&ctx, &gateway).await.unwrap();

        assert_eq!(payload["recommendations"], json!("Post latte art"));
        assert_eq!(payload["optimal_posting_times"], json!([7, 15]));
        assert_eq!(payload["content_performance_prediction"], json!(0.75));
    }

    #[tokio::test]
    async fn test_default_posting_times() {
        let gateway = ExternalCallGateway::new(Arc::new(MockGenerator::default()), GatewayConfig::default());

        let payload = ContentRecommendations
            .execute_action(&context(Metrics::default()), &gateway)
            .await
            .unwrap();

        assert_eq!(payload["optimal_posting_times"], json!([9, 12, 17, 19]));
    }

    #[test]
    fn test_prediction_follows_engagement_trend() {
        let rising = context(Metrics {
            engagement: 0.06,
            previous_engagement: Some(0.05),
            ..Default::default()
        });
        let collapsing = context(Metrics {
            engagement: 0.01,
            previous_engagement: Some(0.04),
            ..Default::default()
        });

        assert!((ContentRecommendations::predict(&rising) - 0.9).abs() < 1e-9);
        assert!((ContentRecommendations::predict(&collapsing) - 0.1875).abs() < 1e-9);
    }
}
