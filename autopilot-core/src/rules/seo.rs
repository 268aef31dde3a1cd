//! Local SEO audit rule.

use async_trait::async_trait;
use serde_json::{json, Value};

use autopilot_llm::ExternalCallGateway;

use super::json_field;
use crate::context::Context;
use crate::error::RuleError;
use crate::priority::Priority;
use crate::rule::{Payload, Rule};

const DEFAULT_RECOMMENDATIONS: [&str; 3] = [
    "Focus on primary category keywords",
    "Generate more customer reviews",
    "Optimize Google My Business listing",
];

/// Audits local search visibility for the persona's region.
///
/// Applies whenever the context names a region.
pub struct LocalSeoAudit;

impl LocalSeoAudit {
    fn prompt(ctx: &Context, region: &str) -> String {
        let industry = ctx.industry().unwrap_or("local");
        let mut prompt = format!(
            "Analyze local SEO opportunities for a {} business named {} in {}.\n\n\
             Provide specific recommendations for:\n\
             1. Local keyword optimization\n\
             2. Google My Business improvements\n\
             3. Local citation opportunities\n\
             4. Competitor analysis insights\n",
            industry, ctx.persona.name, region
        );

        if let Some(events) = ctx.geo.events.as_ref().filter(|e| !e.is_empty()) {
            let names: Vec<&str> = events
                .iter()
                .filter_map(|e| e.get("name").map(String::as_str))
                .collect();
            if !names.is_empty() {
                prompt.push_str(&format!("\nUpcoming local events: {}\n", names.join(", ")));
            }
        }

        prompt.push_str("\nFormat as JSON with a recommendations array.");
        prompt
    }
}

#[async_trait]
impl Rule for LocalSeoAudit {
    fn id(&self) -> &str {
        "seo-01"
    }

    fn name(&self) -> &str {
        "Local SEO Audit"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn auto_execute_threshold(&self) -> Option<f64> {
        Some(0.9)
    }

    async fn evaluate_condition(&self, ctx: &Context) -> Result<bool, RuleError> {
        Ok(ctx.region().is_some())
    }

    async fn execute_action(
        &self,
        ctx: &Context,
        gateway: &ExternalCallGateway,
    ) -> Result<Payload, RuleError> {
        let region = ctx
            .region()
            .ok_or_else(|| RuleError::MissingContext("geo.region".into()))?;

        let analysis = gateway.generate(&Self::prompt(ctx, region)).await?;

        let recommendations = match json_field(&analysis, "recommendations") {
            Some(Value::Array(items)) if !items.is_empty() => Value::Array(items),
            _ => json!(DEFAULT_RECOMMENDATIONS),
        };

        let mut payload = Payload::new();
        payload.insert("analysis".into(), Value::String(analysis));
        payload.insert("region".into(), Value::String(region.to_string()));
        payload.insert("recommendations".into(), recommendations);
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Geo, Metrics, Persona};
    use autopilot_llm::{GatewayConfig, MockGenerator, TextGenerator};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn gateway(mock: &Arc<MockGenerator>) -> ExternalCallGateway {
        ExternalCallGateway::new(Arc::clone(mock) as Arc<dyn TextGenerator>, GatewayConfig::default())
    }

    fn context(region: &str) -> Context {
        Context::new(
            Persona::new("p-1", "Bean There", "coffee"),
            Geo::in_region(region),
            Metrics::default(),
        )
    }

    #[tokio::test]
    async fn test_condition_requires_region() {
        assert!(LocalSeoAudit.evaluate_condition(&context("Austin")).await.unwrap());
        assert!(!LocalSeoAudit.evaluate_condition(&context("  ")).await.unwrap());
    }

    #[tokio::test]
    async fn test_structured_answer_is_used() {
        let mock = Arc::new(
            MockGenerator::default()
                .with_response(r#"{"recommendations": ["Claim the Austin listing"]}"#),
        );

        let payload = LocalSeoAudit
            .execute_action(&context("Austin"), &gateway(&mock))
            .await
            .unwrap();

        assert_eq!(payload["region"], json!("Austin"));
        assert_eq!(payload["recommendations"], json!(["Claim the Austin listing"]));

        let prompt = &mock.prompts().await[0];
        assert!(prompt.contains("coffee business named Bean There in Austin"));
    }

    #[tokio::test]
    async fn test_prose_answer_falls_back_to_defaults() {
        let mock = Arc::new(MockGenerator::default().with_response("Get more reviews."));

        let mut ctx = context("Austin");
        ctx.geo.events = Some(vec![HashMap::from([("name".to_string(), "SXSW".to_string())])]);

        let payload = LocalSeoAudit
            .execute_action(&ctx, &gateway(&mock))
            .await
            .unwrap();

        assert_eq!(payload["analysis"], json!("Get more reviews."));
        assert_eq!(payload["recommendations"].as_array().map(Vec::len), Some(3));
        assert!(mock.prompts().await[0].contains("Upcoming local events: SXSW"));
    }

    #[tokio::test]
    async fn test_missing_region_is_an_error() {
        let mock = Arc::new(MockGenerator::default());
        let err = LocalSeoAudit
            .execute_action(&context(""), &gateway(&mock))
            .await
            .unwrap_err();

        assert!(matches!(err, RuleError::MissingContext(_)));
        assert_eq!(mock.call_count(), 0);
    }
}
