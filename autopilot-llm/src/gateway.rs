//! External call gateway.
//!
//! The single path through which rule actions reach the text generator.
//! Owns the response cache, derives cache keys and bounds every call with
//! a timeout. Constructed once and handed to the engine.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::backend::traits::{GenerationRequest, LlmError, TextGenerator};
use crate::cache::{CacheKey, ResponseCache};

/// Default time-to-live for cached responses
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default bound on a single external call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Gateway configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// TTL used by `generate`
    pub cache_ttl: Duration,
    /// Timeout applied to each generator call
    pub call_timeout: Duration,
    /// Applied to every request built from a bare prompt
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// Cached, time-bounded access to a text generator.
#[derive(Clone)]
pub struct ExternalCallGateway {
    generator: Arc<dyn TextGenerator>,
    cache: ResponseCache<String, LlmError>,
    config: GatewayConfig,
}

impl ExternalCallGateway {
    pub fn new(generator: Arc<dyn TextGenerator>, config: GatewayConfig) -> Self {
        Self {
            generator,
            cache: ResponseCache::new(),
            config,
        }
    }

    /// Generate text for `prompt` using the configured ttl.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_with_ttl(prompt, self.config.cache_ttl).await
    }

    /// Generate text for `prompt`, caching a success for `ttl`.
    pub async fn generate_with_ttl(&self, prompt: &str, ttl: Duration) -> Result<String, LlmError> {
        let request = self.request_for(prompt);
        self.generate_request(request, ttl).await
    }

    /// Generate text for a fully specified request.
    ///
    /// Identical requests to the same generator share one cache entry and
    /// at most one in-flight call. A call exceeding the timeout fails with
    /// `LlmError::Timeout` and is not cached.
    pub async fn generate_request(
        &self,
        request: GenerationRequest,
        ttl: Duration,
    ) -> Result<String, LlmError> {
        let key = CacheKey::for_request(self.generator.id(), &request);
        let generator = Arc::clone(&self.generator);
        let timeout = self.config.call_timeout;

        debug!(
            generator = %generator.id(),
            key = %key,
            prompt_len = request.prompt.len(),
            "External call"
        );

        self.cache
            .get_or_compute(key, ttl, move || async move {
                match tokio::time::timeout(timeout, generator.generate(&request)).await {
                    Ok(Ok(text)) => Ok(text),
                    Ok(Err(e)) => {
                        warn!(generator = %generator.id(), error = %e, "Generation failed");
                        Err(e)
                    }
                    Err(_) => {
                        let ms = timeout.as_millis() as u64;
                        warn!(generator = %generator.id(), timeout_ms = ms, "Generation timed out");
                        Err(LlmError::Timeout(ms))
                    }
                }
            })
            .await
    }

    /// The response cache owned by this gateway
    pub fn cache(&self) -> &ResponseCache<String, LlmError> {
        &self.cache
    }

    pub fn generator_id(&self) -> &str {
        self.generator.id()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn request_for(&self, prompt: &str) -> GenerationRequest {
        let mut request = GenerationRequest::new(prompt);
        if let Some(max) = self.config.max_tokens {
            request = request.with_max_tokens(max);
        }
        if let Some(temp) = self.config.temperature {
            request = request.with_temperature(temp);
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockGenerator;

    fn gateway(mock: &Arc<MockGenerator>, config: GatewayConfig) -> ExternalCallGateway {
        ExternalCallGateway::new(Arc::clone(mock) as Arc<dyn TextGenerator>, config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_prompts_hit_cache() {
        let mock = Arc::new(MockGenerator::default().with_response("cached"));
        let gateway = gateway(&mock, GatewayConfig::default());

        assert_eq!(gateway.generate("audit Austin").await.unwrap(), "cached");
        assert_eq!(gateway.generate("audit Austin").await.unwrap(), "cached");
        assert_eq!(mock.call_count(), 1);

        gateway.generate("audit Denver").await.unwrap();
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry_triggers_new_call() {
        let mock = Arc::new(MockGenerator::default());
        let gateway = gateway(&mock, GatewayConfig::default());

        gateway
            .generate_with_ttl("prompt", Duration::from_secs(10))
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;
        gateway
            .generate_with_ttl("prompt", Duration::from_secs(10))
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_an_error_and_not_cached() {
        let mock = Arc::new(MockGenerator::default().with_delay(Duration::from_secs(60)));
        let config = GatewayConfig {
            call_timeout: Duration::from_secs(5),
            ..Default::default()
        };
        let gateway = gateway(&mock, config);

        let result = gateway.generate("slow").await;
        assert_eq!(result, Err(LlmError::Timeout(5_000)));
        assert!(gateway.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let mock = Arc::new(
            MockGenerator::default()
                .with_error_for("broken", LlmError::NetworkError("connection reset".into())),
        );
        let gateway = gateway(&mock, GatewayConfig::default());

        let err = gateway.generate("a broken prompt").await.unwrap_err();
        assert_eq!(err.to_string(), "Network error: connection reset");

        // Failures are retried on the next call
        gateway.generate("a broken prompt").await.unwrap_err();
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_parameters_are_part_of_the_key() {
        let mock = Arc::new(MockGenerator::default());
        let plain = gateway(&mock, GatewayConfig::default());
        let tuned = ExternalCallGateway {
            cache: plain.cache().clone(),
            ..gateway(
                &mock,
                GatewayConfig {
                    max_tokens: Some(256),
                    ..Default::default()
                },
            )
        };

        plain.generate("same prompt").await.unwrap();
        tuned.generate("same prompt").await.unwrap();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(plain.cache().len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_identical_calls_share_one_request() {
        let mock = Arc::new(MockGenerator::default().with_delay(Duration::from_millis(200)));
        let gateway = gateway(&mock, GatewayConfig::default());

        let (a, b, c) = tokio::join!(
            gateway.generate("shared"),
            gateway.generate("shared"),
            gateway.generate("shared"),
        );

        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(mock.call_count(), 1);
        assert_eq!(gateway.generator_id(), "mock-model");
    }
}
