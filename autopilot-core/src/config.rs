//! Configuration for the decision engine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{EngineError, Result};

/// Default autonomy level
pub const DEFAULT_AUTONOMY_LEVEL: f64 = 0.7;

/// Configuration for a decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Engine instance id
    pub engine_id: String,
    /// Default auto-execute threshold in [0, 1]
    pub autonomy_level: f64,
    /// External call configuration
    pub gateway: GatewayConfig,
    /// General settings
    pub general: GeneralConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_id: uuid::Uuid::new_v4().to_string(),
            autonomy_level: DEFAULT_AUTONOMY_LEVEL,
            gateway: GatewayConfig::default(),
            general: GeneralConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a config with the given autonomy level.
    pub fn with_autonomy(autonomy_level: f64) -> Self {
        Self {
            autonomy_level,
            ..Default::default()
        }
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.autonomy_level) {
            return Err(EngineError::Config(format!(
                "autonomy_level must be within [0, 1], got {}",
                self.autonomy_level
            )));
        }
        if self.gateway.cache_ttl_secs == 0 {
            return Err(EngineError::Config("gateway.cache_ttl_secs must be > 0".into()));
        }
        if self.gateway.call_timeout_ms == 0 {
            return Err(EngineError::Config("gateway.call_timeout_ms must be > 0".into()));
        }
        if self.general.event_buffer == 0 {
            return Err(EngineError::Config("general.event_buffer must be > 0".into()));
        }
        Ok(())
    }
}

/// External call configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Response cache TTL (seconds)
    pub cache_ttl_secs: u64,
    /// Per-call timeout (ms)
    pub call_timeout_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300, // 5 minutes
            call_timeout_ms: 30_000,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl From<&GatewayConfig> for autopilot_llm::GatewayConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            cache_ttl: Duration::from_secs(config.cache_ttl_secs),
            call_timeout: Duration::from_millis(config.call_timeout_ms),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// General settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level
    pub log_level: String,
    /// Capacity of the decision broadcast channel
    pub event_buffer: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            event_buffer: 64,
        }
    }
}
