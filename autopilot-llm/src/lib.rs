//! Autopilot LLM - text generation behind a cache
//!
//! Provides the external-call side of the decision engine:
//! - Trait-based text generators (OpenAI-compatible, mock)
//! - A TTL response cache with single-flight computation per key
//! - The `ExternalCallGateway` that rule actions call through
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         ExternalCallGateway             │
//! │  (timeout + cache key derivation)       │
//! └────────────────┬────────────────────────┘
//!                  │
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ResponseCache│       │TextGenerator│
//! │ (ttl, one   │──────▶│ (OpenAI/    │
//! │  flight)    │ miss  │  Mock)      │
//! └─────────────┘       └─────────────┘
//! ```

pub mod backend;
pub mod cache;
pub mod gateway;

pub use backend::traits::{GenerationRequest, LlmError, TextGenerator};
pub use backend::{MockGenerator, OpenAiGenerator};
pub use cache::{CacheEntry, CacheKey, CacheStats, ResponseCache};
pub use gateway::{ExternalCallGateway, GatewayConfig};
