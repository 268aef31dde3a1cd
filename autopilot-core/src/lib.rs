//! Autopilot Core - rule-driven decision engine
//!
//! Given a business context (persona, geography, metrics) the engine
//! evaluates a prioritized rule set, decides per rule whether it may act
//! autonomously, and records every decision:
//!
//! - **Priority ordering**: critical > high > medium > low, stable among equals
//! - **Confidence gate**: auto-execute iff confidence >= threshold
//! - **Failure isolation**: a failing rule never stops the cycle
//! - **Cached external calls**: actions reach the generator through a
//!   single-flight TTL cache
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                   DecisionEngine                     │
//! │                                                      │
//! │  ┌──────────────┐   ┌────────────┐   ┌────────────┐  │
//! │  │ RuleRegistry │──▶│ Confidence │──▶│  Decision  │  │
//! │  │  (ordered)   │   │    gate    │   │    Log     │  │
//! │  └──────────────┘   └─────┬──────┘   └────────────┘  │
//! │                           │ authorized               │
//! │                   ┌───────▼─────────┐                │
//! │                   │ ExternalCall    │                │
//! │                   │ Gateway (cache) │                │
//! │                   └─────────────────┘                │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod context;
pub mod decision;
pub mod engine;
pub mod error;
pub mod log;
pub mod priority;
pub mod registry;
pub mod rule;
pub mod rules;

// Re-export main types
pub use config::EngineConfig;
pub use context::{Context, Geo, Metrics, Persona};
pub use decision::Decision;
pub use engine::{CycleSummary, DecisionEngine};
pub use error::{EngineError, Result, RuleError};
pub use log::{DecisionLog, DecisionStats};
pub use priority::{confidence, confidence_for_label, Priority};
pub use registry::RuleRegistry;
pub use rule::{Payload, Rule};
