//! Configuration for the autopilot binary
//!
//! CLI arguments and environment variable handling using clap.

use std::path::PathBuf;

use clap::Parser;

use autopilot_core::EngineConfig;
use autopilot_llm::backend::openai::DEFAULT_MODEL;

const OPENAI_URL: &str = "https://api.openai.com/v1";

/// Autopilot - run one decision cycle for a business context
#[derive(Parser, Debug, Clone)]
#[command(name = "autopilot")]
#[command(about = "Evaluate marketing rules against a business context and print the decisions")]
pub struct Args {
    /// Path to the context JSON (persona, geo, metrics)
    #[arg(long, env = "AUTOPILOT_CONTEXT")]
    pub context: PathBuf,

    /// Path to an engine config YAML
    #[arg(long, env = "AUTOPILOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured autonomy level (0.0 - 1.0)
    #[arg(long, env = "AUTONOMY_LEVEL")]
    pub autonomy_level: Option<f64>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "LLM_BACKEND_URL", default_value = OPENAI_URL)]
    pub backend_url: String,

    /// Model name
    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// API key for the backend
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Answer every prompt with this text instead of calling a backend
    #[arg(long)]
    pub mock_response: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides general.log_level
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Pretty-print the decisions
    #[arg(long, default_value = "false")]
    pub pretty: bool,
}

impl Args {
    /// Whether a backend call needs credentials we don't have
    fn missing_api_key(&self) -> bool {
        self.mock_response.is_none()
            && self.api_key.is_none()
            && self.backend_url.starts_with(OPENAI_URL)
    }

    /// Log level to use: the flag or env var if given, else the config file's.
    pub fn effective_log_level<'a>(&'a self, config: &'a EngineConfig) -> &'a str {
        self.log_level
            .as_deref()
            .unwrap_or(config.general.log_level.as_str())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(level) = self.autonomy_level {
            if !(0.0..=1.0).contains(&level) {
                return Err(format!("AUTONOMY_LEVEL must be within [0, 1], got {}", level));
            }
        }

        if self.missing_api_key() {
            return Err("OPENAI_API_KEY is required unless --mock-response or a local --backend-url is used".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["autopilot", "--context", "ctx.json", "--mock-response", "ok"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.context, PathBuf::from("ctx.json"));
        assert!(!args.pretty);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level_falls_back_to_config() {
        let mut config = EngineConfig::default();
        config.general.log_level = "debug".to_string();

        let mut args = parse(&[]);
        args.log_level = None;
        assert_eq!(args.effective_log_level(&config), "debug");

        args.log_level = Some("warn".to_string());
        assert_eq!(args.effective_log_level(&config), "warn");
    }

    #[test]
    fn test_autonomy_out_of_range() {
        let args = parse(&["--autonomy-level", "1.5"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_local_backend_needs_no_key() {
        let mut args = parse(&["--backend-url", "http://localhost:11434/v1"]);
        args.mock_response = None;
        args.api_key = None;
        assert!(args.validate().is_ok());

        args.backend_url = OPENAI_URL.to_string();
        assert!(args.validate().is_err());
    }
}
