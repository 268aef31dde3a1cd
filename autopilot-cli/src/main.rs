//! Autopilot - rule-driven marketing decisions from the command line
//!
//! Loads a context JSON (and optionally an engine config YAML), runs one
//! cycle of the built-in rules and prints the decisions as JSON on stdout.
//! Logs go to stderr.

mod config;

use std::fs;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autopilot_core::{Context, DecisionEngine, EngineConfig};
use autopilot_llm::{MockGenerator, OpenAiGenerator, TextGenerator};

use config::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    // Load the config first so its log level can apply
    let mut engine_config = match &args.config {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_yaml(&yaml)?
        }
        None => EngineConfig::default(),
    };

    let log_level = args.effective_log_level(&engine_config).to_string();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("autopilot={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    args.validate().map_err(anyhow::Error::msg)?;

    if let Some(level) = args.autonomy_level {
        engine_config.autonomy_level = level;
    }

    let json = fs::read_to_string(&args.context)
        .with_context(|| format!("reading context {}", args.context.display()))?;
    let context = Context::from_json(&json).context("parsing context")?;

    let generator: Arc<dyn TextGenerator> = match &args.mock_response {
        Some(response) => {
            info!("Using mock backend");
            Arc::new(MockGenerator::default().with_response(response.clone()))
        }
        None => {
            info!(backend = %args.backend_url, model = %args.model, "Using OpenAI-compatible backend");
            Arc::new(OpenAiGenerator::new(
                args.backend_url.clone(),
                args.model.clone(),
                args.api_key.clone(),
            )?)
        }
    };

    let engine = DecisionEngine::with_generator(engine_config, generator)?
        .with_default_rules()
        .await?;

    let decisions = engine.run_cycle(&context).await;

    let output = if args.pretty {
        serde_json::to_string_pretty(&decisions)?
    } else {
        serde_json::to_string(&decisions)?
    };
    println!("{}", output);

    let stats = engine.log().stats().await;
    info!(
        decisions = stats.total,
        auto_executed = stats.auto_executed,
        failed = stats.failed,
        "Done"
    );

    Ok(())
}
