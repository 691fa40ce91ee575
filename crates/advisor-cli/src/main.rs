//! Command-line interface for the model advisor.
//!
//! Three operations mirror the orchestrator: `recommend` produces the
//! three-candidate recommendation payload, `judge` reviews a saved
//! recommendation, and `benchmark` exercises each recommended candidate once.
//! All of them print a JSON payload to stdout and degrade to the built-in
//! fallback catalog when no backend is configured.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::warn;

use advisor_core::RecommendationPayload;
use advisor_runtime::{
    AdvisorOrchestrator, ModelInvoker, NullInvoker, RequirementProfile, RuntimeConfig,
};

#[derive(Parser)]
#[command(name = "advisor", version, about = "Governance-aware model recommendation")]
struct Cli {
    /// Run without a model backend; every payload comes from the fallback
    /// path.
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend candidate models for a task prompt
    Recommend {
        /// The task the user wants a model for
        prompt: String,

        /// JSON file with a requirement profile
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// JSON file with compliance context
        #[arg(long)]
        context: Option<PathBuf>,

        /// JSON file with an array of attribute catalog records
        #[arg(long)]
        attributes: Option<PathBuf>,

        /// JSON file with an array of provider catalog listings
        #[arg(long)]
        listing: Option<PathBuf>,
    },

    /// Judge a saved recommendation payload
    Judge {
        /// The original task prompt
        prompt: String,

        /// JSON file holding a recommendation payload
        #[arg(long)]
        recommendation: PathBuf,

        /// JSON file with compliance context
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// Run each recommended candidate once and report the outputs
    Benchmark {
        /// The original task prompt
        prompt: String,

        /// JSON file holding a recommendation payload
        #[arg(long)]
        recommendation: PathBuf,
    },
}

fn load_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_json_or_default(path: Option<&PathBuf>, default: Value) -> Result<Value> {
    match path {
        Some(path) => load_json(path),
        None => Ok(default),
    }
}

fn load_records(path: Option<&PathBuf>) -> Result<Vec<Value>> {
    match path {
        Some(path) => {
            let value = load_json(path)?;
            value
                .as_array()
                .cloned()
                .with_context(|| format!("{} must contain a JSON array", path.display()))
        }
        None => Ok(Vec::new()),
    }
}

fn build_invoker(offline: bool) -> Arc<dyn ModelInvoker> {
    if offline {
        return Arc::new(NullInvoker);
    }

    #[cfg(feature = "bedrock")]
    {
        match advisor_runtime::BedrockProvider::from_env() {
            Ok(provider) => return Arc::new(provider),
            Err(error) => {
                warn!(%error, "Bedrock backend unavailable, falling back to offline mode");
            }
        }
    }

    #[cfg(not(feature = "bedrock"))]
    warn!("built without the 'bedrock' feature, running in offline mode");

    Arc::new(NullInvoker)
}

fn print_payload<T: serde::Serialize>(payload: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let orchestrator =
        AdvisorOrchestrator::with_config(build_invoker(cli.offline), RuntimeConfig::from_env());

    match cli.command {
        Command::Recommend {
            prompt,
            requirements,
            context,
            attributes,
            listing,
        } => {
            let profile: RequirementProfile = match requirements {
                Some(path) => serde_json::from_value(load_json(&path)?)
                    .with_context(|| format!("invalid requirement profile in {}", path.display()))?,
                None => RequirementProfile::default(),
            };
            let context = load_json_or_default(context.as_ref(), Value::Object(Default::default()))?;
            let attribute_records = load_records(attributes.as_ref())?;
            let provider_listing = load_records(listing.as_ref())?;

            let payload = orchestrator
                .recommend(&prompt, &profile, &context, &attribute_records, &provider_listing)
                .await;
            print_payload(&payload)
        }

        Command::Judge {
            prompt,
            recommendation,
            context,
        } => {
            let recommendation: RecommendationPayload =
                serde_json::from_value(load_json(&recommendation)?)
                    .context("invalid recommendation payload")?;
            let context = load_json_or_default(context.as_ref(), Value::Object(Default::default()))?;

            let payload = orchestrator.judge(&prompt, &recommendation, &context).await;
            print_payload(&payload)
        }

        Command::Benchmark {
            prompt,
            recommendation,
        } => {
            let recommendation: RecommendationPayload =
                serde_json::from_value(load_json(&recommendation)?)
                    .context("invalid recommendation payload")?;

            let runs = orchestrator.benchmark(&prompt, &recommendation).await;
            print_payload(&runs)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
