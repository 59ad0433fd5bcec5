//! sales-agent console
//!
//! Loads the sales dataset, registers the analytics tools and answers
//! questions about the data through a ReAct agent.

mod config;
mod repl;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{AgentBuilder, Session};
use sales_analytics::SalesDataset;

use crate::config::{ProviderKind, Settings};
use crate::repl::Repl;

/// Analista de vendas com IA
#[derive(Parser, Debug)]
#[command(name = "sales-agent")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Model backend
    #[arg(long, short = 'p', env = "SALES_AGENT_PROVIDER", value_enum, default_value_t = ProviderKind::OpenAi)]
    pub provider: ProviderKind,

    /// Model name (defaults per backend)
    #[arg(long, short = 'm', env = "SALES_AGENT_MODEL")]
    pub model: Option<String>,

    /// `;`-separated sales CSV
    #[arg(long, short = 'd', env = "SALES_DATA", default_value = "data/sales.csv")]
    pub data: PathBuf,

    /// Model rounds allowed per question
    #[arg(long, env = "SALES_AGENT_MAX_ITERATIONS", default_value_t = 60)]
    pub max_iterations: usize,

    /// Time limit per question, in seconds
    #[arg(long = "timeout", env = "SALES_AGENT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Ask the model for a best-effort answer when the round limit is hit
    #[arg(long)]
    pub summarize_on_limit: bool,

    /// Answer a single question and exit
    #[arg(long, short = 'q')]
    pub question: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment before parsing so `.env` values feed the flags
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let settings = Settings::from_args(&args)?;

    let dataset = SalesDataset::load(&settings.data_path).with_context(|| {
        format!("failed to load dataset {}", settings.data_path.display())
    })?;
    let dataset = Arc::new(dataset);

    let tools = sales_analytics::tool_registry(Arc::clone(&dataset))?;
    tracing::info!("Registered {} tools", tools.len());
    for name in tools.names() {
        tracing::debug!("  • {}", name);
    }

    let provider = settings
        .provider
        .connect()
        .with_context(|| format!("failed to configure {:?} provider", settings.provider))?;

    match provider.health_check().await {
        Ok(true) => tracing::info!(provider = provider.name(), model = %settings.model, "✓ Model backend reachable"),
        Ok(false) | Err(_) => {
            tracing::warn!(provider = provider.name(), "⚠ Model backend not reachable - questions will fail");
        }
    }

    let agent = AgentBuilder::new()
        .provider(provider)
        .tools(tools)
        .config(settings.agent_config())
        .build()?;
    let session = Session::new(Arc::new(agent));

    println!(
        "Analista de vendas pronto: {} registros, modelo {}.",
        dataset.len(),
        settings.model
    );

    let repl = Repl::new(session);
    match args.question {
        Some(question) => repl.ask(&question).await,
        None => repl.run().await?,
    }

    Ok(())
}
