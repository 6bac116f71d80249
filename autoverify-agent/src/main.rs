use anyhow::{Context, Result};
use autoverify_agent::analyzer::DecisionAnalyzer;
use autoverify_agent::config::AgentConfig;
use autoverify_agent::demo::{demo_dashboard, run_demo};
use autoverify_agent::llm::ChatClient;
use autoverify_agent::orchestrator::Orchestrator;
use autoverify_agent::provider::HttpRegistryClient;
use autoverify_agent::session::{AgentServices, RunSession};
use autoverify::{Page, PageEngine, Pacing, ThoughtKind};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Credentialing verification automation agent"
)]
struct Args {
    /// Natural-language task for the agent
    #[arg(default_value = "Run every verification step on the dashboard")]
    task: String,

    /// Inline JSON subject data forwarded to the workflows
    #[arg(long)]
    subject_data: Option<String>,

    /// Force the scripted demo walkthrough even when an API key is present
    #[arg(long)]
    demo: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let mut config = AgentConfig::from_env();
    config.force_demo |= args.demo;

    let subject_data = args
        .subject_data
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()
        .context("--subject-data is not valid JSON")?;

    let page = demo_dashboard();
    let engine: Arc<dyn PageEngine> = page;
    let session = RunSession::new(Page::new(engine), Pacing::default());

    // Stream narration to the terminal as it happens.
    let mut events = session.narrator().subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            let prefix = match event.kind {
                ThoughtKind::Thinking => "...",
                ThoughtKind::Action => "-->",
                ThoughtKind::Result => " ok",
            };
            println!("{prefix} {}", event.message);
        }
    });

    // Ctrl+C requests cooperative cancellation; in-flight primitives finish.
    let cancel = session.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    tracing::info!(run_id = session.run_id(), "starting automation run");

    if config.demo_mode() {
        let summary = run_demo(&session).await;
        if summary.cancelled {
            println!("Run cancelled.");
        }
    } else {
        let api_key = config.api_key.clone().unwrap_or_default();
        let chat = Arc::new(ChatClient::new(
            config.chat_base_url.clone(),
            api_key,
            config.model.clone(),
        ));
        let services = AgentServices {
            provider: Arc::new(HttpRegistryClient::new(
                config.npi_registry_url.clone(),
                config.license_registry_url.clone(),
            )),
            analyzer: DecisionAnalyzer::new(chat.clone()),
        };
        let orchestrator = Orchestrator::new(session, services, chat);
        let summary = orchestrator
            .run_task(&args.task, subject_data.as_ref())
            .await;

        if !summary.status_text.is_empty() {
            println!("\n{}", summary.status_text);
        }
        if !summary.outcomes.is_empty() {
            println!("{}", serde_json::to_string_pretty(&summary.outcomes)?);
        }
        if let Some(error) = &summary.error {
            anyhow::bail!("run failed: {error}");
        }
    }

    printer.abort();
    Ok(())
}
