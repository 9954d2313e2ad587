//! Web gateway binary: serves the admission assistant HTTP API.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use helpline::conversation::ConversationManager;
use helpline::gateway::Gateway;
use helpline::knowledge::KnowledgeBase;
use helpline::llm::{LlmClient, LlmConfig};
use helpline::memory::{ConversationMemory, UserMemory};
use helpline::workflow::AdmissionWorkflow;
use helpline::Settings;

/// Intent classification runs cooler than conversation generation.
const CLASSIFIER_TEMPERATURE: f64 = 0.3;

#[derive(Parser, Debug)]
#[command(name = "helpline-gateway", about = "Admission assistant web gateway")]
struct Args {
    /// Bind host override.
    #[arg(long)]
    host: Option<String>,

    /// Bind port override.
    #[arg(long)]
    port: Option<u16>,

    /// Knowledge base directory override.
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::from_env()?;
    if let Some(host) = args.host {
        settings.host = host;
    }
    if let Some(port) = args.port {
        settings.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }

    helpline::logging::init_tracing(settings.debug);
    info!("Loading knowledge base...");

    let kb = Arc::new(KnowledgeBase::load(&settings.data_dir)?);

    let llm = if settings.has_llm_provider() {
        Some(LlmClient::new(LlmConfig::groq(
            &settings.groq_api_key,
            &settings.llm_model,
            CLASSIFIER_TEMPERATURE,
        ))?)
    } else {
        info!("No LLM provider configured; router uses keyword classification");
        None
    };

    let manager = Arc::new(ConversationManager::new(
        AdmissionWorkflow::new(kb.clone(), llm),
        ConversationMemory::new(&settings.memory_file_path)?,
        UserMemory::new(&settings.user_memory_file_path)?,
    ));

    Gateway::new(settings, kb, manager).start().await?;
    Ok(())
}
