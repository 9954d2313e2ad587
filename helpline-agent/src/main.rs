//! Voice worker binary: connects to the media platform and serves voice
//! jobs.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use helpline::conversation::ConversationManager;
use helpline::knowledge::KnowledgeBase;
use helpline::llm::{LlmClient, LlmConfig};
use helpline::memory::{ConversationMemory, UserMemory};
use helpline::voice::{VoiceWorker, WorkerOptions};
use helpline::workflow::AdmissionWorkflow;
use helpline::Settings;

const CLASSIFIER_TEMPERATURE: f64 = 0.3;

#[derive(Parser, Debug)]
#[command(name = "helpline-agent", about = "Admission assistant voice worker")]
struct Args {
    /// Media platform websocket URL override.
    #[arg(long, env = "LIVEKIT_URL")]
    ws_url: Option<String>,

    /// Knowledge base directory override.
    #[arg(long)]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::from_env()?;
    if let Some(ws_url) = args.ws_url {
        settings.livekit_url = ws_url;
    }
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }

    helpline::logging::init_tracing(settings.debug);

    if settings.livekit_url.is_empty() {
        anyhow::bail!("LIVEKIT_URL is required for the voice worker");
    }

    info!("Loading knowledge base...");
    let kb = Arc::new(KnowledgeBase::load(&settings.data_dir)?);

    let llm = if settings.has_llm_provider() {
        Some(LlmClient::new(LlmConfig::groq(
            &settings.groq_api_key,
            &settings.llm_model,
            CLASSIFIER_TEMPERATURE,
        ))?)
    } else {
        None
    };

    let manager = Arc::new(ConversationManager::new(
        AdmissionWorkflow::new(kb, llm),
        ConversationMemory::new(&settings.memory_file_path)?,
        UserMemory::new(&settings.user_memory_file_path)?,
    ));

    let options = WorkerOptions::from_settings(&settings);
    VoiceWorker::new(options, manager)
        .run()
        .await
        .context("voice worker failed")?;

    Ok(())
}
