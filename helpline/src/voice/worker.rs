//! The voice worker job loop.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::conversation::ConversationManager;
use crate::error::{HelplineError, HelplineResult};
use crate::voice::protocol::{ServerFrame, WorkerFrame};

/// Special first turn that produces the initial greeting.
pub const INIT_TOKEN: &str = "__INIT__";

const WORKER_TYPE: &str = "room";

/// Connection options for the worker.
#[derive(Debug, Clone)]
pub struct WorkerOptions {
    pub ws_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub stt_model: String,
    pub llm_model: String,
    pub tts_model: String,
}

impl WorkerOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            ws_url: settings.livekit_url.clone(),
            api_key: settings.livekit_api_key.clone(),
            api_secret: settings.livekit_api_secret.clone(),
            stt_model: settings.stt_model.clone(),
            llm_model: settings.llm_model.clone(),
            tts_model: settings.tts_model.clone(),
        }
    }
}

/// Transport seam between the worker and the media platform.
#[async_trait]
pub trait JobTransport: Send {
    /// Next frame from the platform; `None` when the connection closed.
    async fn recv(&mut self) -> HelplineResult<Option<ServerFrame>>;

    async fn send(&mut self, frame: WorkerFrame) -> HelplineResult<()>;
}

/// Production transport: JSON frames over a websocket.
pub struct WebSocketTransport {
    stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
}

impl WebSocketTransport {
    pub async fn connect(url: &str) -> HelplineResult<Self> {
        let (stream, _) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| HelplineError::Transport(e.to_string()))?;
        Ok(Self { stream })
    }
}

#[async_trait]
impl JobTransport for WebSocketTransport {
    async fn recv(&mut self) -> HelplineResult<Option<ServerFrame>> {
        while let Some(message) = self.stream.next().await {
            match message.map_err(|e| HelplineError::Transport(e.to_string()))? {
                Message::Text(text) => {
                    let frame = serde_json::from_str(&text)?;
                    return Ok(Some(frame));
                }
                Message::Close(_) => return Ok(None),
                // Pings are answered by tungstenite; other frames are noise.
                _ => continue,
            }
        }
        Ok(None)
    }

    async fn send(&mut self, frame: WorkerFrame) -> HelplineResult<()> {
        let json = serde_json::to_string(&frame)?;
        self.stream
            .send(Message::Text(json))
            .await
            .map_err(|e| HelplineError::Transport(e.to_string()))
    }
}

/// The voice agent worker.
pub struct VoiceWorker {
    options: WorkerOptions,
    manager: Arc<ConversationManager>,
}

impl VoiceWorker {
    pub fn new(options: WorkerOptions, manager: Arc<ConversationManager>) -> Self {
        info!("Initialized voice worker");
        Self { options, manager }
    }

    /// Connect to the media platform and serve jobs until the connection
    /// closes.
    pub async fn run(&self) -> HelplineResult<()> {
        info!("Starting voice worker...");
        info!("Media platform URL: {}", self.options.ws_url);
        info!(
            "Using models: STT={}, LLM={}, TTS={}",
            self.options.stt_model, self.options.llm_model, self.options.tts_model
        );

        let mut transport = WebSocketTransport::connect(&self.options.ws_url).await?;
        self.serve(&mut transport).await
    }

    /// The job loop over any transport.
    pub async fn serve(&self, transport: &mut dyn JobTransport) -> HelplineResult<()> {
        transport
            .send(WorkerFrame::Register {
                api_key: self.options.api_key.clone(),
                worker_type: WORKER_TYPE.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            })
            .await?;

        // job id -> session id
        let mut jobs: HashMap<String, String> = HashMap::new();

        while let Some(frame) = transport.recv().await? {
            match frame {
                ServerFrame::Registered { worker_id } => {
                    info!("Registered with media platform as {}", worker_id);
                }
                ServerFrame::JobAssignment {
                    job_id,
                    room_name,
                    participant_identity,
                } => {
                    info!("Participant joining room: {}", room_name);
                    let session_id = self.manager.create_session(Some(&participant_identity));
                    info!(
                        "Created session {} for {}",
                        session_id, participant_identity
                    );

                    // Initial greeting before the caller says anything.
                    let greeting = self.reply_for(&session_id, INIT_TOKEN).await;
                    if !greeting.is_empty() {
                        transport
                            .send(WorkerFrame::AgentSpeech {
                                job_id: job_id.clone(),
                                text: greeting,
                                allow_interruptions: true,
                            })
                            .await?;
                        info!("Sent initial greeting for {}", session_id);
                    }

                    jobs.insert(job_id, session_id);
                }
                ServerFrame::UserUtterance { job_id, text } => {
                    let Some(session_id) = jobs.get(&job_id).cloned() else {
                        warn!("Utterance for unknown job {}", job_id);
                        continue;
                    };

                    let reply = self.reply_for(&session_id, &text).await;
                    transport
                        .send(WorkerFrame::AgentSpeech {
                            job_id,
                            text: reply,
                            allow_interruptions: true,
                        })
                        .await?;
                }
                ServerFrame::JobClosed { job_id } => {
                    if let Some(session_id) = jobs.remove(&job_id) {
                        self.manager.end_session(&session_id);
                        info!("Job {} closed, ended session {}", job_id, session_id);
                    }
                }
            }
        }

        info!("Media platform connection closed");
        Ok(())
    }

    /// One conversation turn. Errors become an apology, never a dead call.
    async fn reply_for(&self, session_id: &str, text: &str) -> String {
        match self.manager.process_message(session_id, text).await {
            Ok(reply) if !reply.is_empty() => reply,
            Ok(_) => "I apologize, I didn't quite understand that. Could you please rephrase your question?".to_string(),
            Err(e) => {
                error!("Error processing query: {}", e);
                "I'm sorry, I encountered an error. Please try again or contact our helpline.".to_string()
            }
        }
    }
}
