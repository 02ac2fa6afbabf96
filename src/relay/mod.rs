//! Session relay
//!
//! Accepts client connections, routes transcripts to the external responder,
//! drives the synthesis pipeline, and pushes results back to the client.
//!
//! Each session is served by its own task; messages within a session are
//! handled in arrival order, so a session never has two synthesis calls in
//! flight for the same transcript. Work for one session never blocks
//! another session's ping round trip.

mod protocol;
mod session;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

pub use protocol::{ClientMessage, ServerMessage};
pub use session::{OUTBOUND_BUFFER, SessionHandle, SessionRegistry};

use crate::responder::Responder;
use crate::synthesis::SynthesisEngine;
use crate::Result;

/// Welcome acknowledgment sent on connect
const WELCOME: &str = "Connected to Friday voice server";

/// Routes sessions between clients, the responder, and the synthesis engine
pub struct SessionRelay {
    registry: SessionRegistry,
    responder: Arc<dyn Responder>,
    engine: Arc<SynthesisEngine>,
    responder_timeout: Duration,
}

impl SessionRelay {
    /// Create a relay over a responder and synthesis engine
    #[must_use]
    pub fn new(
        responder: Arc<dyn Responder>,
        engine: Arc<SynthesisEngine>,
        responder_timeout: Duration,
    ) -> Self {
        Self {
            registry: SessionRegistry::new(),
            responder,
            engine,
            responder_timeout,
        }
    }

    /// Register a new session and send the welcome acknowledgment
    pub async fn connect(&self, outbound: mpsc::Sender<ServerMessage>) -> Arc<SessionHandle> {
        let session = Arc::new(SessionHandle::new(outbound));
        self.registry.insert(Arc::clone(&session)).await;

        tracing::info!(session = %session.id, "client connected");
        if let Err(e) = session
            .send(ServerMessage::Status {
                message: WELCOME.to_string(),
            })
            .await
        {
            tracing::warn!(session = %session.id, error = %e, "failed to send welcome");
        }
        session
    }

    /// Deregister a session; nothing further is processed for it
    pub async fn disconnect(&self, session: &SessionHandle) {
        if self.registry.remove(session.id).await {
            tracing::info!(session = %session.id, "client disconnected");
        }
    }

    /// Number of active sessions
    pub async fn active_sessions(&self) -> usize {
        self.registry.count().await
    }

    /// Handle one inbound message for a session
    ///
    /// # Errors
    ///
    /// Returns error only if the session's outbound channel is closed;
    /// request-scoped failures are reported to the client in-band.
    pub async fn handle_message(
        &self,
        session: &SessionHandle,
        message: ClientMessage,
    ) -> Result<()> {
        session.touch();

        match message {
            ClientMessage::Ping => session.send(ServerMessage::Pong).await,
            ClientMessage::VoiceMessage { transcript, .. } => {
                self.process_voice_message(session, &transcript).await
            }
            ClientMessage::Unknown => {
                tracing::warn!(session = %session.id, "unrecognized message kind, ignoring");
                Ok(())
            }
        }
    }

    /// Answer a transcript: responder first, then synthesis
    ///
    /// A responder failure is terminal for this request only; an error reply
    /// is sent and synthesis is skipped. A synthesis failure degrades to a
    /// text-only response with a null audio reference, which signals the
    /// client to use its local fallback voice.
    async fn process_voice_message(&self, session: &SessionHandle, transcript: &str) -> Result<()> {
        tracing::info!(session = %session.id, transcript, "voice message received");

        let reply = tokio::time::timeout(self.responder_timeout, self.responder.respond(transcript))
            .await
            .map_or_else(
                |_| {
                    Err(format!(
                        "responder timed out after {}s",
                        self.responder_timeout.as_secs()
                    ))
                },
                |result| result.map_err(|e| e.to_string()),
            );

        let text = match reply {
            Ok(text) => text,
            Err(message) => {
                tracing::error!(session = %session.id, error = %message, "responder failed");
                return session
                    .send(ServerMessage::Error {
                        message: format!("Failed to get response from Friday: {message}"),
                    })
                    .await;
            }
        };

        let audio_url = match self.engine.synthesize(&text).await {
            Ok(artifact) => Some(artifact.url_path()),
            Err(e) => {
                tracing::warn!(
                    session = %session.id,
                    error = %e,
                    "synthesis failed, degrading to text-only"
                );
                None
            }
        };

        session
            .send(ServerMessage::FridayResponse { text, audio_url })
            .await
    }
}
