//! Client-side orchestration
//!
//! Composes the state machine with its collaborators (the session link,
//! audio output, and the local fallback synthesizer) through explicit
//! traits, so each piece stays testable in isolation. The machine decides,
//! the orchestrator executes.

mod state;
mod voice_select;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use state::{ActivationSource, ClientCommand, ClientEvent, ClientState, ClientStateMachine};
pub use voice_select::{select_voice, SelectionPath, Voice, VoiceGender, VoicePreference};

use crate::Result;

/// Ping cadence for connection-quality measurement; a missed pong never
/// closes the session
pub const PING_INTERVAL: Duration = Duration::from_secs(5);

/// Delay before reconnecting after connection loss
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Outbound half of the session connection
#[async_trait]
pub trait RelayLink: Send + Sync {
    /// Send a captured transcript
    ///
    /// # Errors
    ///
    /// Returns error if the connection is gone; the orchestrator surfaces
    /// this to its caller, which owns reconnection
    async fn send_transcript(&self, transcript: &str) -> Result<()>;

    /// Send a connection-quality ping
    ///
    /// # Errors
    ///
    /// Returns error if the connection is gone
    async fn send_ping(&self) -> Result<()>;
}

/// Plays server-produced audio references
#[async_trait]
pub trait AudioOut: Send + Sync {
    /// Fetch and play one audio reference, returning when playback completes
    ///
    /// # Errors
    ///
    /// Returns error if the audio cannot be fetched or played; the machine
    /// answers with the local fallback voice
    async fn play_url(&self, url: &str) -> Result<()>;

    /// Halt any in-progress playback immediately
    fn halt(&self);
}

/// Controls the capture device
pub trait CaptureControl: Send + Sync {
    /// Open the device
    ///
    /// # Errors
    ///
    /// Returns a distinct error when the device or permission is missing
    fn start(&self) -> Result<()>;

    /// Release the device
    fn stop(&self);
}

/// On-device fallback speech synthesis
#[async_trait]
pub trait LocalSynthesizer: Send + Sync {
    /// Available platform voices
    fn voices(&self) -> Vec<Voice>;

    /// Speak text with the given voice, or the platform default when `None`
    ///
    /// # Errors
    ///
    /// Returns error if local synthesis fails; the turn then ends without
    /// audio
    async fn speak(&self, text: &str, voice: Option<&Voice>) -> Result<()>;
}

/// The client-side orchestrator
pub struct VoiceClient {
    machine: ClientStateMachine,
    link: Arc<dyn RelayLink>,
    audio: Arc<dyn AudioOut>,
    capture: Arc<dyn CaptureControl>,
    local: Arc<dyn LocalSynthesizer>,
    preference: VoicePreference,
}

impl VoiceClient {
    /// Wire an orchestrator from its collaborators
    #[must_use]
    pub fn new(
        link: Arc<dyn RelayLink>,
        audio: Arc<dyn AudioOut>,
        capture: Arc<dyn CaptureControl>,
        local: Arc<dyn LocalSynthesizer>,
        preference: VoicePreference,
    ) -> Self {
        Self {
            machine: ClientStateMachine::new(),
            link,
            audio,
            capture,
            local,
            preference,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> ClientState {
        self.machine.state()
    }

    /// Feed one event through the machine and execute the resulting commands
    ///
    /// Commands that complete (playback, local synthesis) feed their outcome
    /// back as follow-up events until the machine settles.
    ///
    /// # Errors
    ///
    /// Returns error if sending on the session connection fails; audio
    /// failures are folded back into the machine instead of surfacing.
    pub async fn dispatch(&mut self, event: ClientEvent) -> Result<()> {
        let mut pending = VecDeque::from([event]);

        while let Some(event) = pending.pop_front() {
            for command in self.machine.handle_event(event) {
                if let Some(follow_up) = self.execute(command).await? {
                    pending.push_back(follow_up);
                }
            }
        }
        Ok(())
    }

    /// Execute one command, optionally producing a follow-up event
    async fn execute(&self, command: ClientCommand) -> Result<Option<ClientEvent>> {
        match command {
            ClientCommand::StartCapture => {
                if let Err(e) = self.capture.start() {
                    // Report the specific missing precondition, then stand down
                    tracing::error!(error = %e, "capture unavailable");
                    return Ok(Some(ClientEvent::Stop));
                }
                Ok(None)
            }
            ClientCommand::StopCapture => {
                self.capture.stop();
                Ok(None)
            }
            ClientCommand::SendTranscript(transcript) => {
                self.link.send_transcript(&transcript).await?;
                Ok(None)
            }
            ClientCommand::Play(url) => match self.audio.play_url(&url).await {
                Ok(()) => Ok(Some(ClientEvent::PlaybackFinished)),
                Err(e) => Ok(Some(ClientEvent::PlaybackFailed(e.to_string()))),
            },
            ClientCommand::SpeakLocal(text) => {
                let catalog = self.local.voices();
                let (voice, path) = select_voice(&catalog, &self.preference);
                // Always logged, so wrong-voice regressions are visible
                tracing::info!(
                    voice = voice.map_or("<platform default>", |v| v.name.as_str()),
                    path = ?path,
                    "local fallback synthesis"
                );
                match self.local.speak(&text, voice).await {
                    Ok(()) => Ok(Some(ClientEvent::PlaybackFinished)),
                    Err(e) => Ok(Some(ClientEvent::PlaybackFailed(e.to_string()))),
                }
            }
            ClientCommand::HaltPlayback => {
                self.audio.halt();
                Ok(None)
            }
        }
    }
}
