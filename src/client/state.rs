//! Client interaction state machine
//!
//! Single-threaded and event-driven: the machine only advances when fed a
//! discrete event, and answers with the commands the orchestrator should run.
//! This keeps every transition unit-testable without audio hardware or a
//! network.

use crate::voice::WakeWordEvent;

/// Client lifecycle state; exactly one is active at a time
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Waiting for activation
    #[default]
    Idle,
    /// Microphone open, waiting for speech
    Listening,
    /// Interim recognition result pending
    Transcribing,
    /// Transcript sent, waiting for Friday's response
    Thinking,
    /// Playing response audio
    Speaking,
}

/// What triggered an activation
#[derive(Debug, Clone)]
pub enum ActivationSource {
    /// User pressed the microphone control
    Manual,
    /// Wake word fired
    WakeWord(WakeWordEvent),
}

/// A discrete event fed to the state machine
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// Manual or wake-word activation
    Activate(ActivationSource),
    /// Recognition signalled an interim result
    InterimResult,
    /// Final transcript obtained
    FinalTranscript(String),
    /// Response received from the relay
    Response {
        /// Reply text
        text: String,
        /// Audio reference, absent when the client must synthesize locally
        audio_url: Option<String>,
    },
    /// Playback (remote audio or local fallback) finished
    PlaybackFinished,
    /// Referenced audio failed to play
    PlaybackFailed(String),
    /// Unconditional user stop/cancel
    Stop,
    /// Replay the last successfully played audio
    Replay,
}

/// A side effect for the orchestrator to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Open the capture device
    StartCapture,
    /// Release the capture device
    StopCapture,
    /// Send the transcript over the session connection
    SendTranscript(String),
    /// Play a server audio reference
    Play(String),
    /// Synthesize and speak locally (fallback path)
    SpeakLocal(String),
    /// Halt any in-progress playback
    HaltPlayback,
}

/// The client-side orchestrating state machine
#[derive(Debug, Default)]
pub struct ClientStateMachine {
    state: ClientState,
    /// Audio reference currently being played, committed on completion
    pending_audio: Option<String>,
    /// Response text retained for the local fallback path
    speaking_text: Option<String>,
    /// Set once the fallback voice is in use, so a failing fallback cannot loop
    fallback_active: bool,
    /// Last successfully played audio reference, for replay
    last_audio: Option<String>,
}

impl ClientStateMachine {
    /// Create a machine in the idle state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> ClientState {
        self.state
    }

    /// Last successfully played audio reference, if any
    #[must_use]
    pub fn last_audio(&self) -> Option<&str> {
        self.last_audio.as_deref()
    }

    /// Advance the machine with one event, returning commands to execute
    pub fn handle_event(&mut self, event: ClientEvent) -> Vec<ClientCommand> {
        match event {
            ClientEvent::Activate(source) => self.on_activate(&source),
            ClientEvent::InterimResult => self.on_interim(),
            ClientEvent::FinalTranscript(transcript) => self.on_final_transcript(transcript),
            ClientEvent::Response { text, audio_url } => self.on_response(text, audio_url),
            ClientEvent::PlaybackFinished => self.on_playback_finished(),
            ClientEvent::PlaybackFailed(reason) => self.on_playback_failed(&reason),
            ClientEvent::Stop => self.on_stop(),
            ClientEvent::Replay => self.on_replay(),
        }
    }

    fn on_activate(&mut self, source: &ActivationSource) -> Vec<ClientCommand> {
        if self.state != ClientState::Idle {
            // Activation while busy is a no-op, not queued
            tracing::debug!(state = ?self.state, "activation ignored while busy");
            return Vec::new();
        }

        match source {
            ActivationSource::Manual => tracing::info!("manual activation"),
            ActivationSource::WakeWord(event) => tracing::info!(
                phrase = %event.phrase,
                confidence = event.confidence,
                "wake word activation"
            ),
        }
        self.transition(ClientState::Listening);
        vec![ClientCommand::StartCapture]
    }

    fn on_interim(&mut self) -> Vec<ClientCommand> {
        if self.state == ClientState::Listening {
            self.transition(ClientState::Transcribing);
        }
        Vec::new()
    }

    fn on_final_transcript(&mut self, transcript: String) -> Vec<ClientCommand> {
        if !matches!(
            self.state,
            ClientState::Listening | ClientState::Transcribing
        ) {
            tracing::debug!(state = ?self.state, "transcript ignored outside capture");
            return Vec::new();
        }

        self.transition(ClientState::Thinking);
        vec![
            ClientCommand::StopCapture,
            ClientCommand::SendTranscript(transcript),
        ]
    }

    fn on_response(&mut self, text: String, audio_url: Option<String>) -> Vec<ClientCommand> {
        if self.state != ClientState::Thinking {
            // A response after stop/cancel: completed work is discarded here
            tracing::debug!(state = ?self.state, "response discarded");
            return Vec::new();
        }

        self.transition(ClientState::Speaking);
        self.speaking_text = Some(text.clone());

        match audio_url {
            Some(url) => {
                self.pending_audio = Some(url.clone());
                vec![ClientCommand::Play(url)]
            }
            None => {
                tracing::info!("response carries no audio reference, using local fallback");
                self.fallback_active = true;
                vec![ClientCommand::SpeakLocal(text)]
            }
        }
    }

    fn on_playback_finished(&mut self) -> Vec<ClientCommand> {
        if self.state != ClientState::Speaking {
            return Vec::new();
        }

        if let Some(url) = self.pending_audio.take() {
            self.last_audio = Some(url);
        }
        self.speaking_text = None;
        self.fallback_active = false;
        self.transition(ClientState::Idle);
        Vec::new()
    }

    fn on_playback_failed(&mut self, reason: &str) -> Vec<ClientCommand> {
        if self.state != ClientState::Speaking {
            return Vec::new();
        }

        self.pending_audio = None;

        if self.fallback_active {
            // The fallback voice itself failed; give up on audio for this turn
            tracing::error!(reason, "local fallback playback failed");
            self.speaking_text = None;
            self.fallback_active = false;
            self.transition(ClientState::Idle);
            return Vec::new();
        }

        if let Some(text) = self.speaking_text.clone() {
            tracing::warn!(reason, "audio playback failed, using local fallback");
            self.fallback_active = true;
            vec![ClientCommand::SpeakLocal(text)]
        } else {
            // Replay has no retained text to fall back to
            tracing::warn!(reason, "replay playback failed");
            self.transition(ClientState::Idle);
            Vec::new()
        }
    }

    fn on_stop(&mut self) -> Vec<ClientCommand> {
        // Unconditional and immediate: release capture, halt playback
        self.pending_audio = None;
        self.speaking_text = None;
        self.fallback_active = false;
        if self.state != ClientState::Idle {
            self.transition(ClientState::Idle);
        }
        vec![ClientCommand::StopCapture, ClientCommand::HaltPlayback]
    }

    fn on_replay(&mut self) -> Vec<ClientCommand> {
        if self.state != ClientState::Idle {
            tracing::debug!(state = ?self.state, "replay ignored while busy");
            return Vec::new();
        }
        let Some(url) = self.last_audio.clone() else {
            tracing::debug!("replay requested with no previous audio");
            return Vec::new();
        };

        self.transition(ClientState::Speaking);
        self.pending_audio = Some(url.clone());
        vec![ClientCommand::Play(url)]
    }

    fn transition(&mut self, to: ClientState) {
        tracing::debug!(from = ?self.state, to = ?to, "client state transition");
        self.state = to;
    }
}
