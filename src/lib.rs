//! Friday Gateway - real-time voice interaction relay for the Friday assistant
//!
//! This library provides both halves of the voice session pipeline:
//! - Server: WebSocket session relay, external responder dispatch, and a
//!   retrying synthesis pipeline with a bounded on-disk artifact cache
//! - Client: the interaction state machine, wake word detection, microphone
//!   capture, and playback with local fallback synthesis
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                      Client                          │
//! │  Wake Word │ Capture │ State Machine │ Playback      │
//! └─────────────────────────┬────────────────────────────┘
//!                           │ WebSocket (voice protocol)
//! ┌─────────────────────────▼────────────────────────────┐
//! │                   Session Relay                      │
//! │  Registry │ Responder dispatch │ Synthesis pipeline  │
//! └───────────────┬───────────────────────┬──────────────┘
//!                 │                       │
//!        ┌────────▼────────┐     ┌────────▼─────────┐
//!        │  Agent (CLI)    │     │  TTS provider +  │
//!        │  responder      │     │  artifact cache  │
//!        └─────────────────┘     └──────────────────┘
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod relay;
pub mod responder;
pub mod synthesis;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
pub use relay::{ClientMessage, ServerMessage, SessionHandle, SessionRegistry, SessionRelay};
pub use responder::{AgentResponder, Responder};
pub use synthesis::{
    ArtifactSource, AudioArtifact, CacheEntry, ElevenLabsProvider, SpeechProvider,
    SynthesisCache, SynthesisEngine, SynthesisOptions, SynthesisRequest,
};
