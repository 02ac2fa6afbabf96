//! Voice session wire protocol
//!
//! JSON envelopes tagged by `kind`. Unrecognized kinds deserialize into
//! [`ClientMessage::Unknown`] so the protocol stays forward-compatible:
//! they are logged and ignored, never answered with an error.

use serde::{Deserialize, Serialize};

/// Message from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Connection-quality probe; the client measures the round trip
    Ping,
    /// A captured transcript for Friday to answer
    VoiceMessage {
        /// Raw transcript text
        transcript: String,
        /// Client-side capture time, epoch milliseconds
        #[serde(default)]
        timestamp: i64,
    },
    /// Any unrecognized kind
    #[serde(other)]
    Unknown,
}

/// Message from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to a ping
    Pong,
    /// Human-readable connection status
    Status {
        /// Status text
        message: String,
    },
    /// Friday's answer; `audio_url` is null when synthesis was unavailable
    /// and the client should fall back to local synthesis
    FridayResponse {
        /// Reply text
        text: String,
        /// URL path of the synthesized audio, if any
        #[serde(rename = "audioUrl")]
        audio_url: Option<String>,
    },
    /// A request-scoped failure; the session stays open
    Error {
        /// Failure description
        message: String,
    },
}
