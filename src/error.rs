//! Error types for the Friday gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Friday gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error (missing microphone/speaker, bad format)
    #[error("audio error: {0}")]
    Audio(String),

    /// Audio playback error
    #[error("playback error: {0}")]
    Playback(String),

    /// Wake word detection error
    #[error("wake word error: {0}")]
    WakeWord(String),

    /// A single synthesis provider call failed (retryable)
    #[error("synthesis provider error: {0}")]
    Provider(String),

    /// Synthesis exhausted all retry attempts
    #[error("synthesis failed after {attempts} attempts: {message}")]
    Synthesis {
        /// Message from the last failed attempt
        message: String,
        /// Total attempts made
        attempts: u32,
    },

    /// External responder error
    #[error("responder error: {0}")]
    Responder(String),

    /// Session relay error
    #[error("relay error: {0}")]
    Relay(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
