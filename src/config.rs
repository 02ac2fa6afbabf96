//! Configuration management for the Friday gateway
//!
//! Configuration is loaded from an optional TOML file, then overridden by
//! `FRIDAY_*` environment variables. Secrets (the synthesis provider API key)
//! are only ever read from the environment, never from the file.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

use crate::client::VoicePreference;
use crate::{Error, Result};

/// Friday gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP/WebSocket server configuration
    pub server: ServerConfig,

    /// Audio artifact cache configuration
    pub cache: CacheConfig,

    /// Speech synthesis configuration
    pub synthesis: SynthesisConfig,

    /// External responder configuration
    pub responder: ResponderConfig,

    /// Wake word detection configuration
    pub wake_word: WakeWordConfig,

    /// Preferred local fallback voice
    pub voice_preference: VoicePreference,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on (exposed via a tunnel in production)
    pub port: u16,

    /// Bind address; localhost-only by default so only the tunnel reaches us
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8765,
            bind: "127.0.0.1".to_string(),
        }
    }
}

/// Audio artifact cache configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding artifact files and the metrics log
    pub dir: PathBuf,

    /// Maximum number of cached artifacts before eviction
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            max_entries: 100,
        }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Provider voice identifier (default is the Danish Friday voice)
    pub voice_id: String,

    /// Provider model identifier
    pub model: String,

    /// Provider API key, from `ELEVENLABS_API_KEY` only
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Maximum synthesis attempts per request
    pub max_attempts: u32,

    /// Per-attempt timeout in seconds
    pub attempt_timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voice_id: "pFZP5JQG7iQjIQuC4Bku".to_string(),
            model: "eleven_multilingual_v2".to_string(),
            api_key: None,
            max_attempts: 3,
            attempt_timeout_secs: 10,
        }
    }
}

/// External responder configuration
///
/// The responder is an agent CLI invoked once per transcript with a dedicated
/// voice session, so it never collides with the agent's main session.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResponderConfig {
    /// Program to invoke
    pub command: String,

    /// Leading arguments before the session/message flags
    pub args: Vec<String>,

    /// Session identifier passed as `--session-id`
    pub session_id: String,

    /// Hard timeout for one responder call, in seconds
    pub timeout_secs: u64,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            command: "openclaw".to_string(),
            args: vec!["agent".to_string()],
            session_id: "friday-voice".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Wake word detection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WakeWordConfig {
    /// Target activation phrase
    pub phrase: String,

    /// Confidence threshold in [0, 1] required to fire
    pub threshold: f32,
}

impl Default for WakeWordConfig {
    fn default() -> Self {
        Self {
            phrase: "friday".to_string(),
            threshold: 0.85,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file plus environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p).map_err(|e| {
                    Error::Config(format!("cannot read {}: {e}", p.display()))
                })?;
                toml::from_str(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply `FRIDAY_*` and provider-key environment overrides
    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("FRIDAY_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
        }
        if let Ok(dir) = std::env::var("FRIDAY_CACHE_DIR") {
            self.cache.dir = PathBuf::from(dir);
        }
        if let Ok(key) = std::env::var("ELEVENLABS_API_KEY")
            && !key.is_empty()
        {
            self.synthesis.api_key = Some(key);
        }
        if let Ok(command) = std::env::var("FRIDAY_RESPONDER_COMMAND") {
            self.responder.command = command;
        }
        if let Ok(threshold) = std::env::var("FRIDAY_WAKE_THRESHOLD")
            && let Ok(threshold) = threshold.parse()
        {
            self.wake_word.threshold = threshold;
        }
    }
}

/// Default cache directory under the platform data dir
fn default_cache_dir() -> PathBuf {
    ProjectDirs::from("dev", "fridayvoice", "friday-gateway").map_or_else(
        || PathBuf::from("audio-cache"),
        |dirs| dirs.data_dir().join("audio-cache"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_service() {
        let config = Config::default();
        assert_eq!(config.server.port, 8765);
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.synthesis.max_attempts, 3);
        assert_eq!(config.responder.timeout_secs, 60);
        assert!((config.wake_word.threshold - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [wake_word]
            phrase = "hey friday"
            threshold = 0.9
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.wake_word.phrase, "hey friday");
        // Untouched sections keep their defaults
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.voice_preference.language, "da");
    }
}
