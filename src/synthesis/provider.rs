//! External speech synthesis providers

use async_trait::async_trait;

use crate::{Error, Result};

/// One synthesis call, including its position in a retry sequence
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// Text to synthesize
    pub text: String,
    /// Provider voice identifier
    pub voice_id: String,
    /// Provider model identifier
    pub model: String,
    /// Attempt counter, starting at 1
    pub attempt: u32,
}

/// Converts text to audio bytes via an external service
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize one request to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error on network failure or a non-success provider response;
    /// both are retryable from the engine's point of view.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>>;
}

/// ElevenLabs text-to-speech provider
pub struct ElevenLabsProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsProvider {
    /// Create a new provider instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config(
                "ElevenLabs API key required for synthesis".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: "https://api.elevenlabs.io".to_string(),
        })
    }

    /// Override the API base URL (test servers)
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl SpeechProvider for ElevenLabsProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>> {
        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!(
            "{}/v1/text-to-speech/{}",
            self.base_url, request.voice_id
        );

        let body = ElevenLabsRequest {
            text: &request.text,
            model_id: &request.model,
        };

        tracing::debug!(
            voice_id = %request.voice_id,
            attempt = request.attempt,
            chars = request.text.len(),
            "requesting synthesis"
        );

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Provider(format!(
                "ElevenLabs error {status}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| Error::Provider(format!("failed to read audio body: {e}")))?;
        Ok(audio.to_vec())
    }
}
