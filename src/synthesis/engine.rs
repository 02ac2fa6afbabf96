//! Synthesis engine: retry, timeout, cache, and metrics around a provider
//!
//! The engine hands out artifact *references* (URL paths), never raw audio
//! bytes, so relay protocol messages stay small.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::cache::{
    artifact_filename, content_signature, ArtifactSource, AudioArtifact, SynthesisCache,
};
use super::metrics::{MetricsLog, MetricsRecord, MetricsStatus};
use super::provider::{SpeechProvider, SynthesisRequest};
use super::retry;
use crate::{Error, Result};

/// Metrics log filename inside the cache directory
const METRICS_FILE: &str = "metrics.log";

/// Tunables for the synthesis pipeline
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Provider voice identifier
    pub voice_id: String,
    /// Provider model identifier
    pub model: String,
    /// Maximum attempts per request
    pub max_attempts: u32,
    /// Per-attempt timeout; a timeout counts as a retryable failure
    pub attempt_timeout: Duration,
    /// Delay between attempts as a function of the attempt number
    pub backoff: fn(u32) -> Duration,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            voice_id: "pFZP5JQG7iQjIQuC4Bku".to_string(),
            model: "eleven_multilingual_v2".to_string(),
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(10),
            backoff: retry::exponential_backoff,
        }
    }
}

/// Converts text to cached audio artifacts with retry and fallback-aware
/// failure reporting
pub struct SynthesisEngine {
    provider: Arc<dyn SpeechProvider>,
    cache: Mutex<SynthesisCache>,
    metrics: MetricsLog,
    options: SynthesisOptions,
}

impl SynthesisEngine {
    /// Create an engine over a provider and cache
    #[must_use]
    pub fn new(
        provider: Arc<dyn SpeechProvider>,
        cache: SynthesisCache,
        options: SynthesisOptions,
    ) -> Self {
        let metrics = MetricsLog::new(cache.dir().join(METRICS_FILE));
        Self {
            provider,
            cache: Mutex::new(cache),
            metrics,
            options,
        }
    }

    /// Synthesize `text`, returning a reference to the stored artifact
    ///
    /// Consults the cache first; otherwise retries the provider up to the
    /// configured attempt budget with backoff between attempts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] once all attempts are exhausted. Callers
    /// must treat this as non-fatal: the conversation continues text-only and
    /// the client falls back to local synthesis.
    pub async fn synthesize(&self, text: &str) -> Result<AudioArtifact> {
        let signature = content_signature(text, &self.options.voice_id, &self.options.model);

        if let Some(artifact) = self.lock_cache().find(&signature) {
            tracing::debug!(file = %artifact.filename, "synthesis cache hit");
            return Ok(artifact);
        }

        let outcome = retry::with_backoff(
            self.options.max_attempts,
            self.options.backoff,
            |attempt| {
                let provider = Arc::clone(&self.provider);
                let request = SynthesisRequest {
                    text: text.to_string(),
                    voice_id: self.options.voice_id.clone(),
                    model: self.options.model.clone(),
                    attempt,
                };
                let timeout = self.options.attempt_timeout;
                async move {
                    match tokio::time::timeout(timeout, provider.synthesize(&request)).await {
                        Ok(result) => result,
                        Err(_) => Err(Error::Provider(format!(
                            "attempt timed out after {}s",
                            timeout.as_secs()
                        ))),
                    }
                }
            },
        )
        .await;

        match outcome {
            Ok((audio, attempts)) => {
                let artifact = self.commit(&signature, &audio, attempts)?;
                Ok(artifact)
            }
            Err(e) => {
                self.metrics.append(&MetricsRecord::now(
                    MetricsStatus::Failure,
                    e.attempts,
                    ArtifactSource::Primary,
                ));
                tracing::error!(
                    attempts = e.attempts,
                    error = %e.message,
                    "synthesis exhausted all attempts"
                );
                Err(Error::Synthesis {
                    message: e.message,
                    attempts: e.attempts,
                })
            }
        }
    }

    /// Write the audio to disk, register it in the cache, and record metrics
    fn commit(&self, signature: &str, audio: &[u8], attempts: u32) -> Result<AudioArtifact> {
        let filename = artifact_filename(signature);
        let artifact = AudioArtifact {
            filename: filename.clone(),
            signature: signature.to_string(),
            created_at: chrono::Utc::now(),
            source: ArtifactSource::Primary,
        };

        {
            let mut cache = self.lock_cache();
            // Whole-file write; no partial-file mutation, so no locking needed
            std::fs::write(cache.dir().join(&filename), audio)?;
            cache.put(artifact.clone());
        }

        self.metrics.append(&MetricsRecord::now(
            MetricsStatus::Success,
            attempts,
            ArtifactSource::Primary,
        ));
        tracing::info!(file = %filename, attempts, bytes = audio.len(), "synthesis complete");
        Ok(artifact)
    }

    /// Current number of cached artifacts
    #[must_use]
    pub fn cached_artifacts(&self) -> usize {
        self.lock_cache().len()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, SynthesisCache> {
        // Cache operations never panic while holding the lock
        self.cache.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
