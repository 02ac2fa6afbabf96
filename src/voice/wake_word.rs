//! Wake word detection
//!
//! Classifies a stream of short audio frames against a phrase vocabulary and
//! fires a single, edge-triggered event when the target phrase clears the
//! confidence threshold. Consumers restart listening after handling a
//! detection if they want continuous operation.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// Matches below the firing threshold but above this floor are logged for
/// tuning; nothing fires on them
const DEBUG_SCORE_FLOOR: f32 = 0.5;

/// Detection event channel depth
const EVENT_BUFFER: usize = 8;

/// Score for one known phrase on one frame
#[derive(Debug, Clone)]
pub struct PhraseScore {
    /// Phrase label
    pub label: String,
    /// Classification score in [0, 1]
    pub score: f32,
}

/// Classifies audio frames against a fixed phrase vocabulary
pub trait FrameClassifier: Send + Sync {
    /// Score one frame for every known phrase
    fn classify(&self, frame: &[f32]) -> Vec<PhraseScore>;
}

/// A fired wake word detection
#[derive(Debug, Clone)]
pub struct WakeWordEvent {
    /// Detected phrase label
    pub phrase: String,
    /// Confidence score in [0, 1]
    pub confidence: f32,
}

/// State of the wake word detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Not consuming frames
    Idle,
    /// Consuming frames, waiting for the target phrase
    Listening,
}

/// Edge-triggered wake word detector
pub struct WakeWordDetector {
    classifier: Option<Arc<dyn FrameClassifier>>,
    phrase: String,
    threshold_bits: Arc<AtomicU32>,
    listening: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl WakeWordDetector {
    /// Create a detector without a classifier (not yet usable)
    #[must_use]
    pub fn uninitialized(phrase: impl Into<String>, threshold: f32) -> Self {
        Self {
            classifier: None,
            phrase: phrase.into().to_lowercase(),
            threshold_bits: Arc::new(AtomicU32::new(threshold.to_bits())),
            listening: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Create a detector over a loaded classifier
    #[must_use]
    pub fn new(
        phrase: impl Into<String>,
        threshold: f32,
        classifier: Arc<dyn FrameClassifier>,
    ) -> Self {
        let mut detector = Self::uninitialized(phrase, threshold);
        detector.classifier = Some(classifier);
        detector
    }

    /// Target activation phrase
    #[must_use]
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Current confidence threshold
    #[must_use]
    pub fn threshold(&self) -> f32 {
        f32::from_bits(self.threshold_bits.load(Ordering::Relaxed))
    }

    /// Tune the confidence threshold at runtime
    pub fn set_threshold(&self, threshold: f32) {
        self.threshold_bits
            .store(threshold.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> DetectorState {
        if self.listening.load(Ordering::Relaxed) {
            DetectorState::Listening
        } else {
            DetectorState::Idle
        }
    }

    /// Start consuming frames; the returned channel yields at most one event
    ///
    /// Detection is edge-triggered: after firing, the detector goes idle and
    /// must be started again for another detection.
    ///
    /// # Errors
    ///
    /// Fails with a distinct error when no classifier is loaded; downstream
    /// activation flows gate on this, so a silent no-op is not acceptable.
    /// Also fails if already listening.
    pub fn start(
        &mut self,
        mut frames: mpsc::Receiver<Vec<f32>>,
    ) -> Result<mpsc::Receiver<WakeWordEvent>> {
        let classifier = self
            .classifier
            .clone()
            .ok_or_else(|| Error::WakeWord("detector not initialized: no classifier loaded".to_string()))?;

        if self.task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Err(Error::WakeWord("already listening".to_string()));
        }

        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let phrase = self.phrase.clone();
        let threshold_bits = Arc::clone(&self.threshold_bits);
        let listening = Arc::clone(&self.listening);
        listening.store(true, Ordering::Relaxed);

        self.task = Some(tokio::spawn(async move {
            while let Some(frame) = frames.recv().await {
                let scores = classifier.classify(&frame);
                let Some(top) = scores
                    .iter()
                    .max_by(|a, b| a.score.total_cmp(&b.score))
                else {
                    continue;
                };

                let threshold = f32::from_bits(threshold_bits.load(Ordering::Relaxed));
                if top.label.to_lowercase() == phrase && top.score >= threshold {
                    tracing::info!(
                        phrase = %top.label,
                        confidence = top.score,
                        "wake word detected"
                    );
                    let _ = events_tx
                        .send(WakeWordEvent {
                            phrase: top.label.clone(),
                            confidence: top.score,
                        })
                        .await;
                    break;
                }

                if top.score >= DEBUG_SCORE_FLOOR {
                    tracing::debug!(
                        heard = %top.label,
                        confidence = top.score,
                        "sub-threshold match"
                    );
                }
            }
            listening.store(false, Ordering::Relaxed);
        }));

        tracing::debug!(phrase = %self.phrase, threshold = self.threshold(), "wake word listening");
        Ok(events_rx)
    }

    /// Stop consuming frames
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            self.listening.store(false, Ordering::Relaxed);
            tracing::debug!("wake word detector stopped");
        }
    }
}

impl Drop for WakeWordDetector {
    fn drop(&mut self) {
        self.stop();
    }
}
