//! Client-side voice processing
//!
//! Microphone capture, wake word detection, and speaker playback. Transcript
//! recognition itself is an external collaborator; this module only moves
//! audio.

mod capture;
mod playback;
mod wake_word;

pub use capture::{AudioCapture, SAMPLE_RATE, samples_to_wav};
pub use playback::AudioPlayback;
pub use wake_word::{
    DetectorState, FrameClassifier, PhraseScore, WakeWordDetector, WakeWordEvent,
};
