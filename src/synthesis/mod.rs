//! Speech synthesis pipeline
//!
//! Text goes in, a cached audio artifact reference comes out. The engine owns
//! retry/backoff around the external provider, a bounded FIFO on-disk cache,
//! and an append-only metrics log.

pub mod cache;
mod engine;
mod metrics;
mod provider;
pub mod retry;

pub use cache::{ArtifactSource, AudioArtifact, CacheEntry, SynthesisCache, content_signature};
pub use engine::{SynthesisEngine, SynthesisOptions};
pub use metrics::{MetricsLog, MetricsRecord, MetricsStatus};
pub use provider::{ElevenLabsProvider, SpeechProvider, SynthesisRequest};
