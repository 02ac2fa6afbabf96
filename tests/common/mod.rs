//! Shared test doubles for the voice pipeline
#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use friday_gateway::responder::Responder;
use friday_gateway::{
    Error, Result, SpeechProvider, SynthesisCache, SynthesisEngine, SynthesisOptions,
    SynthesisRequest,
};

/// Compressed exponential backoff so retry tests run in milliseconds
pub fn test_backoff(attempt: u32) -> Duration {
    Duration::from_millis(10 << attempt.saturating_sub(1).min(8))
}

/// Provider that fails a configured number of times, then succeeds
pub struct FlakyProvider {
    fail_times: u32,
    calls: Mutex<Vec<Instant>>,
}

impl FlakyProvider {
    pub fn new(fail_times: u32) -> Self {
        Self {
            fail_times,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Gaps between consecutive provider calls
    pub fn call_gaps(&self) -> Vec<Duration> {
        let calls = self.calls.lock().unwrap();
        calls.windows(2).map(|w| w[1] - w[0]).collect()
    }
}

#[async_trait]
impl SpeechProvider for FlakyProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            calls.len()
        };
        if call <= self.fail_times as usize {
            Err(Error::Provider(format!(
                "simulated failure on attempt {}",
                request.attempt
            )))
        } else {
            Ok(fake_mp3(&request.text))
        }
    }
}

/// Fixed-reply responder with optional delay or failure
pub struct ScriptedResponder {
    reply: String,
    delay: Duration,
    fail: bool,
    calls: AtomicU32,
}

impl ScriptedResponder {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            delay: Duration::ZERO,
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, _transcript: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            Err(Error::Responder("agent process exited with 1".to_string()))
        } else {
            Ok(self.reply.clone())
        }
    }
}

/// Placeholder MP3 payload derived from the text
pub fn fake_mp3(text: &str) -> Vec<u8> {
    let mut bytes = b"ID3".to_vec();
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

/// Engine over a temp cache directory with compressed backoff
pub fn test_engine(
    dir: &std::path::Path,
    provider: Arc<dyn SpeechProvider>,
    max_entries: usize,
) -> SynthesisEngine {
    let cache = SynthesisCache::new(dir, max_entries).expect("cache dir");
    let options = SynthesisOptions {
        attempt_timeout: Duration::from_secs(2),
        backoff: test_backoff,
        ..SynthesisOptions::default()
    };
    SynthesisEngine::new(provider, cache, options)
}
