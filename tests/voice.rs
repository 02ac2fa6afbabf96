//! Wake word detection tests
//!
//! Uses a scripted classifier; no audio hardware required.

use std::sync::Arc;
use std::time::Duration;

use friday_gateway::voice::{
    DetectorState, FrameClassifier, PhraseScore, WakeWordDetector, WakeWordEvent,
};
use tokio::sync::mpsc;

/// Classifier that returns a scripted score sequence for the target phrase
struct ScriptedClassifier {
    scores: std::sync::Mutex<std::vec::IntoIter<Vec<PhraseScore>>>,
}

impl ScriptedClassifier {
    fn new(frames: Vec<Vec<(&str, f32)>>) -> Self {
        let scripted = frames
            .into_iter()
            .map(|frame| {
                frame
                    .into_iter()
                    .map(|(label, score)| PhraseScore {
                        label: label.to_string(),
                        score,
                    })
                    .collect()
            })
            .collect::<Vec<_>>();
        Self {
            scores: std::sync::Mutex::new(scripted.into_iter()),
        }
    }
}

impl FrameClassifier for ScriptedClassifier {
    fn classify(&self, _frame: &[f32]) -> Vec<PhraseScore> {
        self.scores.lock().unwrap().next().unwrap_or_default()
    }
}

async fn feed_frames(tx: &mpsc::Sender<Vec<f32>>, count: usize) {
    for _ in 0..count {
        tx.send(vec![0.0f32; 512]).await.unwrap();
    }
}

async fn next_event(rx: &mut mpsc::Receiver<WakeWordEvent>) -> Option<WakeWordEvent> {
    tokio::time::timeout(Duration::from_millis(200), rx.recv())
        .await
        .ok()
        .flatten()
}

#[tokio::test]
async fn fires_when_confidence_clears_threshold() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        vec![("go", 0.6), ("friday", 0.3)],
        vec![("friday", 0.92), ("go", 0.1)],
    ]));
    let mut detector = WakeWordDetector::new("friday", 0.85, classifier);

    let (tx, frames) = mpsc::channel(8);
    let mut events = detector.start(frames).unwrap();
    assert_eq!(detector.state(), DetectorState::Listening);

    feed_frames(&tx, 2).await;
    let event = next_event(&mut events).await.expect("detection expected");
    assert_eq!(event.phrase, "friday");
    assert!(event.confidence >= 0.85);
}

#[tokio::test]
async fn sub_threshold_matches_never_fire() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        vec![("friday", 0.7)],
        vec![("friday", 0.84)],
        vec![("go", 0.99)],
    ]));
    let mut detector = WakeWordDetector::new("friday", 0.85, classifier);

    let (tx, frames) = mpsc::channel(8);
    let mut events = detector.start(frames).unwrap();
    feed_frames(&tx, 3).await;

    assert!(next_event(&mut events).await.is_none());
    assert_eq!(detector.state(), DetectorState::Listening);
}

#[tokio::test]
async fn detection_is_edge_triggered() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![
        vec![("friday", 0.95)],
        vec![("friday", 0.95)],
        vec![("friday", 0.95)],
    ]));
    let mut detector = WakeWordDetector::new("friday", 0.85, classifier);

    let (tx, frames) = mpsc::channel(8);
    let mut events = detector.start(frames).unwrap();
    feed_frames(&tx, 3).await;

    // One continuous utterance fires exactly once, then the detector disarms
    assert!(next_event(&mut events).await.is_some());
    assert!(next_event(&mut events).await.is_none());

    // Give the detector task a moment to settle after firing
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(detector.state(), DetectorState::Idle);
}

#[tokio::test]
async fn uninitialized_detector_fails_distinctly() {
    let mut detector = WakeWordDetector::uninitialized("friday", 0.85);

    let (_tx, frames) = mpsc::channel::<Vec<f32>>(8);
    let err = detector.start(frames).unwrap_err();
    assert!(err.to_string().contains("wake word error"));
    assert!(err.to_string().contains("not initialized"));
    assert_eq!(detector.state(), DetectorState::Idle);
}

#[tokio::test]
async fn threshold_is_tunable_at_runtime() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![vec![("friday", 0.7)]]));
    let mut detector = WakeWordDetector::new("friday", 0.85, classifier);
    assert!((detector.threshold() - 0.85).abs() < f32::EPSILON);

    detector.set_threshold(0.6);

    let (tx, frames) = mpsc::channel(8);
    let mut events = detector.start(frames).unwrap();
    feed_frames(&tx, 1).await;

    let event = next_event(&mut events).await.expect("lowered threshold fires");
    assert!((event.confidence - 0.7).abs() < f32::EPSILON);
}

#[tokio::test]
async fn stop_halts_listening() {
    let classifier = Arc::new(ScriptedClassifier::new(vec![vec![("friday", 0.95)]]));
    let mut detector = WakeWordDetector::new("friday", 0.85, classifier);

    let (tx, frames) = mpsc::channel(8);
    let mut events = detector.start(frames).unwrap();
    detector.stop();
    assert_eq!(detector.state(), DetectorState::Idle);

    // The aborted task no longer consumes frames or emits events
    let _ = tx.send(vec![0.0f32; 512]).await;
    assert!(next_event(&mut events).await.is_none());

    // Stopped detectors can be restarted by the consumer
    let (_tx2, frames2) = mpsc::channel::<Vec<f32>>(8);
    assert!(detector.start(frames2).is_ok());
}
