//! Artifact cache eviction tests

use chrono::Utc;
use friday_gateway::{ArtifactSource, AudioArtifact, SynthesisCache};

fn artifact(n: usize) -> AudioArtifact {
    AudioArtifact {
        filename: format!("friday-{n:016x}.mp3"),
        signature: format!("{n:016x}"),
        created_at: Utc::now(),
        source: ArtifactSource::Primary,
    }
}

#[test]
fn eviction_is_fifo_by_creation_not_lru() {
    let dir = tempfile::tempdir().unwrap();
    let bound = 10;
    let mut cache = SynthesisCache::new(dir.path(), bound).unwrap();

    for n in 0..bound + 5 {
        std::fs::write(dir.path().join(format!("friday-{n:016x}.mp3")), b"mp3").unwrap();
        // Read an early entry before each overflow insert; FIFO must ignore it
        cache.find(&format!("{:016x}", 7));
        cache.put(artifact(n));
    }

    assert_eq!(cache.len(), bound);

    let remaining: Vec<String> = cache
        .list_all()
        .map(|e| e.artifact.signature.clone())
        .collect();

    // The first five created entries are gone, newest ten remain in order
    for n in 0..5 {
        assert!(!remaining.contains(&format!("{n:016x}")), "entry {n} should be evicted");
        assert!(cache.find(&format!("{n:016x}")).is_none());
    }
    let expected: Vec<String> = (5..bound + 5).map(|n| format!("{n:016x}")).collect();
    assert_eq!(remaining, expected);
}

#[test]
fn eviction_deletes_artifact_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SynthesisCache::new(dir.path(), 2).unwrap();

    for n in 0..3 {
        std::fs::write(dir.path().join(format!("friday-{n:016x}.mp3")), b"mp3").unwrap();
        cache.put(artifact(n));
    }

    assert!(!dir.path().join(format!("friday-{:016x}.mp3", 0)).exists());
    assert!(dir.path().join(format!("friday-{:016x}.mp3", 1)).exists());
    assert!(dir.path().join(format!("friday-{:016x}.mp3", 2)).exists());
}

#[test]
fn failed_file_delete_does_not_block_inserts() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SynthesisCache::new(dir.path(), 1).unwrap();

    // Entries without backing files: deletes fail, inserts must continue
    for n in 0..4 {
        cache.put(artifact(n));
    }

    assert_eq!(cache.len(), 1);
    assert!(cache.find(&format!("{:016x}", 3)).is_some());
}

#[test]
fn bound_transiently_exceeded_by_at_most_one() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = SynthesisCache::new(dir.path(), 3).unwrap();

    for n in 0..10 {
        cache.put(artifact(n));
        // put() runs eviction after insertion, so we never observe > bound
        assert!(cache.len() <= 3);
    }
}

#[test]
fn restart_adopts_existing_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut cache = SynthesisCache::new(dir.path(), 10).unwrap();
        std::fs::write(dir.path().join("friday-00000000000000aa.mp3"), b"mp3").unwrap();
        cache.put(AudioArtifact {
            filename: "friday-00000000000000aa.mp3".to_string(),
            signature: "00000000000000aa".to_string(),
            created_at: Utc::now(),
            source: ArtifactSource::Primary,
        });
    }

    let mut reopened = SynthesisCache::new(dir.path(), 10).unwrap();
    assert_eq!(reopened.len(), 1);
    assert!(reopened.find("00000000000000aabbcc").is_some());
}
