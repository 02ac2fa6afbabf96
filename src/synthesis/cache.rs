//! Bounded on-disk cache for synthesized audio artifacts
//!
//! One MP3 file per artifact, evicted strictly FIFO by creation order. Reads
//! update a last-access timestamp for observability but deliberately do not
//! promote entries (no LRU).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::Result;

/// Filename prefix for cached artifacts
const ARTIFACT_PREFIX: &str = "friday-";

/// Filename extension for cached artifacts
const ARTIFACT_EXT: &str = "mp3";

/// Where a synthesized artifact came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactSource {
    /// External synthesis provider
    Primary,
    /// Client-local fallback synthesis
    Fallback,
}

/// A completed synthesis result stored in the cache
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    /// File name within the cache directory
    pub filename: String,
    /// Content signature over text + voice parameters
    pub signature: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Origin of the audio
    pub source: ArtifactSource,
}

impl AudioArtifact {
    /// URL-style path under which the artifact is served
    #[must_use]
    pub fn url_path(&self) -> String {
        format!("/audio/{}", self.filename)
    }
}

/// An artifact plus its last-access time
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached artifact
    pub artifact: AudioArtifact,
    /// Last time the artifact was looked up
    pub last_access: DateTime<Utc>,
}

/// Bounded FIFO cache of audio artifacts backed by a directory
#[derive(Debug)]
pub struct SynthesisCache {
    dir: PathBuf,
    bound: usize,
    entries: VecDeque<CacheEntry>,
}

impl SynthesisCache {
    /// Open a cache over `dir`, creating the directory if missing
    ///
    /// Existing `friday-*.mp3` files are re-adopted in creation order so a
    /// restart keeps serving previously synthesized audio.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or scanned
    pub fn new(dir: impl Into<PathBuf>, bound: usize) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut found: Vec<(std::time::SystemTime, String)> = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_artifact_filename(&name) {
                continue;
            }
            let created = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(std::time::UNIX_EPOCH);
            found.push((created, name));
        }
        found.sort();

        let now = Utc::now();
        let entries = found
            .into_iter()
            .map(|(created, filename)| CacheEntry {
                artifact: AudioArtifact {
                    signature: signature_from_filename(&filename),
                    filename,
                    created_at: DateTime::from(created),
                    source: ArtifactSource::Primary,
                },
                last_access: now,
            })
            .collect::<VecDeque<_>>();

        if !entries.is_empty() {
            tracing::debug!(
                dir = %dir.display(),
                adopted = entries.len(),
                "re-adopted existing cache artifacts"
            );
        }

        Ok(Self { dir, bound, entries })
    }

    /// Cache directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maximum entry count before eviction
    #[must_use]
    pub const fn bound(&self) -> usize {
        self.bound
    }

    /// Current entry count
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert an artifact, then evict overflow
    ///
    /// Insertion itself always succeeds; the bound may be exceeded by at most
    /// one entry between insertion and eviction.
    pub fn put(&mut self, artifact: AudioArtifact) {
        self.entries.push_back(CacheEntry {
            artifact,
            last_access: Utc::now(),
        });
        self.evict_overflow();
    }

    /// Snapshot of all entries, oldest-created first
    #[must_use]
    pub fn list_all(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter()
    }

    /// Look up an artifact by content signature, updating its last-access time
    ///
    /// Entries re-adopted from disk only carry the signature prefix embedded
    /// in their filename, so matching is by prefix. Lookups never affect
    /// eviction order.
    pub fn find(&mut self, signature: &str) -> Option<AudioArtifact> {
        let entry = self.entries.iter_mut().find(|e| {
            !e.artifact.signature.is_empty() && signature.starts_with(&e.artifact.signature)
        })?;
        entry.last_access = Utc::now();
        Some(entry.artifact.clone())
    }

    /// Remove oldest-created entries until the count is within the bound
    ///
    /// Strictly FIFO by insertion; file-delete failures are logged and never
    /// block later inserts.
    pub fn evict_overflow(&mut self) {
        while self.entries.len() > self.bound {
            let Some(entry) = self.entries.pop_front() else {
                break;
            };
            let path = self.dir.join(&entry.artifact.filename);
            if let Err(e) = std::fs::remove_file(&path) {
                tracing::warn!(
                    file = %path.display(),
                    error = %e,
                    "failed to delete evicted artifact"
                );
            } else {
                tracing::debug!(file = %entry.artifact.filename, "evicted cached artifact");
            }
        }
    }
}

/// Compute the content signature for a synthesis request
#[must_use]
pub fn content_signature(text: &str, voice_id: &str, model: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"\0");
    hasher.update(voice_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(model.as_bytes());
    hex::encode(hasher.finalize())
}

/// Artifact filename for a signature (short prefix keeps names readable)
#[must_use]
pub fn artifact_filename(signature: &str) -> String {
    let short = &signature[..signature.len().min(16)];
    format!("{ARTIFACT_PREFIX}{short}.{ARTIFACT_EXT}")
}

fn is_artifact_filename(name: &str) -> bool {
    name.starts_with(ARTIFACT_PREFIX) && name.ends_with(&format!(".{ARTIFACT_EXT}"))
}

/// Recover the signature prefix embedded in an artifact filename
fn signature_from_filename(name: &str) -> String {
    name.trim_start_matches(ARTIFACT_PREFIX)
        .trim_end_matches(&format!(".{ARTIFACT_EXT}"))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_stable_and_parameter_sensitive() {
        let a = content_signature("hej", "voice-a", "model-1");
        let b = content_signature("hej", "voice-a", "model-1");
        let c = content_signature("hej", "voice-b", "model-1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn filename_roundtrip() {
        let sig = content_signature("test", "v", "m");
        let name = artifact_filename(&sig);
        assert!(is_artifact_filename(&name));
        assert!(sig.starts_with(&signature_from_filename(&name)));
    }
}
