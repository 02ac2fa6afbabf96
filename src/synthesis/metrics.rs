//! Append-only synthesis metrics log
//!
//! One newline-delimited JSON record per synthesis attempt sequence. Writing
//! is best-effort: a failed append must never surface to the synthesis caller.

use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cache::ArtifactSource;
use crate::Result;

/// Outcome of a synthesis attempt sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsStatus {
    /// An attempt succeeded
    Success,
    /// All attempts exhausted
    Failure,
}

/// One metrics record
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    /// When the attempt sequence finished
    pub timestamp: DateTime<Utc>,
    /// Final outcome
    pub status: MetricsStatus,
    /// Total attempts made
    pub attempts: u32,
    /// Audio origin
    pub source: ArtifactSource,
}

impl MetricsRecord {
    /// Build a record stamped with the current time
    #[must_use]
    pub fn now(status: MetricsStatus, attempts: u32, source: ArtifactSource) -> Self {
        Self {
            timestamp: Utc::now(),
            status,
            attempts,
            source,
        }
    }
}

/// Append-only JSONL metrics log
#[derive(Debug, Clone)]
pub struct MetricsLog {
    path: PathBuf,
}

impl MetricsLog {
    /// Create a log writer for `path`
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Append one record; failures are swallowed and only logged
    pub fn append(&self, record: &MetricsRecord) {
        if let Err(e) = self.try_append(record) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to append metrics record"
            );
        }
    }

    fn try_append(&self, record: &MetricsRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_flat_fields() {
        let record = MetricsRecord::now(MetricsStatus::Success, 2, ArtifactSource::Primary);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"attempts\":2"));
        assert!(json.contains("\"source\":\"primary\""));
    }

    #[test]
    fn append_to_unwritable_path_does_not_panic() {
        let log = MetricsLog::new(PathBuf::from("/nonexistent-dir/metrics.log"));
        log.append(&MetricsRecord::now(
            MetricsStatus::Failure,
            3,
            ArtifactSource::Primary,
        ));
    }
}
