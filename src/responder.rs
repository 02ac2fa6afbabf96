//! External responder integration
//!
//! The responder turns a transcript into Friday's reply text. In production
//! this shells out to the agent CLI with a dedicated voice session; tests
//! substitute their own [`Responder`] implementations.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ResponderConfig;
use crate::{Error, Result};

/// Reply used when the agent produces no usable output
const EMPTY_REPLY: &str = "Jeg hørte dig, men har intet at sige lige nu.";

/// Produces a free-form reply for a transcript
#[async_trait]
pub trait Responder: Send + Sync {
    /// Answer one transcript
    ///
    /// # Errors
    ///
    /// Returns error on process failure or timeout; the relay reports this to
    /// the client and skips synthesis for the request.
    async fn respond(&self, transcript: &str) -> Result<String>;
}

/// Responder backed by the agent CLI
///
/// Invokes `<command> <args...> --session-id <session> --message <transcript>`
/// and extracts the reply from stdout.
pub struct AgentResponder {
    command: String,
    args: Vec<String>,
    session_id: String,
    timeout: Duration,
}

impl AgentResponder {
    /// Build a responder from configuration
    #[must_use]
    pub fn new(config: &ResponderConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            session_id: config.session_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl Responder for AgentResponder {
    async fn respond(&self, transcript: &str) -> Result<String> {
        tracing::debug!(session = %self.session_id, "calling agent responder");

        let output = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.command)
                .args(&self.args)
                .arg("--session-id")
                .arg(&self.session_id)
                .arg("--message")
                .arg(transcript)
                .output(),
        )
        .await
        .map_err(|_| {
            Error::Responder(format!("timed out after {}s", self.timeout.as_secs()))
        })?
        .map_err(|e| Error::Responder(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Responder(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reply = extract_reply(&stdout);
        tracing::debug!(chars = reply.len(), "agent responded");
        Ok(reply)
    }
}

/// Strip agent housekeeping lines from CLI output
///
/// Drops empty lines, bracketed system lines, and session status chatter; if
/// nothing remains, substitutes a polite "heard you" reply.
fn extract_reply(stdout: &str) -> String {
    let reply = stdout
        .lines()
        .filter(|l| {
            let l = l.trim();
            !l.is_empty() && !l.starts_with('[') && !l.contains("session_status")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    if reply.is_empty() {
        EMPTY_REPLY.to_string()
    } else {
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_system_lines() {
        let raw = "[session] starting\n\nHej med dig!\nsession_status: ok\nHvordan går det?\n";
        assert_eq!(extract_reply(raw), "Hej med dig!\nHvordan går det?");
    }

    #[test]
    fn empty_output_gets_default_reply() {
        assert_eq!(extract_reply("[only] noise\n"), EMPTY_REPLY);
        assert_eq!(extract_reply(""), EMPTY_REPLY);
    }
}
