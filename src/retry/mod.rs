use crate::oracle::OracleError;
use crate::sandbox::{remove_workdir, run_script, ExecutionResult, SandboxError};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RetryError {
    #[error("max_attempts must be at least 1, got {value}")]
    InvalidMaxAttempts { value: u32 },
    #[error(transparent)]
    Sandbox(#[from] SandboxError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome {
    Succeeded,
    Exhausted,
    Cancelled,
    OracleFailed { reason: String },
}

impl RetryOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryOutcome::Succeeded => "succeeded",
            RetryOutcome::Exhausted => "exhausted",
            RetryOutcome::Cancelled => "cancelled",
            RetryOutcome::OracleFailed { .. } => "oracle_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryRequest<'a> {
    pub initial_script: &'a str,
    pub max_attempts: u32,
    pub base_directory: &'a Path,
    pub script_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct RetrySession {
    pub max_attempts: u32,
    pub attempts_used: u32,
    pub final_script: String,
    pub final_stdout: String,
    pub final_stderr: String,
    pub final_directory: Option<PathBuf>,
    pub outcome: RetryOutcome,
}

impl RetrySession {
    pub fn succeeded(&self) -> bool {
        self.outcome == RetryOutcome::Succeeded
    }

    pub fn cancelled(&self) -> bool {
        self.outcome == RetryOutcome::Cancelled
    }
}

/// Runs up to `max_attempts` serial executions of the script, asking `repair`
/// for a revision after every failure. `cancelled` is polled before each
/// attempt starts; a running script is allowed to finish.
pub fn execute_with_retries(
    request: &RetryRequest<'_>,
    mut repair: impl FnMut(&str, &str) -> Result<String, OracleError>,
    mut cancelled: impl FnMut() -> bool,
) -> Result<RetrySession, RetryError> {
    if request.max_attempts == 0 {
        return Err(RetryError::InvalidMaxAttempts {
            value: request.max_attempts,
        });
    }

    let mut current_script = request.initial_script.to_string();
    let mut attempts_used = 0_u32;
    let mut last_failure: Option<ExecutionResult> = None;

    while attempts_used < request.max_attempts {
        if cancelled() {
            if let Some(failure) = &last_failure {
                let _ = remove_workdir(&failure.directory);
            }
            return Ok(finish(
                request,
                attempts_used,
                current_script,
                last_failure,
                RetryOutcome::Cancelled,
            ));
        }

        attempts_used += 1;
        let result = run_script(&current_script, request.base_directory, request.script_timeout)?;
        if result.succeeded() {
            return Ok(RetrySession {
                max_attempts: request.max_attempts,
                attempts_used,
                final_script: current_script,
                final_stdout: result.stdout,
                final_stderr: result.stderr,
                final_directory: Some(result.directory),
                outcome: RetryOutcome::Succeeded,
            });
        }

        let _ = remove_workdir(&result.directory);
        match repair(&current_script, &result.stderr) {
            Ok(revised) => {
                current_script = revised;
                last_failure = Some(result);
            }
            Err(err) => {
                return Ok(finish(
                    request,
                    attempts_used,
                    current_script,
                    Some(result),
                    RetryOutcome::OracleFailed {
                        reason: err.to_string(),
                    },
                ))
            }
        }
    }

    Ok(finish(
        request,
        attempts_used,
        current_script,
        last_failure,
        RetryOutcome::Exhausted,
    ))
}

fn finish(
    request: &RetryRequest<'_>,
    attempts_used: u32,
    final_script: String,
    last_failure: Option<ExecutionResult>,
    outcome: RetryOutcome,
) -> RetrySession {
    let (final_stdout, final_stderr) = last_failure
        .map(|result| (result.stdout, result.stderr))
        .unwrap_or_default();
    RetrySession {
        max_attempts: request.max_attempts,
        attempts_used,
        final_script,
        final_stdout,
        final_stderr,
        final_directory: None,
        outcome,
    }
}

pub fn script_fingerprint(script: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(script.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    const HEX: &[u8; 16] = b"0123456789abcdef";
    for byte in digest.iter().take(6) {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_short_stable_hex() {
        let a = script_fingerprint("echo one");
        let b = script_fingerprint("echo one");
        let c = script_fingerprint("echo two");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 12);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn outcome_labels_are_stable() {
        assert_eq!(RetryOutcome::Succeeded.as_str(), "succeeded");
        assert_eq!(RetryOutcome::Exhausted.as_str(), "exhausted");
        assert_eq!(RetryOutcome::Cancelled.as_str(), "cancelled");
        assert_eq!(
            RetryOutcome::OracleFailed {
                reason: "x".to_string()
            }
            .as_str(),
            "oracle_failed"
        );
    }
}
