//! Error types for the container module.

use std::path::PathBuf;
use thiserror::Error;

/// Maximum stderr bytes kept on a failed run.
pub const STDERR_TAIL_BYTES: usize = 4096;

/// Errors from running an external container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The docker binary could not be found.
    #[error("Container runtime not found at path: {path}")]
    RuntimeNotFound { path: PathBuf },

    /// The container exited unsuccessfully.
    #[error("{kind} container exited with code {code:?}")]
    Failed {
        kind: &'static str,
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// The host directory to bind-mount does not exist.
    #[error("Mount source {path} does not exist")]
    MountSourceMissing { path: PathBuf },

    /// The container outlived its configured timeout.
    #[error("{kind} container timed out after {timeout_secs} seconds")]
    Timeout {
        kind: &'static str,
        timeout_secs: u64,
    },

    /// I/O error while supervising the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContainerError {
    /// Build a failure, keeping only the end of stderr.
    pub fn failed(kind: &'static str, code: Option<i32>, stderr: &str) -> Self {
        let trimmed = stderr.trim_end();
        let stderr = if trimmed.is_empty() {
            None
        } else {
            Some(tail(trimmed, STDERR_TAIL_BYTES).to_string())
        };
        Self::Failed { kind, code, stderr }
    }

    /// Captured stderr, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Failed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

fn tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
