//! Error types shared between the watcher and viewer.
//!
//! The `StoreError` enum unifies the failure cases of the pipeline: I/O,
//! JSON serialization, fetch-process failures, and snapshot publication
//! failures, allowing crates to propagate a single error type.
use std::io;

use thiserror::Error;

/// Unified error type shared by the watcher and viewer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error originating from the standard library (files, pipes).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The external fetch routine could not be launched, exited non-zero,
    /// or exceeded its timeout. Contains a human-readable reason including
    /// any captured process output.
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Snapshot publication failed; the previously published snapshot is
    /// left untouched.
    #[error("Snapshot write failed: {0}")]
    Write(String),
}
