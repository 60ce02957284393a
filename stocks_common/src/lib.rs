//!
//! Common types and utilities shared by the stock watcher and viewer.
//!
//! This crate aggregates:
//! - `error` — unified error type `StoreError` used across the workspace.
//! - `result` — handy `Result<T, StoreError>` alias.
//! - `quote` — the per-symbol quote record and tolerant field decoding.
//! - `snapshot` — the snapshot value type plus the atomic writer and the
//!   degrade-gracefully reader that every consumer goes through.
#![warn(missing_docs)]
pub mod error;
pub mod result;
pub mod quote;
pub mod snapshot;

pub use error::StoreError;
pub use result::Result;
pub use quote::{Quote, Trend};
pub use snapshot::{Snapshot, SnapshotReader, SnapshotWriter};
