//! Snapshot model, atomic writer, and degrade-gracefully reader.
//!
//! A `Snapshot` is an immutable point-in-time mapping from ticker symbol to
//! [`Quote`]. The persisted snapshot document is the sole hand-off point
//! between the watcher process and any number of viewer processes: the
//! watcher publishes a whole new snapshot each refresh cycle, viewers read
//! whichever snapshot is current. There is no snapshot history; only the
//! latest is addressable.
//!
//! Publication is atomic: [`SnapshotWriter`] serializes to a sibling
//! temporary file and renames it over the canonical path, so a reader either
//! sees the previous complete document or the new complete document, never a
//! half-written one.
//!
//! [`SnapshotReader`] never fails: a missing, unreadable, or structurally
//! invalid file yields an empty snapshot, malformed entries are skipped, and
//! malformed fields degrade to `None` (see [`Quote::from_entry`]). A viewer
//! consequently only ever renders "latest snapshot" or "empty snapshot".
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;

use crate::error::StoreError;
use crate::quote::Quote;
use crate::result::Result;

/// Point-in-time mapping from ticker symbol to quote.
///
/// Snapshots are value types: each refresh produces a new one, consumers
/// never mutate one in place. The symbol set may differ between consecutive
/// snapshots; a write wholly replaces the previous snapshot rather than
/// merging into it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    quotes: BTreeMap<String, Quote>,
    captured_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Builds a snapshot from quotes, keyed by their symbols.
    pub fn from_quotes<I>(quotes: I) -> Self
    where
        I: IntoIterator<Item = Quote>,
    {
        let quotes = quotes
            .into_iter()
            .map(|quote| (quote.symbol.clone(), quote))
            .collect();
        Snapshot {
            quotes,
            captured_at: None,
        }
    }

    /// Looks up the quote for `symbol`.
    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.get(symbol)
    }

    /// Iterates entries in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Quote)> {
        self.quotes.iter()
    }

    /// Number of symbols in the snapshot.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// `true` if the snapshot holds no quotes.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// When the snapshot was captured, taken from the file's modification
    /// time at read. `None` for snapshots that were never persisted.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        self.captured_at
    }

    /// Sum of the holdings' current values. Quotes without a value
    /// contribute nothing (absent is not zero; it is simply not counted).
    pub fn total_value(&self) -> f64 {
        self.quotes.values().filter_map(|q| q.value).sum()
    }

    /// Sum of the holdings' baseline values, over present fields only.
    pub fn total_original_value(&self) -> f64 {
        self.quotes.values().filter_map(|q| q.original_value).sum()
    }

    /// Current total minus baseline total.
    pub fn difference(&self) -> f64 {
        self.total_value() - self.total_original_value()
    }
}

/// Publishes snapshots to a canonical path via atomic replace.
pub struct SnapshotWriter {
    path: PathBuf,
}

impl SnapshotWriter {
    /// Creates a writer targeting the canonical snapshot `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotWriter { path: path.into() }
    }

    /// Serializes `snapshot` and atomically replaces the canonical file.
    ///
    /// All-or-nothing: the document is first written to a sibling temporary
    /// path and then renamed over the canonical path, so no reader ever
    /// observes a partial key set. On any error the previously published
    /// snapshot file is left untouched.
    pub fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let document: BTreeMap<&str, &Quote> = snapshot
            .iter()
            .map(|(symbol, quote)| (symbol.as_str(), quote))
            .collect();
        let bytes = serde_json::to_vec_pretty(&document)?;

        let tmp = self.temp_path();
        fs::write(&tmp, &bytes).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::Io(e)
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::Write(format!("replace {}: {}", self.path.display(), e))
        })?;
        debug!(
            "published snapshot with {} symbols to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Sibling temporary path used for staging the document before rename.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("snapshot"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Loads the latest snapshot from a canonical path, degrading gracefully.
pub struct SnapshotReader {
    path: PathBuf,
}

impl SnapshotReader {
    /// Creates a reader for the canonical snapshot `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotReader { path: path.into() }
    }

    /// Path this reader loads from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the current snapshot. Never fails.
    ///
    /// The file is opened fresh on every call; nothing is cached across
    /// calls, so a snapshot replaced by the watcher is picked up by the very
    /// next `read`. A missing, unreadable, or top-level-invalid file yields
    /// an empty snapshot. Entries that are not objects (or have an empty
    /// symbol) are skipped with a warning; the remaining entries still load.
    pub fn read(&self) -> Snapshot {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("no snapshot at {}: {}", self.path.display(), e);
                return Snapshot::default();
            }
        };

        let root: Value = match serde_json::from_slice(&bytes) {
            Ok(root) => root,
            Err(e) => {
                warn!("snapshot at {} is not valid JSON: {}", self.path.display(), e);
                return Snapshot::default();
            }
        };
        let Some(entries) = root.as_object() else {
            warn!(
                "snapshot at {} is not a symbol map; treating as empty",
                self.path.display()
            );
            return Snapshot::default();
        };

        let mut quotes = BTreeMap::new();
        for (symbol, entry) in entries {
            match Quote::from_entry(symbol, entry) {
                Some(quote) => {
                    quotes.insert(symbol.clone(), quote);
                }
                None => warn!(
                    "skipping malformed entry {:?} in {}",
                    symbol,
                    self.path.display()
                ),
            }
        }

        let captured_at = fs::metadata(&self.path)
            .ok()
            .and_then(|meta| meta.modified().ok())
            .map(DateTime::<Utc>::from);

        Snapshot {
            quotes,
            captured_at,
        }
    }
}
