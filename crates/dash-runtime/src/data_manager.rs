//! Immutable dataset snapshot with an explicit (re)load lifecycle.
//!
//! The canonical table is parsed once per load and handed out as an
//! `Arc<SalesTable>`: consumers share the snapshot by reference, and a
//! reload replaces it wholesale, never in place. There is no retry logic:
//! a local file read has no transient-failure class, and a failed reload
//! simply keeps the previous snapshot available.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dash_core::models::SalesTable;
use dash_data::reader::load_sales_table;

// ── DatasetManager ────────────────────────────────────────────────────────────

/// Owns the current [`SalesTable`] snapshot for one data file.
///
/// # Example
/// ```no_run
/// use dash_runtime::data_manager::DatasetManager;
///
/// let mut manager = DatasetManager::new("data/superstore.csv");
/// if let Some(snapshot) = manager.ensure_loaded() {
///     println!("rows: {}", snapshot.len());
/// }
/// ```
pub struct DatasetManager {
    /// The CSV file this manager loads from.
    data_path: PathBuf,
    /// Current snapshot, shared out by reference.
    snapshot: Option<Arc<SalesTable>>,
    /// When the snapshot was last (successfully) replaced.
    loaded_at: Option<Instant>,
    /// Human-readable description of the last load error.
    last_error: Option<String>,
}

impl DatasetManager {
    /// Create a manager for the given data file. Nothing is read until
    /// [`ensure_loaded`](Self::ensure_loaded) or [`reload`](Self::reload).
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            snapshot: None,
            loaded_at: None,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the current snapshot, loading it first if none exists yet.
    ///
    /// Returns `None` only when no snapshot exists and the load failed;
    /// the failure reason is available via [`last_error`](Self::last_error).
    pub fn ensure_loaded(&mut self) -> Option<Arc<SalesTable>> {
        if self.snapshot.is_none() {
            self.reload();
        }
        self.snapshot()
    }

    /// The current snapshot without any I/O, if one has been loaded.
    pub fn snapshot(&self) -> Option<Arc<SalesTable>> {
        self.snapshot.clone()
    }

    /// Parse the data file and replace the snapshot wholesale.
    ///
    /// On failure the previous snapshot (if any) is left intact so that
    /// consumers keep working from the last good load. Returns `true` on
    /// success.
    pub fn reload(&mut self) -> bool {
        match load_sales_table(&self.data_path) {
            Ok(table) => {
                tracing::debug!(
                    rows = table.len(),
                    columns = table.columns.len(),
                    "snapshot replaced"
                );
                self.snapshot = Some(Arc::new(table));
                self.loaded_at = Some(Instant::now());
                self.last_error = None;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "load failed; keeping previous snapshot");
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    /// Age of the current snapshot, or `None` before the first load.
    pub fn snapshot_age(&self) -> Option<Duration> {
        self.loaded_at.map(|at| at.elapsed())
    }

    /// Human-readable description of the last load error, or `None`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The file this manager loads from.
    pub fn data_path(&self) -> &std::path::Path {
        &self.data_path
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
