use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.superstore-dash/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing
/// parents):
/// - `~/.superstore-dash/`
/// - `~/.superstore-dash/logs/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let dash_dir = home.join(".superstore-dash");
    std::fs::create_dir_all(&dash_dir)?;
    std::fs::create_dir_all(dash_dir.join("logs"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive;
/// unrecognized levels fall back to `"info"`.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let normalised = match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => return setup_with_directive(&other.to_lowercase()),
    };
    setup_with_directive(normalised)
}

fn setup_with_directive(directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Data-file discovery ────────────────────────────────────────────────────────

/// Locate the default sales CSV relative to the working directory.
///
/// Checks the conventional paths first, then falls back to the first `.csv`
/// found under `data/`:
/// 1. `data/superstore.csv`
/// 2. `superstore.csv`
/// 3. first of `find_csv_files("data")`
///
/// Returns `None` when nothing is found.
pub fn discover_data_file() -> Option<PathBuf> {
    discover_data_file_in(Path::new("."))
}

/// Same as [`discover_data_file`] but rooted at `base` (used for testing).
pub fn discover_data_file_in(base: &Path) -> Option<PathBuf> {
    let candidates = [
        base.join("data").join("superstore.csv"),
        base.join("superstore.csv"),
    ];
    if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
        return Some(found);
    }

    dash_data::reader::find_csv_files(&base.join("data"))
        .into_iter()
        .next()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch_csv(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "Region,Sales").unwrap();
    }

    // ── discover_data_file ────────────────────────────────────────────────────

    #[test]
    fn test_discover_prefers_data_superstore() {
        let tmp = TempDir::new().unwrap();
        touch_csv(&tmp.path().join("data").join("superstore.csv"));
        touch_csv(&tmp.path().join("superstore.csv"));

        let found = discover_data_file_in(tmp.path());
        assert_eq!(found, Some(tmp.path().join("data").join("superstore.csv")));
    }

    #[test]
    fn test_discover_falls_back_to_root_superstore() {
        let tmp = TempDir::new().unwrap();
        touch_csv(&tmp.path().join("superstore.csv"));

        let found = discover_data_file_in(tmp.path());
        assert_eq!(found, Some(tmp.path().join("superstore.csv")));
    }

    #[test]
    fn test_discover_scans_data_dir_for_any_csv() {
        let tmp = TempDir::new().unwrap();
        touch_csv(&tmp.path().join("data").join("orders-2017.csv"));

        let found = discover_data_file_in(tmp.path());
        assert_eq!(found, Some(tmp.path().join("data").join("orders-2017.csv")));
    }

    #[test]
    fn test_discover_returns_none_when_absent() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_data_file_in(tmp.path()).is_none());
    }
}
