//! CSV discovery and loading for the superstore dashboard.
//!
//! Reads the delimited sales export, recognizes the known columns from the
//! header row, parses the date columns, and hands the raw rows to the
//! cleaner for type coercion.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use dash_core::dates::DateParser;
use dash_core::error::{DashError, Result};
use dash_core::models::{Column, ColumnSet, SalesTable};
use tracing::{debug, warn};

use crate::cleaner;

// ── Raw rows ──────────────────────────────────────────────────────────────────

/// One undigested row: the string cell for each recognized column, plus the
/// date columns already parsed (an unparsable date is `None`, the row is
/// kept). `cells` is parallel to the table's [`ColumnSet`] order; a cell is
/// `None` when the physical record was too short to reach its column.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub cells: Vec<Option<String>>,
    pub order_date: Option<NaiveDate>,
    pub ship_date: Option<NaiveDate>,
}

/// The raw record collection handed from the loader to the cleaner.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: ColumnSet,
    pub rows: Vec<RawRow>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.csv` files recursively under `dir`, sorted by path.
pub fn find_csv_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        debug!("Data path does not exist: {}", dir.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load a sales CSV into the canonical [`SalesTable`].
///
/// Fails with [`DashError::FileRead`] when the path is unreadable and with
/// [`DashError::Format`] when the header row contains no recognizable
/// column. Unreadable individual records are logged and skipped; malformed
/// cell values are the cleaner's concern and never abort the load.
pub fn load_sales_table(path: &Path) -> Result<SalesTable> {
    let file = std::fs::File::open(path).map_err(|source| DashError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| DashError::Format(e.to_string()))?
        .clone();

    // Map each known column to its physical field position; the first
    // occurrence wins when a header repeats.
    let mut column_positions: Vec<(Column, usize)> = Vec::new();
    for (position, header) in headers.iter().enumerate() {
        if let Some(column) = Column::from_header(header) {
            if !column_positions.iter().any(|&(c, _)| c == column) {
                column_positions.push((column, position));
            }
        }
    }

    if column_positions.is_empty() {
        return Err(DashError::Format(format!(
            "no known column among {} header fields in {}",
            headers.len(),
            path.display()
        )));
    }

    let columns = ColumnSet::from_columns(column_positions.iter().map(|&(c, _)| c));

    // Cell indexes (into the ColumnSet-ordered cell vector) of the two date
    // columns, when present.
    let order_date_cell = column_positions
        .iter()
        .position(|&(c, _)| c == Column::OrderDate);
    let ship_date_cell = column_positions
        .iter()
        .position(|&(c, _)| c == Column::ShipDate);

    let mut rows: Vec<RawRow> = Vec::new();
    let mut records_skipped = 0u64;

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping unreadable record {}: {}", index + 2, e);
                records_skipped += 1;
                continue;
            }
        };

        let cells: Vec<Option<String>> = column_positions
            .iter()
            .map(|&(_, position)| record.get(position).map(|cell| cell.to_string()))
            .collect();

        let order_date = order_date_cell
            .and_then(|i| cells[i].as_deref())
            .and_then(DateParser::parse);
        let ship_date = ship_date_cell
            .and_then(|i| cells[i].as_deref())
            .and_then(DateParser::parse);

        rows.push(RawRow {
            cells,
            order_date,
            ship_date,
        });
    }

    debug!(
        "Loaded {}: {} rows, {} columns recognized, {} records skipped",
        path.display(),
        rows.len(),
        columns.len(),
        records_skipped
    );

    Ok(cleaner::clean(&RawTable { columns, rows }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ── find_csv_files ────────────────────────────────────────────────────────

    #[test]
    fn test_find_csv_files_sorted_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("nested");
        std::fs::create_dir_all(&sub).unwrap();
        write_csv(dir.path(), "b.csv", &["Sales", "1"]);
        write_csv(&sub, "a.csv", &["Sales", "1"]);
        write_csv(dir.path(), "notes.txt", &["not csv"]);

        let files = find_csv_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.extension().unwrap() == "csv"));
    }

    #[test]
    fn test_find_csv_files_nonexistent_path() {
        assert!(find_csv_files(Path::new("/tmp/does-not-exist-dash-test-xyz")).is_empty());
    }

    // ── load_sales_table ──────────────────────────────────────────────────────

    #[test]
    fn test_load_basic_table() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &[
                "Order ID,Order Date,Customer ID,Region,Sales",
                "CA-1001,11/8/2016,AB-100,West,261.96",
                "CA-1002,11/9/2016,CD-200,South,731.94",
            ],
        );

        let table = load_sales_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.has(Column::OrderDate));
        assert!(table.has(Column::Sales));
        assert!(!table.has(Column::Profit));
        assert_eq!(table.rows[0].order_date, Some(date(2016, 11, 8)));
        assert_eq!(table.rows[0].sales, Some(261.96));
        assert_eq!(table.rows[1].region.as_deref(), Some("South"));
    }

    #[test]
    fn test_load_missing_file_is_file_read_error() {
        let err = load_sales_table(Path::new("/tmp/missing-superstore-xyz.csv")).unwrap_err();
        assert!(matches!(err, DashError::FileRead { .. }));
    }

    #[test]
    fn test_load_unrecognized_headers_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "junk.csv", &["alpha,beta", "1,2"]);
        let err = load_sales_table(&path).unwrap_err();
        assert!(matches!(err, DashError::Format(_)));
    }

    #[test]
    fn test_load_keeps_rows_with_unparsable_dates() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &[
                "Order Date,Sales",
                "not-a-date,10.0",
                "11/8/2016,20.0",
            ],
        );

        let table = load_sales_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].order_date, None);
        assert_eq!(table.rows[0].sales, Some(10.0));
        assert_eq!(table.rows[1].order_date, Some(date(2016, 11, 8)));
    }

    #[test]
    fn test_load_short_records_pad_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &["Region,Sales,Profit", "West,10.0,1.5", "East"],
        );

        let table = load_sales_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[1].region.as_deref(), Some("East"));
        assert_eq!(table.rows[1].sales, Some(0.0));
        assert_eq!(table.rows[1].profit, Some(0.0));
    }

    #[test]
    fn test_load_empty_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::File::create(&path).unwrap();
        let err = load_sales_table(&path).unwrap_err();
        assert!(matches!(err, DashError::Format(_)));
    }

    #[test]
    fn test_load_header_only_file_yields_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "sales.csv", &["Region,Sales"]);
        let table = load_sales_table(&path).unwrap();
        assert!(table.is_empty());
        assert!(table.has(Column::Region));
    }

    #[test]
    fn test_load_duplicate_header_keeps_first_position() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "sales.csv",
            &["Sales,Sales,Region", "5.0,9.0,West"],
        );
        let table = load_sales_table(&path).unwrap();
        assert_eq!(table.rows[0].sales, Some(5.0));
    }
}
