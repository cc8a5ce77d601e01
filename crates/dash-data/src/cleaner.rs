//! Raw-to-canonical coercion.
//!
//! Total and deterministic: malformed cells degrade to documented defaults
//! (`0.0` for sales/profit, `0` for quantity, trimmed strings for the key
//! columns) rather than erroring. Columns absent from the input stay absent
//! from the output.

use std::sync::OnceLock;

use dash_core::models::{Column, SalesRecord, SalesTable};
use regex::Regex;
use tracing::debug;

use crate::reader::{RawRow, RawTable};

// ── Cell coercion ─────────────────────────────────────────────────────────────

/// Matches currency decorations tolerated in numeric cells: dollar signs,
/// thousands separators and stray inner whitespace.
fn decorations() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[$,\s]").expect("regex is valid"))
}

/// Parse a numeric cell, tolerating `$`-prefixed and comma-grouped values.
/// Non-finite results count as unparsable.
fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(value) = cell.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    let stripped = decorations().replace_all(cell, "");
    stripped
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Parse a quantity cell: integer first, numeric fallback truncated toward
/// zero, negatives clamped to hold the non-negative invariant.
fn parse_quantity(cell: &str) -> Option<i64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<i64>() {
        return Some(value.max(0));
    }
    parse_number(cell).map(|value| (value.trunc() as i64).max(0))
}

// ── Cleaner ───────────────────────────────────────────────────────────────────

/// Clean a raw table into the canonical [`SalesTable`].
///
/// Never fails: every cell of a present numeric column receives a finite
/// value, every string key is trimmed, and dates pass through as parsed by
/// the loader. The input is left untouched; the output is freshly built.
pub fn clean(raw: &RawTable) -> SalesTable {
    let order: Vec<Column> = raw.columns.iter().collect();
    let cell_index = |column: Column| order.iter().position(|&c| c == column);

    let idx_order_id = cell_index(Column::OrderId);
    let idx_customer_id = cell_index(Column::CustomerId);
    let idx_segment = cell_index(Column::Segment);
    let idx_region = cell_index(Column::Region);
    let idx_state = cell_index(Column::State);
    let idx_city = cell_index(Column::City);
    let idx_category = cell_index(Column::Category);
    let idx_sub_category = cell_index(Column::SubCategory);
    let idx_product_id = cell_index(Column::ProductId);
    let idx_product_name = cell_index(Column::ProductName);
    let idx_sales = cell_index(Column::Sales);
    let idx_quantity = cell_index(Column::Quantity);
    let idx_profit = cell_index(Column::Profit);
    let has_order_date = raw.columns.contains(Column::OrderDate);
    let has_ship_date = raw.columns.contains(Column::ShipDate);

    let mut defaulted_cells = 0u64;

    let rows: Vec<SalesRecord> = raw
        .rows
        .iter()
        .map(|row| {
            let mut numeric = |index: Option<usize>| -> Option<f64> {
                let cell = raw_cell(row, index)?;
                match parse_number(cell) {
                    Some(value) => Some(value),
                    None => {
                        if !cell.trim().is_empty() {
                            defaulted_cells += 1;
                        }
                        Some(0.0)
                    }
                }
            };

            let sales = numeric(idx_sales);
            let profit = numeric(idx_profit);
            let quantity = raw_cell(row, idx_quantity).map(|cell| parse_quantity(cell).unwrap_or(0));

            SalesRecord {
                order_id: string_cell(row, idx_order_id),
                order_date: if has_order_date { row.order_date } else { None },
                ship_date: if has_ship_date { row.ship_date } else { None },
                customer_id: string_cell(row, idx_customer_id),
                segment: string_cell(row, idx_segment),
                region: string_cell(row, idx_region),
                state: string_cell(row, idx_state),
                city: string_cell(row, idx_city),
                category: string_cell(row, idx_category),
                sub_category: string_cell(row, idx_sub_category),
                product_id: string_cell(row, idx_product_id),
                product_name: string_cell(row, idx_product_name),
                sales,
                quantity,
                profit,
            }
        })
        .collect();

    if defaulted_cells > 0 {
        debug!(defaulted_cells, "non-numeric cells coerced to defaults");
    }

    SalesTable {
        columns: raw.columns.clone(),
        rows,
    }
}

/// The raw cell for a present column; `""` when the physical record was too
/// short. `None` only when the column itself is absent.
fn raw_cell<'a>(row: &'a RawRow, index: Option<usize>) -> Option<&'a str> {
    let index = index?;
    Some(row.cells.get(index).and_then(|c| c.as_deref()).unwrap_or(""))
}

/// A trimmed string field for a present column.
fn string_cell(row: &RawRow, index: Option<usize>) -> Option<String> {
    raw_cell(row, index).map(|cell| cell.trim().to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dash_core::models::ColumnSet;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn raw_table(columns: &[Column], cells: &[&[&str]]) -> RawTable {
        let column_set = ColumnSet::from_columns(columns.iter().copied());
        let order_date_idx = columns.iter().position(|&c| c == Column::OrderDate);
        let rows = cells
            .iter()
            .map(|row| {
                let cells: Vec<Option<String>> =
                    row.iter().map(|cell| Some(cell.to_string())).collect();
                let order_date = order_date_idx
                    .and_then(|i| cells.get(i).cloned().flatten())
                    .and_then(|cell| dash_core::dates::DateParser::parse(&cell));
                RawRow {
                    cells,
                    order_date,
                    ship_date: None,
                }
            })
            .collect();
        RawTable {
            columns: column_set,
            rows,
        }
    }

    // ── Numeric coercion ──────────────────────────────────────────────────────

    #[test]
    fn test_plain_numbers_pass_through() {
        let table = clean(&raw_table(
            &[Column::Sales, Column::Profit, Column::Quantity],
            &[&["261.96", "41.91", "2"]],
        ));
        assert_eq!(table.rows[0].sales, Some(261.96));
        assert_eq!(table.rows[0].profit, Some(41.91));
        assert_eq!(table.rows[0].quantity, Some(2));
    }

    #[test]
    fn test_malformed_numerics_default_without_failing() {
        let table = clean(&raw_table(
            &[Column::Sales, Column::Profit, Column::Quantity],
            &[
                &["garbage", "n/a", "many"],
                &["", "", ""],
                &["NaN", "inf", "-3"],
            ],
        ));
        for row in &table.rows[..2] {
            assert_eq!(row.sales, Some(0.0));
            assert_eq!(row.profit, Some(0.0));
            assert_eq!(row.quantity, Some(0));
        }
        // Non-finite parses count as unparsable; negative quantity clamps.
        assert_eq!(table.rows[2].sales, Some(0.0));
        assert_eq!(table.rows[2].profit, Some(0.0));
        assert_eq!(table.rows[2].quantity, Some(0));
    }

    #[test]
    fn test_currency_decorated_numbers() {
        let table = clean(&raw_table(
            &[Column::Sales],
            &[&["$1,234.50"], &["$ 99"], &["-$12.25"]],
        ));
        assert_eq!(table.rows[0].sales, Some(1234.5));
        assert_eq!(table.rows[1].sales, Some(99.0));
        assert_eq!(table.rows[2].sales, Some(-12.25));
    }

    #[test]
    fn test_fractional_quantity_truncates() {
        let table = clean(&raw_table(&[Column::Quantity], &[&["3.9"], &["-2.5"]]));
        assert_eq!(table.rows[0].quantity, Some(3));
        assert_eq!(table.rows[1].quantity, Some(0));
    }

    // ── String keys ───────────────────────────────────────────────────────────

    #[test]
    fn test_string_keys_trimmed() {
        let table = clean(&raw_table(
            &[Column::Region, Column::CustomerId],
            &[&["  West ", " AB-100"]],
        ));
        assert_eq!(table.rows[0].region.as_deref(), Some("West"));
        assert_eq!(table.rows[0].customer_id.as_deref(), Some("AB-100"));
    }

    #[test]
    fn test_absent_columns_stay_absent() {
        let table = clean(&raw_table(&[Column::Sales], &[&["5.0"]]));
        assert_eq!(table.rows[0].region, None);
        assert_eq!(table.rows[0].quantity, None);
        assert_eq!(table.rows[0].order_date, None);
        assert!(!table.has(Column::Region));
    }

    // ── Dates ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_dates_pass_through_with_missing_marker() {
        let table = clean(&raw_table(
            &[Column::OrderDate, Column::Sales],
            &[&["11/8/2016", "1.0"], &["bogus", "2.0"]],
        ));
        assert_eq!(
            table.rows[0].order_date,
            NaiveDate::from_ymd_opt(2016, 11, 8)
        );
        assert_eq!(table.rows[1].order_date, None);
        assert_eq!(table.len(), 2);
    }

    // ── Idempotence ───────────────────────────────────────────────────────────

    #[test]
    fn test_cleaning_clean_values_is_idempotent() {
        let raw = raw_table(
            &[
                Column::OrderDate,
                Column::Region,
                Column::CustomerId,
                Column::Sales,
                Column::Quantity,
            ],
            &[
                &["2016-11-08", "West", "AB-100", "261.96", "2"],
                &["2017-06-12", "East", "CD-200", "10.24", "7"],
            ],
        );
        let first = clean(&raw);

        // Render the canonical table back to raw cells and clean again.
        let rendered: Vec<Vec<String>> = first
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.order_date
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default(),
                    r.region.clone().unwrap_or_default(),
                    r.customer_id.clone().unwrap_or_default(),
                    r.sales.map(|v| v.to_string()).unwrap_or_default(),
                    r.quantity.map(|v| v.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        let cell_refs: Vec<Vec<&str>> = rendered
            .iter()
            .map(|row| row.iter().map(String::as_str).collect())
            .collect();
        let cell_slices: Vec<&[&str]> = cell_refs.iter().map(|row| row.as_slice()).collect();
        let second = clean(&raw_table(
            &[
                Column::OrderDate,
                Column::Region,
                Column::CustomerId,
                Column::Sales,
                Column::Quantity,
            ],
            &cell_slices,
        ));

        assert_eq!(first, second);
    }

    #[test]
    fn test_clean_does_not_mutate_input() {
        let raw = raw_table(&[Column::Sales], &[&[" 5.0 "]]);
        let before = raw.rows[0].cells.clone();
        let _ = clean(&raw);
        assert_eq!(raw.rows[0].cells, before);
    }

    #[test]
    fn test_empty_table() {
        let table = clean(&raw_table(&[Column::Sales], &[]));
        assert!(table.is_empty());
        assert!(table.has(Column::Sales));
    }
}
