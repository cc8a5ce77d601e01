//! Canonical-table CSV serialization.
//!
//! The export is deterministic: the same table always produces the same
//! bytes. Columns keep their original header order, dates render as
//! `%Y-%m-%d` (empty cell for the missing-date marker) and floats use
//! Rust's shortest round-trip display, so a re-loaded export cleans back
//! to an equal table.

use std::io::Write;
use std::path::Path;

use dash_core::error::Result;
use dash_core::models::{Column, SalesRecord, SalesTable};
use tracing::debug;

/// Serialize `table` to CSV on `writer`.
pub fn write_csv<W: Write>(table: &SalesTable, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    let columns: Vec<Column> = table.columns.iter().collect();

    out.write_record(columns.iter().map(|c| c.header()))
        .map_err(anyhow::Error::from)?;

    for row in &table.rows {
        out.write_record(columns.iter().map(|&column| render_cell(row, column)))
            .map_err(anyhow::Error::from)?;
    }

    out.flush()?;
    Ok(())
}

/// Serialize `table` to a CSV file at `path`.
pub fn export_csv(table: &SalesTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(table, std::io::BufWriter::new(file))?;
    debug!(
        "Exported {} rows x {} columns to {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(())
}

/// Deterministic text rendering for one cell.
fn render_cell(row: &SalesRecord, column: Column) -> String {
    match column {
        Column::OrderId => row.order_id.clone().unwrap_or_default(),
        Column::OrderDate => render_date(row.order_date),
        Column::ShipDate => render_date(row.ship_date),
        Column::CustomerId => row.customer_id.clone().unwrap_or_default(),
        Column::Segment => row.segment.clone().unwrap_or_default(),
        Column::Region => row.region.clone().unwrap_or_default(),
        Column::State => row.state.clone().unwrap_or_default(),
        Column::City => row.city.clone().unwrap_or_default(),
        Column::Category => row.category.clone().unwrap_or_default(),
        Column::SubCategory => row.sub_category.clone().unwrap_or_default(),
        Column::ProductId => row.product_id.clone().unwrap_or_default(),
        Column::ProductName => row.product_name.clone().unwrap_or_default(),
        Column::Sales => row.sales.map(render_float).unwrap_or_default(),
        Column::Quantity => row.quantity.map(|q| q.to_string()).unwrap_or_default(),
        Column::Profit => row.profit.map(render_float).unwrap_or_default(),
    }
}

fn render_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn render_float(value: f64) -> String {
    // Shortest representation that round-trips exactly.
    format!("{value}")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
