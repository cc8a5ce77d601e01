//! One-call assembly of every dashboard section.
//!
//! Runs each aggregation and the RFM engine over a single table snapshot
//! and returns the combined payload. A section whose required column is
//! absent is logged and recorded as `None` without disturbing the other
//! sections; per-aggregation failures are scoped, never fatal.

use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

use crate::aggregator::{
    CategorySales, MonthlySales, OverviewMetrics, ProductSales, RegionSales, SalesAggregator,
    StateSales,
};
use crate::rfm::{compute_rfm, RfmRecord};
use dash_core::models::SalesTable;

// ── Payload ───────────────────────────────────────────────────────────────────

/// Metadata produced alongside the dashboard payload.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetadata {
    /// ISO-8601 timestamp when this payload was generated.
    pub generated_at: String,
    /// Rows in the (already filtered) table that was analyzed.
    pub rows_analyzed: usize,
    /// Wall-clock seconds spent in the grouped aggregations.
    pub aggregate_time_seconds: f64,
    /// Wall-clock seconds spent in the RFM engine.
    pub rfm_time_seconds: f64,
}

/// Every section of the dashboard, computed from one table snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub overview: OverviewMetrics,
    /// `None` when the table has no `Order Date` column.
    pub monthly: Option<Vec<MonthlySales>>,
    pub regions: Vec<RegionSales>,
    pub categories: Vec<CategorySales>,
    pub top_products: Vec<ProductSales>,
    pub states: Vec<StateSales>,
    pub rfm: Vec<RfmRecord>,
    pub metadata: DashboardMetadata,
}

// ── Assembly ──────────────────────────────────────────────────────────────────

/// Build the full dashboard payload from `table`.
///
/// `reference_date` is forwarded to the RFM engine (see
/// [`compute_rfm`]); `top_n` bounds the product section.
pub fn build_dashboard(
    table: &SalesTable,
    top_n: usize,
    reference_date: Option<NaiveDate>,
) -> DashboardData {
    let aggregate_start = Instant::now();

    let overview = SalesAggregator::overview(table);
    let monthly = match SalesAggregator::monthly_sales(table) {
        Ok(months) => Some(months),
        Err(e) => {
            warn!(error = %e, "monthly trend unavailable");
            None
        }
    };
    let regions = SalesAggregator::sales_by_region(table);
    let categories = SalesAggregator::sales_by_category(table);
    let top_products = SalesAggregator::top_n_products(table, top_n);
    let states = SalesAggregator::sales_by_state(table);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let rfm_start = Instant::now();
    let rfm = compute_rfm(table, reference_date);
    let rfm_time = rfm_start.elapsed().as_secs_f64();

    let metadata = DashboardMetadata {
        generated_at: chrono::Utc::now().to_rfc3339(),
        rows_analyzed: table.len(),
        aggregate_time_seconds: aggregate_time,
        rfm_time_seconds: rfm_time,
    };

    DashboardData {
        overview,
        monthly,
        regions,
        categories,
        top_products,
        states,
        rfm,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
