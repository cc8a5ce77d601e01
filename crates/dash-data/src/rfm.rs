//! Customer RFM (Recency / Frequency / Monetary) segmentation.
//!
//! Aggregates per-customer behavior, ranks the customers along the three
//! dimensions with a first tie-break, and buckets each rank vector into
//! quintile scores via the two-path binning in [`dash_core::quantiles`].
//! A customer with no valid order date ranks as oldest-of-all, so such
//! customers deterministically receive the lowest recency bucket.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use dash_core::models::{Column, SalesTable};
use dash_core::quantiles::bin_ranks;
use serde::Serialize;
use tracing::debug;

/// Number of quantile buckets per dimension.
const SCORE_BUCKETS: usize = 5;

// ── RfmRecord ─────────────────────────────────────────────────────────────────

/// One customer's RFM profile and scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmRecord {
    pub customer_id: String,
    /// Days between the reference date and the most recent order; `None`
    /// when the customer has no valid order date.
    pub recency_days: Option<i64>,
    /// Distinct order count (row count when `Order ID` is absent).
    pub frequency: u64,
    /// Summed sales.
    pub monetary: f64,
    /// Quintile scores, each in 1..=5. Higher is better on every axis:
    /// recent, frequent, high-spending.
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    /// The three digits concatenated in R,F,M order: a segmentation code,
    /// not a number.
    pub rfm_score: String,
}

// ── Per-customer accumulation ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CustomerAgg {
    customer_id: String,
    last_order: Option<NaiveDate>,
    orders: HashSet<String>,
    row_count: u64,
    monetary: f64,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// The default reference date: one day after the latest order date in the
/// table, or today's date when no row carries a valid order date.
pub fn default_reference_date(table: &SalesTable) -> NaiveDate {
    table
        .rows
        .iter()
        .filter_map(|row| row.order_date)
        .max()
        .map(|latest| latest + Duration::days(1))
        .unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// Compute RFM records, one per distinct `Customer ID` in first-seen order.
///
/// Returns an empty collection (never an error) for an empty table or a
/// table without the `Customer ID` column. Scores are always in 1..=5 for
/// every emitted record.
pub fn compute_rfm(table: &SalesTable, reference_date: Option<NaiveDate>) -> Vec<RfmRecord> {
    if table.is_empty() || !table.has(Column::CustomerId) {
        return Vec::new();
    }

    let reference = reference_date.unwrap_or_else(|| default_reference_date(table));
    let count_distinct_orders = table.has(Column::OrderId);

    // ── Step 1: group by customer, first-seen order ───────────────────────────
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut customers: Vec<CustomerAgg> = Vec::new();

    for row in &table.rows {
        let Some(customer_id) = row.customer_id.as_deref() else {
            continue;
        };
        let at = match index.get(customer_id) {
            Some(&at) => at,
            None => {
                index.insert(customer_id.to_string(), customers.len());
                customers.push(CustomerAgg {
                    customer_id: customer_id.to_string(),
                    ..Default::default()
                });
                customers.len() - 1
            }
        };

        let agg = &mut customers[at];
        agg.row_count += 1;
        agg.monetary += row.sales_or_zero();
        if let Some(date) = row.order_date {
            agg.last_order = Some(agg.last_order.map_or(date, |seen| seen.max(date)));
        }
        if count_distinct_orders {
            if let Some(order_id) = row.order_id.as_deref() {
                if !order_id.is_empty() {
                    agg.orders.insert(order_id.to_string());
                }
            }
        }
    }

    // ── Step 2: raw dimensions ────────────────────────────────────────────────
    let recency: Vec<Option<i64>> = customers
        .iter()
        .map(|c| c.last_order.map(|d| (reference - d).num_days()))
        .collect();
    let frequency: Vec<u64> = customers
        .iter()
        .map(|c| {
            if count_distinct_orders {
                c.orders.len() as u64
            } else {
                c.row_count
            }
        })
        .collect();
    let monetary: Vec<f64> = customers.iter().map(|c| c.monetary).collect();

    // ── Step 3: ranks, first tie-break ────────────────────────────────────────
    // Recency ranks descending so the most recent customer gets the highest
    // rank (and thus the highest bucket); a missing recency sorts oldest.
    let r_ranks = rank_first(customers.len(), |a, b| match (recency[a], recency[b]) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => y.cmp(&x),
    });
    let f_ranks = rank_first(customers.len(), |a, b| frequency[a].cmp(&frequency[b]));
    let m_ranks = rank_first(customers.len(), |a, b| {
        monetary[a]
            .partial_cmp(&monetary[b])
            .unwrap_or(Ordering::Equal)
    });

    // ── Step 4: quintile buckets ──────────────────────────────────────────────
    let r_scores = bin_ranks(&r_ranks, SCORE_BUCKETS);
    let f_scores = bin_ranks(&f_ranks, SCORE_BUCKETS);
    let m_scores = bin_ranks(&m_ranks, SCORE_BUCKETS);

    debug!(customers = customers.len(), %reference, "rfm computed");

    // ── Step 5: assemble ──────────────────────────────────────────────────────
    customers
        .into_iter()
        .enumerate()
        .map(|(i, c)| {
            let (r, f, m) = (r_scores[i], f_scores[i], m_scores[i]);
            RfmRecord {
                customer_id: c.customer_id,
                recency_days: recency[i],
                frequency: frequency[i],
                monetary: monetary[i],
                r_score: r,
                f_score: f,
                m_score: m,
                rfm_score: format!("{r}{f}{m}"),
            }
        })
        .collect()
}

// ── Ranking ───────────────────────────────────────────────────────────────────

/// Dense 1..=n ranks under `compare`, ties broken by first-seen position
/// (the stable sort keeps equal elements in index order).
fn rank_first(n: usize, compare: impl Fn(usize, usize) -> Ordering) -> Vec<f64> {
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| compare(a, b));

    let mut ranks = vec![0.0; n];
    for (position, &at) in order.iter().enumerate() {
        ranks[at] = (position + 1) as f64;
    }
    ranks
}

// ── Tests ─────────────────────────────────────────────────────────────────────
