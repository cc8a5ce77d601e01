//! Grouped-sum views over the canonical table.
//!
//! Every operation is stateless and total over any table (an empty table
//! yields an empty result, not an error); only `monthly_sales` has a
//! required column. Descending orderings break ties by first-seen input
//! order so results are deterministic.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;

use chrono::NaiveDate;
use dash_core::dates::month_start;
use dash_core::error::{DashError, Result};
use dash_core::models::{Column, SalesTable};
use dash_core::states::state_abbrev;
use serde::Serialize;

// ── Result tables ─────────────────────────────────────────────────────────────

/// One calendar month's sales total. `month` is the first day of the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    pub month: NaiveDate,
    pub total_sales: f64,
}

/// One region's sales total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSales {
    pub region: String,
    pub total_sales: f64,
}

/// One category's sales total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub total_sales: f64,
}

/// One product's sales total, keyed by the (id, name) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    pub total_sales: f64,
}

/// One state's sales total, keyed by postal abbreviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSales {
    pub state_abbrev: String,
    pub total_sales: f64,
}

/// Headline totals for the metric row of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverviewMetrics {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Distinct `Order ID` count (0 when the column is absent).
    pub order_count: usize,
    /// Distinct `Customer ID` count (0 when the column is absent).
    pub customer_count: usize,
    pub row_count: usize,
}

// ── SalesAggregator ───────────────────────────────────────────────────────────

/// Stateless helper computing the grouped views.
pub struct SalesAggregator;

impl SalesAggregator {
    /// Sales summed per calendar month, ascending by month.
    ///
    /// Requires the `Order Date` column; rows whose date failed to parse are
    /// skipped rather than bucketed.
    pub fn monthly_sales(table: &SalesTable) -> Result<Vec<MonthlySales>> {
        if !table.has(Column::OrderDate) {
            return Err(DashError::MissingColumn(Column::OrderDate.header()));
        }

        // BTreeMap keeps the month keys sorted.
        let mut buckets: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in &table.rows {
            let Some(date) = row.order_date else { continue };
            *buckets.entry(month_start(date)).or_insert(0.0) += row.sales_or_zero();
        }

        Ok(buckets
            .into_iter()
            .map(|(month, total_sales)| MonthlySales { month, total_sales })
            .collect())
    }

    /// Sales summed per region, descending by total. Empty when the
    /// `Region` column is absent.
    pub fn sales_by_region(table: &SalesTable) -> Vec<RegionSales> {
        if !table.has(Column::Region) {
            return Vec::new();
        }
        let groups = descending_sums(
            table
                .rows
                .iter()
                .map(|row| (row.region.clone().unwrap_or_default(), row.sales_or_zero())),
        );
        groups
            .into_iter()
            .map(|(region, total_sales)| RegionSales { region, total_sales })
            .collect()
    }

    /// Sales summed per category, descending by total. Empty when the
    /// `Category` column is absent.
    pub fn sales_by_category(table: &SalesTable) -> Vec<CategorySales> {
        if !table.has(Column::Category) {
            return Vec::new();
        }
        let groups = descending_sums(
            table
                .rows
                .iter()
                .map(|row| (row.category.clone().unwrap_or_default(), row.sales_or_zero())),
        );
        groups
            .into_iter()
            .map(|(category, total_sales)| CategorySales {
                category,
                total_sales,
            })
            .collect()
    }

    /// The `n` best-selling products, descending by summed sales, ties
    /// broken by input order. Empty when either product column is absent.
    pub fn top_n_products(table: &SalesTable, n: usize) -> Vec<ProductSales> {
        if !table.has(Column::ProductId) || !table.has(Column::ProductName) {
            return Vec::new();
        }
        let mut groups = descending_sums(table.rows.iter().map(|row| {
            (
                (
                    row.product_id.clone().unwrap_or_default(),
                    row.product_name.clone().unwrap_or_default(),
                ),
                row.sales_or_zero(),
            )
        }));
        groups.truncate(n);
        groups
            .into_iter()
            .map(|((product_id, product_name), total_sales)| ProductSales {
                product_id,
                product_name,
                total_sales,
            })
            .collect()
    }

    /// The postal abbreviation for each row's state, in row order.
    ///
    /// Unmatched or missing state names map to an empty string (never a
    /// null, never an error), so the result always has one entry per row.
    pub fn add_state_abbrev(table: &SalesTable) -> Vec<String> {
        table
            .rows
            .iter()
            .map(|row| {
                row.state
                    .as_deref()
                    .and_then(state_abbrev)
                    .unwrap_or("")
                    .to_string()
            })
            .collect()
    }

    /// Sales summed per recognized state abbreviation, descending by total;
    /// rows whose state did not resolve are dropped. The choropleth input.
    pub fn sales_by_state(table: &SalesTable) -> Vec<StateSales> {
        let abbrevs = Self::add_state_abbrev(table);
        let groups = descending_sums(
            abbrevs
                .into_iter()
                .zip(&table.rows)
                .filter(|(abbrev, _)| !abbrev.is_empty())
                .map(|(abbrev, row)| (abbrev, row.sales_or_zero())),
        );
        groups
            .into_iter()
            .map(|(state_abbrev, total_sales)| StateSales {
                state_abbrev,
                total_sales,
            })
            .collect()
    }

    /// Headline totals across the whole table.
    pub fn overview(table: &SalesTable) -> OverviewMetrics {
        let mut orders: HashSet<&str> = HashSet::new();
        let mut customers: HashSet<&str> = HashSet::new();
        let mut total_sales = 0.0;
        let mut total_profit = 0.0;

        for row in &table.rows {
            total_sales += row.sales_or_zero();
            total_profit += row.profit_or_zero();
            if let Some(order_id) = row.order_id.as_deref() {
                if !order_id.is_empty() {
                    orders.insert(order_id);
                }
            }
            if let Some(customer_id) = row.customer_id.as_deref() {
                if !customer_id.is_empty() {
                    customers.insert(customer_id);
                }
            }
        }

        OverviewMetrics {
            total_sales,
            total_profit,
            order_count: orders.len(),
            customer_count: customers.len(),
            row_count: table.len(),
        }
    }
}

// ── Grouping driver ───────────────────────────────────────────────────────────

/// Sum values per key in first-seen order, then sort descending by total.
/// The sort is stable, so equal totals keep their first-seen order.
fn descending_sums<K: Eq + Hash + Clone>(items: impl Iterator<Item = (K, f64)>) -> Vec<(K, f64)> {
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, f64)> = Vec::new();

    for (key, value) in items {
        match index.get(&key) {
            Some(&at) => groups[at].1 += value,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, value));
            }
        }
    }

    groups.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    groups
}

// ── Tests ─────────────────────────────────────────────────────────────────────
