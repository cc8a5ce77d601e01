//! Row-selection predicates supplied by the shell.
//!
//! The core computes over whatever table it is given; filtering is the
//! caller's concern. `FilterState` carries the allowed-sets for the two
//! sidebar filters and produces a filtered copy of the snapshot. An empty
//! allowed-set means "no constraint", matching a multiselect with nothing
//! picked.

use std::collections::BTreeSet;

use dash_core::models::{SalesRecord, SalesTable};

// ── FilterState ───────────────────────────────────────────────────────────────

/// Allowed region and category names. Empty set = no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

impl FilterState {
    /// Build a filter from the shell's selections.
    pub fn new(
        regions: impl IntoIterator<Item = String>,
        categories: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            regions: regions.into_iter().collect(),
            categories: categories.into_iter().collect(),
        }
    }

    /// `true` when no constraint is active.
    pub fn is_unrestricted(&self) -> bool {
        self.regions.is_empty() && self.categories.is_empty()
    }

    /// Whether `row` passes every active constraint. A row without the
    /// filtered field (column absent) fails an active constraint.
    pub fn matches(&self, row: &SalesRecord) -> bool {
        let region_ok = self.regions.is_empty()
            || row
                .region
                .as_deref()
                .map(|r| self.regions.contains(r))
                .unwrap_or(false);
        let category_ok = self.categories.is_empty()
            || row
                .category
                .as_deref()
                .map(|c| self.categories.contains(c))
                .unwrap_or(false);
        region_ok && category_ok
    }

    /// Produce a filtered copy of `table`. The input is never mutated; an
    /// unrestricted filter clones the table as-is.
    pub fn apply(&self, table: &SalesTable) -> SalesTable {
        if self.is_unrestricted() {
            return table.clone();
        }
        SalesTable {
            columns: table.columns.clone(),
            rows: table
                .rows
                .iter()
                .filter(|row| self.matches(row))
                .cloned()
                .collect(),
        }
    }
}

// ── Filter options ────────────────────────────────────────────────────────────

/// Sorted distinct region names, for building the filter widget.
pub fn region_options(table: &SalesTable) -> Vec<String> {
    distinct_values(table.rows.iter().map(|row| row.region.as_deref()))
}

/// Sorted distinct category names, for building the filter widget.
pub fn category_options(table: &SalesTable) -> Vec<String> {
    distinct_values(table.rows.iter().map(|row| row.category.as_deref()))
}

fn distinct_values<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    let set: BTreeSet<&str> = values.flatten().filter(|v| !v.is_empty()).collect();
    set.into_iter().map(str::to_string).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
