//! Percentile and rank-binning helpers for customer scoring.
//!
//! The RFM engine ranks customers along each behavioral dimension and then
//! buckets the ranks into quintiles. Bucketing is an explicit two-path
//! algorithm: equal-population quantile binning first, equal-width binning
//! over the same ranks as the named fallback when the quantile invariant
//! (exactly `bins` non-empty buckets) cannot be met.

use thiserror::Error;
use tracing::debug;

// ── Percentile helper ─────────────────────────────────────────────────────────

/// Compute the `p`-th percentile of a **sorted** slice using standard linear
/// interpolation.
///
/// Returns `0.0` for an empty slice.
pub fn percentile(sorted_data: &[f64], p: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }
    let len = sorted_data.len();
    if len == 1 {
        return sorted_data[0];
    }
    let rank = (p / 100.0) * (len as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted_data[lo];
    }
    let frac = rank - lo as f64;
    sorted_data[lo] + frac * (sorted_data[hi] - sorted_data[lo])
}

// ── BinningError ──────────────────────────────────────────────────────────────

/// Why quantile binning could not satisfy its bin-count invariant.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BinningError {
    /// Fewer values than bins: some bin must end up empty.
    #[error("cannot fill {bins} bins with {got} values")]
    TooFewValues { bins: usize, got: usize },

    /// Percentile edges collapsed (too many identical values).
    #[error("quantile edges are not strictly increasing")]
    DegenerateEdges,

    /// Edges were distinct but a bin still received no values.
    #[error("quantile bin {bin} is empty")]
    EmptyBin { bin: usize },
}

// ── Quantile binning ──────────────────────────────────────────────────────────

/// Bucket `values` into `bins` equal-population groups labeled `1..=bins`.
///
/// Edges are the percentiles of `values` at `i / bins` for `i` in
/// `0..=bins`, assigned right-closed (a value on an edge falls in the lower
/// bucket; the minimum falls in bucket 1). Fails unless the result has
/// exactly `bins` non-empty buckets with strictly increasing edges.
pub fn quantile_bins(values: &[f64], bins: usize) -> Result<Vec<u8>, BinningError> {
    if values.len() < bins {
        return Err(BinningError::TooFewValues {
            bins,
            got: values.len(),
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let edges: Vec<f64> = (0..=bins)
        .map(|i| percentile(&sorted, 100.0 * i as f64 / bins as f64))
        .collect();

    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(BinningError::DegenerateEdges);
    }

    let labels: Vec<u8> = values
        .iter()
        .map(|&v| {
            let bucket = edges[1..]
                .iter()
                .position(|&edge| v <= edge)
                .unwrap_or(bins - 1);
            (bucket + 1) as u8
        })
        .collect();

    // Invariant: every bucket is populated.
    let mut occupancy = vec![0usize; bins];
    for &label in &labels {
        occupancy[label as usize - 1] += 1;
    }
    if let Some(empty) = occupancy.iter().position(|&count| count == 0) {
        return Err(BinningError::EmptyBin { bin: empty + 1 });
    }

    Ok(labels)
}

// ── Equal-width fallback ──────────────────────────────────────────────────────

/// Bucket `values` into `bins` equal-width groups labeled `1..=bins`.
///
/// The named fallback path: total for any input, including a single value
/// (zero span), which lands in the middle bucket. Buckets are right-closed
/// over the `min..max` span; empty buckets are allowed.
pub fn equal_width_bins(values: &[f64], bins: usize) -> Vec<u8> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    if span <= 0.0 {
        // Zero-width span: every value sits at the midpoint of the range.
        let middle = ((bins + 1) / 2) as u8;
        return vec![middle; values.len()];
    }

    let width = span / bins as f64;
    values
        .iter()
        .map(|&v| {
            if v <= min {
                1
            } else {
                (((v - min) / width).ceil() as usize).clamp(1, bins) as u8
            }
        })
        .collect()
}

// ── Two-path driver ───────────────────────────────────────────────────────────

/// Bucket rank values into `bins` labeled groups, never failing.
///
/// Attempts quantile binning; when its bin-count invariant cannot be met
/// (too few customers, collapsed edges) the same ranks are re-bucketed with
/// equal-width binning. Given at least one value this always produces a
/// label in `1..=bins` for every input.
pub fn bin_ranks(ranks: &[f64], bins: usize) -> Vec<u8> {
    if ranks.is_empty() {
        return Vec::new();
    }
    match quantile_bins(ranks, bins) {
        Ok(labels) => labels,
        Err(reason) => {
            debug!(%reason, "quantile binning failed; using equal-width bins");
            equal_width_bins(ranks, bins)
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
