//! Rank-based quantile binning.
//!
//! Values are ranked "first seen" (ties get strictly increasing ranks in
//! input order), the rank sequence is cut at its `bins + 1` linearly
//! interpolated quantiles, and each element is labelled with the bucket its
//! rank falls into. 1 = lowest.
//!
//! RULE: a column whose values are all identical never reaches the cut
//! logic. Every element gets the middle bin instead.

use crate::types::Score;
use std::cmp::Ordering;

/// Bin count used for every R/F/M column.
pub const SCORE_BINS: usize = 5;

/// The bin assigned to every element of a constant column.
pub fn middle_bin(bins: usize) -> Score {
    to_score(bins / 2 + 1)
}

/// Label each value with a quantile bin in `1..=bins` (fewer if cut points
/// collapse). With `reverse`, labels are mirrored so the lowest values get
/// the highest bin.
///
/// Output has the same length and order as `values`. Empty input yields an
/// empty vector.
pub fn qcut_safe<T: PartialOrd>(values: &[T], bins: usize, reverse: bool) -> Vec<Score> {
    let n = values.len();
    if n == 0 || bins == 0 {
        return vec![0; n];
    }

    if all_identical(values) {
        return vec![middle_bin(bins); n];
    }

    let ranks = first_seen_ranks(values);
    let edges = scaled_cut_points(n, bins);

    let mut labels: Vec<Score> = ranks
        .iter()
        .map(|&rank| bin_for_rank(rank, bins, &edges))
        .collect();

    if reverse {
        let max_label = labels.iter().copied().max().unwrap_or(0);
        for label in &mut labels {
            *label = max_label - *label + 1;
        }
    }

    log::debug!(
        "qcut: n={n} bins={bins} edges={} reverse={reverse}",
        edges.len().saturating_sub(1)
    );

    labels
}

fn all_identical<T: PartialOrd>(values: &[T]) -> bool {
    match values.split_first() {
        Some((first, rest)) => rest.iter().all(|v| v.partial_cmp(first) == Some(Ordering::Equal)),
        None => true,
    }
}

/// 1-based ranks. Equal values are ranked in the order they appear.
fn first_seen_ranks<T: PartialOrd>(values: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // sort_by is stable, which is what gives the first-seen tie-break.
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0; values.len()];
    for (position, &idx) in order.iter().enumerate() {
        ranks[idx] = position + 1;
    }
    ranks
}

/// Quantile cut points of the ranks 1..=n, multiplied by `bins`.
///
/// The k-th cut point is `1 + k * (n - 1) / bins`; scaling by `bins` keeps
/// the arithmetic exact. Duplicates are dropped.
fn scaled_cut_points(n: usize, bins: usize) -> Vec<usize> {
    let mut edges: Vec<usize> = (0..=bins).map(|k| bins + k * (n - 1)).collect();
    edges.dedup();
    edges
}

/// Buckets are `(edge[j-1], edge[j]]`, the first one closed on the left.
fn bin_for_rank(rank: usize, bins: usize, edges: &[usize]) -> Score {
    let scaled = rank * bins;
    let bucket = edges
        .iter()
        .skip(1)
        .position(|&edge| scaled <= edge)
        .map_or(edges.len().saturating_sub(1), |p| p + 1);
    to_score(bucket.max(1))
}

fn to_score(bin: usize) -> Score {
    Score::try_from(bin).unwrap_or(Score::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_column_gets_middle_bin() {
        assert_eq!(qcut_safe(&[7.0, 7.0, 7.0], 5, false), vec![3, 3, 3]);
        assert_eq!(qcut_safe(&[7.0, 7.0, 7.0], 5, true), vec![3, 3, 3]);
        assert_eq!(qcut_safe(&[42], 5, false), vec![3]);
        assert_eq!(middle_bin(4), 3);
    }

    #[test]
    fn ten_distinct_values_fill_five_bins_evenly() {
        let values: Vec<i64> = (1..=10).collect();
        assert_eq!(
            qcut_safe(&values, 5, false),
            vec![1, 1, 2, 2, 3, 3, 4, 4, 5, 5]
        );
    }

    #[test]
    fn ties_are_ranked_in_input_order() {
        // Ranks 1, 2, 3 for the three 1s; 4 for the 10.
        let labels = qcut_safe(&[1, 1, 1, 10], 5, false);
        assert_eq!(labels, vec![1, 2, 4, 5]);
    }

    #[test]
    fn two_values_land_in_outer_bins() {
        assert_eq!(qcut_safe(&[3.0, 1.0], 5, false), vec![5, 1]);
    }

    #[test]
    fn reverse_mirrors_labels() {
        let values: Vec<i64> = (1..=10).collect();
        assert_eq!(
            qcut_safe(&values, 5, true),
            vec![5, 5, 4, 4, 3, 3, 2, 2, 1, 1]
        );
    }

    #[test]
    fn output_preserves_input_order() {
        let labels = qcut_safe(&[50.0, 10.0, 40.0, 20.0, 30.0], 5, false);
        assert_eq!(labels, vec![5, 1, 4, 2, 3]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let empty: [f64; 0] = [];
        assert!(qcut_safe(&empty, 5, false).is_empty());
    }

    #[test]
    fn cut_points_collapse_when_bins_exceed_ranks() {
        // n = 1 never reaches here in practice; exercise dedup directly.
        assert_eq!(scaled_cut_points(1, 5), vec![5]);
        assert_eq!(scaled_cut_points(3, 2), vec![2, 4, 6]);
    }
}
