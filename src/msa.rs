//! Multiple-alignment statistics.
//!
//! [`analyze`] aggregates a set of aligned records into column conservation
//! and the mean of every pairwise score. Pairs are enumerated as `(i, j)`
//! with `i < j`, outer loop ascending, so downstream exports are stable.
//!
//! Cost is `O(n² × L)` for `n` sequences of aligned length `L`; the pairwise
//! pass dominates. No bound is placed on input size here.

use std::collections::HashSet;

use serde::Serialize;

use crate::model::{percent, round2, SequenceRecord, GAP};
use crate::scoring::{score_records, AlignmentError, AlignmentResult, PairwiseScore, ScoringParameters};

/// Aggregate statistics for a set of aligned records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentStatistics {
    pub sequence_count: usize,
    pub alignment_length: usize,
    pub conserved_positions: usize,
    pub conservation_percent: f64,
    pub average_score: f64,
    pub average_identity_percent: f64,
    /// Mean similarity over pairs with at least one ungapped position
    pub average_similarity_percent: f64,
    /// Gap positions over all pairs, relative to `pair_count × alignment_length`
    pub gap_percent: f64,
    pub pair_count: usize,
    pub pairwise: Vec<PairwiseScore>,
}

/// Checks the record-level preconditions shared by every analysis.
fn check_records(records: &[SequenceRecord]) -> AlignmentResult<usize> {
    if records.len() < 2 {
        return Err(AlignmentError::InsufficientSequences {
            found: records.len(),
        });
    }

    let expected = records[0].len();
    if let Some(bad) = records.iter().find(|r| r.len() != expected) {
        return Err(AlignmentError::LengthMismatch {
            expected,
            found: bad.len(),
            identifier: Some(bad.identifier.clone()),
        });
    }
    Ok(expected)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Enumerates unordered pairs `(i, j)`, `i < j`, in the order used for
/// [`AlignmentStatistics::pairwise`].
pub fn pair_indices(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
}

/// Returns, per column, whether the column is conserved.
///
/// A column is conserved when no sequence has a gap there and all residues
/// agree (case-insensitively). Rejecting any gapped column is stricter than
/// only comparing the non-gap residues. Records must already be of equal
/// length; shorter records are treated as gapped past their end.
pub fn column_conservation(records: &[SequenceRecord]) -> Vec<bool> {
    let length = records.first().map_or(0, SequenceRecord::len);
    let mut columns: Vec<_> = records.iter().map(SequenceRecord::columns).collect();
    let mut seen: HashSet<char> = HashSet::new();

    (0..length)
        .map(|_| {
            seen.clear();
            let mut gapped = false;
            for column in columns.iter_mut() {
                match column.next() {
                    Some(GAP) | None => gapped = true,
                    Some(residue) => {
                        seen.insert(residue);
                    }
                }
            }
            !gapped && seen.len() == 1
        })
        .collect()
}

/// Computes conservation and aggregated pairwise statistics.
///
/// # Errors
///
/// - [`AlignmentError::InsufficientSequences`] for fewer than two records.
/// - [`AlignmentError::LengthMismatch`] if any record's length differs from
///   the first one's; the whole analysis aborts.
pub fn analyze(
    records: &[SequenceRecord],
    params: &ScoringParameters,
) -> AlignmentResult<AlignmentStatistics> {
    let alignment_length = check_records(records)?;
    let n = records.len();

    let conserved_positions = column_conservation(records)
        .into_iter()
        .filter(|&c| c)
        .count();

    let pairwise = pair_indices(n)
        .map(|(i, j)| score_records(&records[i], &records[j], params))
        .collect::<AlignmentResult<Vec<_>>>()?;

    let pair_count = pairwise.len();
    let average_score = mean(pairwise.iter().map(|p| p.score));
    let average_identity = mean(pairwise.iter().map(|p| p.identity_percent));
    let average_similarity = mean(
        pairwise
            .iter()
            .filter(|p| !p.is_degenerate())
            .map(|p| p.similarity_percent),
    );
    let total_gaps: usize = pairwise.iter().map(|p| p.gap_positions).sum();

    log::debug!(
        "analyzed {} sequences x {} columns: {} conserved, {} pairs",
        n,
        alignment_length,
        conserved_positions,
        pair_count
    );

    Ok(AlignmentStatistics {
        sequence_count: n,
        alignment_length,
        conserved_positions,
        conservation_percent: round2(percent(conserved_positions, alignment_length)),
        average_score: round2(average_score),
        average_identity_percent: round2(average_identity),
        average_similarity_percent: round2(average_similarity),
        gap_percent: round2(percent(total_gaps, pair_count * alignment_length)),
        pair_count,
        pairwise,
    })
}
