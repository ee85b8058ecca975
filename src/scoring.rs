//! Pairwise scoring of two aligned sequences.
//!
//! The score is additive over positions: matches and mismatches score per
//! position, gaps use an affine model where opening a gap run costs
//! `gap_open` and every further position of the same run costs `gap_extend`.
//! A position is a gap if either residue is `-`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{percent, round2, SequenceRecord, GAP};

/// Structural input errors raised by the scoring path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    #[error("at least 2 sequences are required for alignment scoring (found {found})")]
    InsufficientSequences { found: usize },

    #[error("sequences must have equal length: expected {expected}, found {found}{}", identifier_suffix(.identifier))]
    LengthMismatch {
        expected: usize,
        found: usize,
        identifier: Option<String>,
    },
}

fn identifier_suffix(identifier: &Option<String>) -> String {
    match identifier {
        Some(id) => format!(" for sequence '{}'", id),
        None => String::new(),
    }
}

/// Result type for scoring operations.
pub type AlignmentResult<T> = Result<T, AlignmentError>;

/// Match/mismatch scores and affine gap penalties.
///
/// Passed explicitly to every scoring call; changing a value never affects
/// results computed before.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParameters {
    pub match_score: f64,
    pub mismatch_score: f64,
    pub gap_open: f64,
    pub gap_extend: f64,
}

impl Default for ScoringParameters {
    /// DNA defaults: +2 match, -1 mismatch, -2 gap open, -0.5 gap extend.
    fn default() -> Self {
        Self {
            match_score: 2.0,
            mismatch_score: -1.0,
            gap_open: -2.0,
            gap_extend: -0.5,
        }
    }
}

/// Optional per-field overrides for [`ScoringParameters`].
///
/// Used by the configuration file and command-line flags: only the fields
/// that are set replace the base values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ScoringOverrides {
    pub match_score: Option<f64>,
    pub mismatch_score: Option<f64>,
    pub gap_open: Option<f64>,
    pub gap_extend: Option<f64>,
}

impl ScoringParameters {
    /// Returns a copy with the set fields of `overrides` applied.
    pub fn with_overrides(mut self, overrides: &ScoringOverrides) -> Self {
        if let Some(v) = overrides.match_score {
            self.match_score = v;
        }
        if let Some(v) = overrides.mismatch_score {
            self.mismatch_score = v;
        }
        if let Some(v) = overrides.gap_open {
            self.gap_open = v;
        }
        if let Some(v) = overrides.gap_extend {
            self.gap_extend = v;
        }
        self
    }
}

/// Score breakdown for one pair of aligned sequences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseScore {
    pub score: f64,
    pub matches: usize,
    pub mismatches: usize,
    pub gap_positions: usize,
    /// Number of maximal gap runs (openings, not extensions)
    pub gap_runs: usize,
    /// matches / length, gaps included in the denominator
    pub identity_percent: f64,
    /// matches / ungapped length; 0 when every position is a gap
    pub similarity_percent: f64,
    pub length: usize,
}

impl PairwiseScore {
    /// True when no ungapped position exists, so similarity is undefined
    /// and reported as 0.
    pub fn is_degenerate(&self) -> bool {
        self.length == self.gap_positions
    }

    /// Gap positions as a percentage of the alignment length.
    pub fn gap_percent(&self) -> f64 {
        round2(percent(self.gap_positions, self.length))
    }
}

/// Scores two aligned residue strings.
///
/// Fails with [`AlignmentError::LengthMismatch`] before scoring anything if
/// the lengths differ.
///
/// # Examples
///
/// ```
/// use alnscore::scoring::{score_pair, ScoringParameters};
///
/// let result = score_pair("AC-GT", "AC-GA", &ScoringParameters::default()).unwrap();
/// assert_eq!(result.matches, 3);
/// assert_eq!(result.score, 3.0);
/// ```
pub fn score_pair(a: &str, b: &str, params: &ScoringParameters) -> AlignmentResult<PairwiseScore> {
    let (len_a, len_b) = (a.chars().count(), b.chars().count());
    if len_a != len_b {
        return Err(AlignmentError::LengthMismatch {
            expected: len_a,
            found: len_b,
            identifier: None,
        });
    }

    let mut score = 0.0;
    let mut matches = 0;
    let mut mismatches = 0;
    let mut gap_positions = 0;
    let mut gap_runs = 0;
    let mut in_gap = false;

    for (x, y) in a.chars().zip(b.chars()) {
        let (x, y) = (x.to_ascii_uppercase(), y.to_ascii_uppercase());

        if x == GAP || y == GAP {
            gap_positions += 1;
            if in_gap {
                score += params.gap_extend;
            } else {
                score += params.gap_open;
                gap_runs += 1;
                in_gap = true;
            }
        } else {
            in_gap = false;
            if x == y {
                matches += 1;
                score += params.match_score;
            } else {
                mismatches += 1;
                score += params.mismatch_score;
            }
        }
    }

    let length = len_a;
    Ok(PairwiseScore {
        score,
        matches,
        mismatches,
        gap_positions,
        gap_runs,
        identity_percent: round2(percent(matches, matches + mismatches + gap_positions)),
        similarity_percent: round2(percent(matches, length - gap_positions)),
        length,
    })
}

/// Scores two parsed records, naming the second record on length mismatch.
pub fn score_records(
    a: &SequenceRecord,
    b: &SequenceRecord,
    params: &ScoringParameters,
) -> AlignmentResult<PairwiseScore> {
    score_pair(&a.residues, &b.residues, params).map_err(|e| match e {
        AlignmentError::LengthMismatch { expected, found, .. } => AlignmentError::LengthMismatch {
            expected,
            found,
            identifier: Some(b.identifier.clone()),
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_score(a: &str, b: &str) -> PairwiseScore {
        score_pair(a, b, &ScoringParameters::default()).unwrap()
    }

    #[test]
    fn test_identical_gap_free() {
        let r = default_score("ACGTACGTAC", "ACGTACGTAC");

        assert_eq!(r.matches, 10);
        assert_eq!(r.mismatches, 0);
        assert_eq!(r.score, 20.0);
        assert_eq!(r.identity_percent, 100.0);
        assert_eq!(r.similarity_percent, 100.0);
        assert_eq!(r.gap_runs, 0);
        assert_eq!(r.length, 10);
    }

    #[test]
    fn test_gap_open_then_mismatch() {
        let r = default_score("AC-GT", "AC-GA");

        assert_eq!(r.matches, 3);
        assert_eq!(r.mismatches, 1);
        assert_eq!(r.gap_positions, 1);
        assert_eq!(r.gap_runs, 1);
        assert_eq!(r.score, 3.0);
        assert_eq!(r.identity_percent, 60.0);
        assert_eq!(r.similarity_percent, 75.0);
    }

    #[test]
    fn test_affine_gap_extension() {
        // Gap run of 3 in one sequence: -2 - 0.5 - 0.5, then two matches
        let r = default_score("A---CG", "ATTTCG");

        assert_eq!(r.gap_positions, 3);
        assert_eq!(r.gap_runs, 1);
        assert_eq!(r.score, 2.0 - 2.0 - 0.5 - 0.5 + 2.0 + 2.0);
    }

    #[test]
    fn test_gap_runs_reset_after_residue() {
        // Gaps in alternating sequences still form a single run when adjacent
        let r = default_score("-A-T", "A-TT");
        assert_eq!(r.gap_runs, 1);
        assert_eq!(r.gap_positions, 3);

        let r = default_score("-A-T", "-ATT");
        assert_eq!(r.gap_runs, 2);
    }

    #[test]
    fn test_leading_gap_opens_run() {
        let r = default_score("-ACG", "TACG");
        assert_eq!(r.gap_runs, 1);
        assert_eq!(r.score, -2.0 + 6.0);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let r = default_score("acgt", "ACGT");
        assert_eq!(r.matches, 4);
    }

    #[test]
    fn test_length_mismatch() {
        let result = score_pair("ACGT", "ACG", &ScoringParameters::default());
        assert!(matches!(
            result,
            Err(AlignmentError::LengthMismatch { expected: 4, found: 3, .. })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // "Aé" is two characters but three UTF-8 bytes
        let result = score_pair("Aé", "ACG", &ScoringParameters::default());
        assert_eq!(
            result,
            Err(AlignmentError::LengthMismatch {
                expected: 2,
                found: 3,
                identifier: None,
            })
        );

        let r = default_score("Aé-", "AC-");
        assert_eq!(r.length, 3);
        assert_eq!(r.matches, 1);
        assert_eq!(r.mismatches, 1);
        assert_eq!(r.gap_positions, 1);
    }

    #[test]
    fn test_score_records_names_identifier() {
        let a = SequenceRecord::new("a", "ACGT");
        let b = SequenceRecord::new("b", "AC");
        let err = score_records(&a, &b, &ScoringParameters::default()).unwrap_err();
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_all_gap_is_degenerate() {
        let r = default_score("----", "AC--");

        assert!(r.is_degenerate());
        assert_eq!(r.similarity_percent, 0.0);
        assert_eq!(r.identity_percent, 0.0);
        assert_eq!(r.gap_percent(), 100.0);
    }

    #[test]
    fn test_empty_sequences() {
        let r = default_score("", "");
        assert_eq!(r.length, 0);
        assert_eq!(r.identity_percent, 0.0);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn test_symmetry_and_exhaustive_counts() {
        let pairs = [
            ("AC-GTTA--C", "ACCG-TAG-C"),
            ("aaaa----tt", "A-A-A-A-TT"),
            ("NNXXU-ACGT", "nxxnu-TGCA"),
        ];
        for (a, b) in pairs {
            let ab = default_score(a, b);
            let ba = default_score(b, a);
            assert_eq!(ab, ba);
            assert_eq!(ab.matches + ab.mismatches + ab.gap_positions, ab.length);
        }
    }

    #[test]
    fn test_custom_parameters() {
        let params = ScoringParameters {
            match_score: 1.0,
            mismatch_score: -3.0,
            gap_open: -5.0,
            gap_extend: -1.0,
        };
        let r = score_pair("AC--T", "AGGGT", &params).unwrap();
        assert_eq!(r.score, 1.0 - 3.0 - 5.0 - 1.0 + 1.0);
    }

    #[test]
    fn test_overrides_apply_only_set_fields() {
        let overrides = ScoringOverrides {
            gap_open: Some(-4.0),
            ..Default::default()
        };
        let params = ScoringParameters::default().with_overrides(&overrides);
        assert_eq!(params.gap_open, -4.0);
        assert_eq!(params.match_score, 2.0);
        assert_eq!(params.gap_extend, -0.5);
    }
}
