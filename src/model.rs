//! Data model for aligned sequence records.
//!
//! A [`SequenceRecord`] is what the FASTA-like parser produces and what every
//! scoring component consumes. Records are immutable once parsed.
//!
//! Lengths and positions count characters, not UTF-8 bytes, everywhere in
//! the crate.

use serde::Serialize;

/// The gap character used in aligned sequences.
pub const GAP: char = '-';

/// Represents a single aligned sequence with its identifier and residues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceRecord {
    /// The sequence identifier (from the marker line, without '>')
    pub identifier: String,
    /// The aligned residues, gaps included, case preserved
    pub residues: String,
}

impl SequenceRecord {
    /// Creates a new record.
    pub fn new(identifier: impl Into<String>, residues: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            residues: residues.into(),
        }
    }

    /// Returns the aligned length in characters (gaps included).
    pub fn len(&self) -> usize {
        self.residues.chars().count()
    }

    /// Returns true if the record carries no residues.
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    /// Upper-cased residues, one per alignment column.
    pub fn columns(&self) -> impl Iterator<Item = char> + '_ {
        self.residues.chars().map(|c| c.to_ascii_uppercase())
    }

    /// Upper-cased residue at column `pos`, if any.
    pub fn residue_at(&self, pos: usize) -> Option<char> {
        self.columns().nth(pos)
    }

    /// Number of gap positions in the record.
    pub fn gap_count(&self) -> usize {
        self.residues.chars().filter(|&c| c == GAP).count()
    }
}

/// Rounds a percentage to two decimal places.
///
/// All percentage-bearing outputs go through this at construction time.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator * 100`, or `0.0` when the denominator is zero.
pub(crate) fn percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}
