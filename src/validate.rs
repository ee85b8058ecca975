//! Line-oriented structural validation of alignment text.
//!
//! Validation is independent of the record parser: it scans raw lines and
//! accumulates every finding instead of stopping at the first one. Bad
//! residue characters are warnings; only structural problems are errors.
//!
//! The length-consistency check compares individual *line* lengths, not
//! assembled record lengths. A multi-line record can therefore pass here and
//! still fail the analyzer's per-record check, or the other way round.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::fasta::MARKER;

/// Residues accepted without a warning (compared case-insensitively).
pub const LEGAL_RESIDUES: &[u8] = b"ACGTUNX-";

/// Accumulated findings plus the counts gathered during the scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub sequence_count: usize,
    pub total_residue_length: usize,
    /// `total_residue_length / sequence_count`; `None` without any marker line
    pub average_residue_length: Option<f64>,
}

impl ValidationReport {
    /// True iff no errors were found. Warnings never affect validity.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn is_legal(c: char) -> bool {
    c.is_ascii() && LEGAL_RESIDUES.contains(&(c as u8).to_ascii_uppercase())
}

/// Validates raw alignment text.
///
/// # Examples
///
/// ```
/// use alnscore::validate::validate;
///
/// let report = validate(">a\nACGT\n>b\nACZT\n");
/// assert!(report.is_valid());
/// assert_eq!(report.warnings.len(), 1);
/// ```
pub fn validate(text: &str) -> ValidationReport {
    let mut report = ValidationReport::default();

    if text.trim().is_empty() {
        report.errors.push("input is empty".to_string());
        return report;
    }

    let mut line_lengths = BTreeSet::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();

        if line.starts_with(MARKER) {
            report.sequence_count += 1;
            if line.chars().count() < 2 {
                report
                    .errors
                    .push(format!("line {}: invalid sequence identifier", line_number));
            }
        } else if !line.is_empty() {
            let illegal: Vec<String> = line
                .chars()
                .filter(|&c| !is_legal(c))
                .map(String::from)
                .collect();
            if !illegal.is_empty() {
                report.warnings.push(format!(
                    "line {}: non-standard characters found: {}",
                    line_number,
                    illegal.join(", ")
                ));
            }

            let length = line.chars().count();
            report.total_residue_length += length;
            line_lengths.insert(length);
        }
    }

    if report.sequence_count < 2 {
        report.errors.push("at least 2 sequences required".to_string());
    }

    if line_lengths.len() > 1 {
        report.errors.push("sequences must be equal length".to_string());
    }

    if report.sequence_count > 0 {
        report.average_residue_length =
            Some(report.total_residue_length as f64 / report.sequence_count as f64);
    }

    log::debug!(
        "validated {} sequences: {} errors, {} warnings",
        report.sequence_count,
        report.errors.len(),
        report.warnings.len()
    );
    report
}
