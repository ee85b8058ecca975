//! FASTA-like record parser.
//!
//! This module turns raw aligned-sequence text into [`SequenceRecord`]s.
//! It supports both single-line and multi-line sequences.
//!
//! ## Format
//!
//! ```text
//! >sequence_identifier
//! ACGT-ACGTACGT...
//! >another_sequence
//! TGCA-TGCATGCA...
//! ```
//!
//! The parser is permissive: it never fails. Lines before the first marker
//! are ignored, empty identifiers are kept, and residue characters are not
//! checked (that is the validator's job).

use crate::model::SequenceRecord;

/// The character that starts a record header line.
pub const MARKER: char = '>';

/// Parses record text into an ordered list of records.
///
/// # Examples
///
/// ```
/// use alnscore::fasta::parse_records;
///
/// let records = parse_records(">a\nAC-G\n>b\nACTG\n");
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].residues, "ACTG");
/// ```
pub fn parse_records(text: &str) -> Vec<SequenceRecord> {
    let mut records = Vec::new();
    let mut current: Option<SequenceRecord> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(header) = line.strip_prefix(MARKER) {
            // Finalize the previous record before opening a new one
            if let Some(done) = current.take() {
                records.push(done);
            }
            current = Some(SequenceRecord::new(header.trim(), String::new()));
        } else if !line.is_empty() {
            match current.as_mut() {
                Some(record) => record.residues.push_str(line),
                None => log::trace!("ignoring residue line before first marker"),
            }
        }
    }

    // Don't forget the last record
    if let Some(done) = current {
        records.push(done);
    }

    log::debug!("parsed {} records", records.len());
    records
}
