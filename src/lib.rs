//! # alnscore - Alignment Quality Scoring
//!
//! Quality metrics for already-aligned sequences in a FASTA-like format.
//!
//! ## Architecture
//!
//! The scoring core is a set of stateless functions:
//! - `fasta`: record parsing (never fails)
//! - `scoring`: pairwise score with affine gaps, `ScoringParameters`
//! - `msa`: conservation and aggregated pairwise statistics
//! - `quality`: composite 0-100 score, labels and severity tiers
//! - `validate`: line-oriented validation with accumulated findings
//!
//! Around it:
//! - `report`: summaries, comparisons, JSON/CSV/text export
//! - `dataset`: `<root>/<model>/<file>` alignment directories
//! - `config`: TOML scoring configuration
//!
//! ```
//! use alnscore::{fasta, msa, quality, scoring::ScoringParameters};
//!
//! let records = fasta::parse_records(">a\nACGT\n>b\nACGA\n");
//! let stats = msa::analyze(&records, &ScoringParameters::default()).unwrap();
//! let score = quality::rate(&quality::QualityInputs::from_statistics(&stats));
//! assert!((0.0..=100.0).contains(&score));
//! ```

pub mod config;
pub mod dataset;
pub mod fasta;
pub mod model;
pub mod msa;
pub mod quality;
pub mod report;
pub mod scoring;
pub mod validate;
