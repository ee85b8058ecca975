//! Summaries, comparisons and export formats.
//!
//! This is the presentation side of the crate: it combines parsing, analysis
//! and rating into an [`AlignmentSummary`] per alignment, and serialises
//! summaries as JSON, CSV or a plain-text report. Percentages are already
//! rounded when they reach this module; exports print them with 2 decimals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::fasta::parse_records;
use crate::model::{round2, SequenceRecord};
use crate::msa::{analyze, pair_indices, AlignmentStatistics};
use crate::quality::{rate, QualityInputs, QualityLabel};
use crate::scoring::{AlignmentResult, ScoringParameters};
use crate::validate::ValidationReport;

const WRAP_WIDTH: usize = 78;

/// Errors that can occur while exporting summaries.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format: {0} (expected json, csv or txt)")]
    UnsupportedFormat(String),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Output format for [`export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "txt" | "text" => Ok(ExportFormat::Text),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Text => write!(f, "txt"),
        }
    }
}

/// Everything the presentation layer needs about one alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentSummary {
    /// Name of the model (or source) that produced the alignment
    pub model: String,
    pub sequence_count: usize,
    pub alignment_length: usize,
    pub statistics: AlignmentStatistics,
    /// Composite score from the aggregate statistics
    pub quality: f64,
    /// Label from the average pairwise identity
    pub label: QualityLabel,
    pub generated_at: Option<DateTime<Utc>>,
}

impl AlignmentSummary {
    /// Builds a summary from already-parsed records.
    pub fn from_records(
        model: impl Into<String>,
        records: &[SequenceRecord],
        params: &ScoringParameters,
    ) -> AlignmentResult<Self> {
        let statistics = analyze(records, params)?;
        let quality = round2(rate(&QualityInputs::from_statistics(&statistics)));
        let label = QualityLabel::from_percent(statistics.average_identity_percent);

        Ok(Self {
            model: model.into(),
            sequence_count: statistics.sequence_count,
            alignment_length: statistics.alignment_length,
            statistics,
            quality,
            label,
            generated_at: None,
        })
    }

    /// Stamps the summary with the time it was produced.
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }
}

/// Parses, analyzes and rates alignment text.
pub fn summarize(
    model: impl Into<String>,
    text: &str,
    params: &ScoringParameters,
) -> AlignmentResult<AlignmentSummary> {
    AlignmentSummary::from_records(model, &parse_records(text), params)
}

/// Differences between two summaries (`a - b`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentComparison {
    pub quality_difference: f64,
    pub conservation_difference: f64,
    pub identity_difference: f64,
    pub similarity_difference: f64,
    pub better_model: String,
}

/// Compares two summaries. Ties go to `b`.
pub fn compare(a: &AlignmentSummary, b: &AlignmentSummary) -> AlignmentComparison {
    let (sa, sb) = (&a.statistics, &b.statistics);
    let better = if a.quality > b.quality { a } else { b };

    AlignmentComparison {
        quality_difference: round2(a.quality - b.quality),
        conservation_difference: round2(sa.conservation_percent - sb.conservation_percent),
        identity_difference: round2(sa.average_identity_percent - sb.average_identity_percent),
        similarity_difference: round2(
            sa.average_similarity_percent - sb.average_similarity_percent,
        ),
        better_model: better.model.clone(),
    }
}

/// Serialises summaries in the requested format.
pub fn export(summaries: &[AlignmentSummary], format: ExportFormat) -> ExportResult<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(summaries)?),
        ExportFormat::Csv => export_csv(summaries),
        ExportFormat::Text => Ok(TextExport(summaries).to_string()),
    }
}

const CSV_HEADER: [&str; 6] = [
    "model",
    "quality",
    "conservation",
    "identity",
    "similarity",
    "gap_percent",
];

fn export_csv(summaries: &[AlignmentSummary]) -> ExportResult<String> {
    let mut w = csv::WriterBuilder::new().from_writer(Vec::new());
    w.write_record(CSV_HEADER)?;
    for s in summaries {
        let st = &s.statistics;
        w.write_record([
            s.model.clone(),
            format!("{:.2}", s.quality),
            format!("{:.2}", st.conservation_percent),
            format!("{:.2}", st.average_identity_percent),
            format!("{:.2}", st.average_similarity_percent),
            format!("{:.2}", st.gap_percent),
        ])?;
    }
    let bytes = w
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

struct TextExport<'a>(&'a [AlignmentSummary]);

impl fmt::Display for TextExport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ALIGNMENT REPORT")?;
        writeln!(f, "================")?;
        writeln!(f)?;
        for s in self.0 {
            let st = &s.statistics;
            writeln!(f, "Model: {}", s.model)?;
            writeln!(f, "Quality: {:.2}% ({})", s.quality, s.label)?;
            writeln!(f, "Conservation: {:.2}%", st.conservation_percent)?;
            writeln!(f, "Identity: {:.2}%", st.average_identity_percent)?;
            writeln!(f, "Similarity: {:.2}%", st.average_similarity_percent)?;
            writeln!(f, "Gaps: {:.2}%", st.gap_percent)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

struct StatisticsReport<'a>(&'a AlignmentStatistics);

impl fmt::Display for StatisticsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.0;
        let label = QualityLabel::from_percent(stats.average_identity_percent);

        writeln!(f, "Alignment Quality Report")?;
        writeln!(f, "------------------------")?;
        writeln!(f, "Basic statistics:")?;
        writeln!(f, "  Sequences:            {}", stats.sequence_count)?;
        writeln!(f, "  Alignment length:     {}", stats.alignment_length)?;
        writeln!(f, "  Conserved positions:  {}", stats.conserved_positions)?;
        writeln!(f, "  Conservation:         {:.2}%", stats.conservation_percent)?;
        writeln!(f, "Quality metrics:")?;
        writeln!(f, "  Average score:        {:.2}", stats.average_score)?;
        writeln!(f, "  Average identity:     {:.2}%", stats.average_identity_percent)?;
        writeln!(f, "  Average similarity:   {:.2}%", stats.average_similarity_percent)?;
        writeln!(f, "  Gaps:                 {:.2}%", stats.gap_percent)?;
        writeln!(f, "  Pairwise comparisons: {}", stats.pair_count)?;
        writeln!(f, "Assessment: {}", label)
    }
}

/// Plain-text quality report for one set of statistics.
pub fn render_statistics(stats: &AlignmentStatistics) -> String {
    StatisticsReport(stats).to_string()
}

struct PairwiseReport<'a> {
    records: &'a [SequenceRecord],
    stats: &'a AlignmentStatistics,
}

impl fmt::Display for PairwiseReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = pair_indices(self.records.len()).zip(&self.stats.pairwise);
        for ((i, j), pair) in pairs {
            writeln!(
                f,
                "{} vs {}: score {:.2}, identity {:.2}%, similarity {:.2}%, {} gap positions in {} runs",
                self.records[i].identifier,
                self.records[j].identifier,
                pair.score,
                pair.identity_percent,
                pair.similarity_percent,
                pair.gap_positions,
                pair.gap_runs
            )?;
        }
        Ok(())
    }
}

/// One line per pairwise result, labelled with the record identifiers.
pub fn render_pairwise(records: &[SequenceRecord], stats: &AlignmentStatistics) -> String {
    PairwiseReport { records, stats }.to_string()
}

struct ValidationText<'a>(&'a ValidationReport);

impl fmt::Display for ValidationText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let wrap = textwrap::Options::new(WRAP_WIDTH)
            .initial_indent("  - ")
            .subsequent_indent("    ");

        let status = if report.is_valid() { "VALID" } else { "INVALID" };
        writeln!(f, "Validation: {}", status)?;
        writeln!(f, "Sequences: {}", report.sequence_count)?;
        writeln!(f, "Total residue length: {}", report.total_residue_length)?;
        if let Some(avg) = report.average_residue_length {
            writeln!(f, "Average residue length: {:.2}", avg)?;
        }

        for (title, findings) in [("Errors", &report.errors), ("Warnings", &report.warnings)] {
            if findings.is_empty() {
                continue;
            }
            writeln!(f, "{}:", title)?;
            for finding in findings {
                writeln!(f, "{}", textwrap::fill(finding, &wrap))?;
            }
        }
        Ok(())
    }
}

/// Plain-text rendering of a validation report.
pub fn render_validation(report: &ValidationReport) -> String {
    ValidationText(report).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    const SAMPLE: &str = ">a\nACGTACGT\n>b\nACGTACGA\n>c\nAC-TACGT\n";

    fn sample(model: &str) -> AlignmentSummary {
        summarize(model, SAMPLE, &ScoringParameters::default()).unwrap()
    }

    #[test]
    fn test_summarize() {
        let s = sample("NeedlemanWunsch");

        assert_eq!(s.model, "NeedlemanWunsch");
        assert_eq!(s.sequence_count, 3);
        assert_eq!(s.alignment_length, 8);
        assert_eq!(s.statistics.pair_count, 3);
        assert!((0.0..=100.0).contains(&s.quality));
        assert_eq!(s.label, QualityLabel::Excellent);
        assert!(s.generated_at.is_none());
    }

    #[test]
    fn test_summarize_propagates_structural_errors() {
        let result = summarize("m", ">a\nACGT\n", &ScoringParameters::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_compare() {
        let good = sample("good");
        let poor = summarize("poor", ">a\nAAAA\n>b\nTT-T\n", &ScoringParameters::default()).unwrap();

        let cmp = compare(&good, &poor);
        assert_eq!(cmp.better_model, "good");
        assert!(cmp.quality_difference > 0.0);
        assert_eq!(cmp.quality_difference, round2(good.quality - poor.quality));

        // Equal quality: the second argument wins
        let cmp = compare(&good, &sample("other"));
        assert_eq!(cmp.better_model, "other");
        assert_eq!(cmp.quality_difference, 0.0);
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!(matches!(
            "xml".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_export_json() {
        let json = export(&[sample("m1")], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["model"], "m1");
        assert_eq!(value[0]["statistics"]["pair_count"], 3);
        assert_eq!(value[0]["label"], "Excellent");
    }

    #[test]
    fn test_export_csv() {
        let csv = export(&[sample("m1"), sample("a,b")], ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "model,quality,conservation,identity,similarity,gap_percent");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("m1,"));
        assert!(lines[2].starts_with("\"a,b\","));
        assert_eq!(lines[1].split(',').count(), 6);
    }

    #[test]
    fn test_export_csv_reads_back_awkward_model_names() {
        let names = ["plain", "a,b", "say \"hi\"", "two\nlines"];
        let summaries: Vec<_> = names.iter().map(|n| sample(n)).collect();
        let out = export(&summaries, ExportFormat::Csv).unwrap();

        let mut reader = csv::Reader::from_reader(out.as_bytes());
        let header: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(header, CSV_HEADER);
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

        assert_eq!(rows.len(), names.len());
        for (row, name) in rows.iter().zip(names) {
            assert_eq!(row.len(), 6);
            assert_eq!(&row[0], name);
            assert_eq!(&row[2], "75.00");
        }
    }

    #[test]
    fn test_export_text() {
        let text = export(&[sample("m1")], ExportFormat::Text).unwrap();

        assert!(text.starts_with("ALIGNMENT REPORT"));
        assert!(text.contains("Model: m1"));
        assert!(text.contains("Conservation: 75.00%"));
    }

    #[test]
    fn test_render_statistics_and_pairs() {
        let records = parse_records(SAMPLE);
        let stats = analyze(&records, &ScoringParameters::default()).unwrap();

        let report = render_statistics(&stats);
        assert!(report.contains("Pairwise comparisons: 3"));
        assert!(report.contains("Assessment: Excellent"));

        let pairs = render_pairwise(&records, &stats);
        let lines: Vec<&str> = pairs.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("a vs b:"));
        assert!(lines[2].starts_with("b vs c:"));
    }

    #[test]
    fn test_render_validation_wraps_long_findings() {
        let long_line = "Z".repeat(60);
        let report = validate(&format!(">a\n{}\n", long_line));
        let text = render_validation(&report);

        assert!(text.starts_with("Validation: INVALID"));
        assert!(text.contains("Errors:\n  - at least 2 sequences required"));
        assert!(text.contains("Warnings:"));
        assert!(text.lines().all(|l| l.chars().count() <= WRAP_WIDTH));
    }
}
