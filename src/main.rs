//! alnscore - Alignment quality scoring
//!
//! ## Usage
//!
//! ```bash
//! alnscore validate <alignment_file>
//! alnscore analyze <alignment_file> -f json -o stats.json
//! alnscore compare --data data/ NC_002018_NC_002019.aln -f csv
//! ```

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

use alnscore::config::load_scoring_config;
use alnscore::dataset::Dataset;
use alnscore::fasta::parse_records;
use alnscore::report::{
    compare, export, render_pairwise, render_statistics, render_validation, AlignmentSummary,
    ExportFormat,
};
use alnscore::scoring::{ScoringOverrides, ScoringParameters};
use alnscore::validate::validate;

/// Output format specification for command line
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Pretty-printed JSON
    Json,
    /// Comma-separated values, one row per alignment
    Csv,
    /// Plain-text report
    Txt,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Txt => ExportFormat::Text,
        }
    }
}

/// Scoring parameter overrides (take precedence over --config)
#[derive(ClapArgs, Debug, Clone, Copy)]
struct ScoringArgs {
    /// Score for identical residues
    #[arg(long = "match", global = true, allow_negative_numbers = true)]
    match_score: Option<f64>,

    /// Score for differing residues
    #[arg(long = "mismatch", global = true, allow_negative_numbers = true)]
    mismatch_score: Option<f64>,

    /// Penalty for the first position of a gap run
    #[arg(long = "gap-open", global = true, allow_negative_numbers = true)]
    gap_open: Option<f64>,

    /// Penalty for each further position of a gap run
    #[arg(long = "gap-extend", global = true, allow_negative_numbers = true)]
    gap_extend: Option<f64>,
}

impl From<ScoringArgs> for ScoringOverrides {
    fn from(args: ScoringArgs) -> Self {
        ScoringOverrides {
            match_score: args.match_score,
            mismatch_score: args.mismatch_score,
            gap_open: args.gap_open,
            gap_extend: args.gap_extend,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check alignment text for structural problems
    Validate {
        /// Alignment file (FASTA-like)
        file: PathBuf,
    },

    /// Score one alignment
    Analyze {
        /// Alignment file (FASTA-like)
        file: PathBuf,

        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value = "txt")]
        format: FormatArg,

        /// Output file. Use "-" for stdout.
        #[arg(short = 'o', long = "output", default_value = "-")]
        output: String,

        /// Also list every pairwise comparison (text format only)
        #[arg(long = "pairs")]
        pairs: bool,
    },

    /// Score the same alignment file across every model of a dataset
    Compare {
        /// Dataset directory containing one sub-directory per model
        #[arg(short = 'd', long = "data")]
        data: PathBuf,

        /// File name to look up in each model directory
        file: String,

        /// Output format
        #[arg(short = 'f', long = "format", value_enum, default_value = "txt")]
        format: FormatArg,

        /// Output file. Use "-" for stdout.
        #[arg(short = 'o', long = "output", default_value = "-")]
        output: String,
    },
}

/// alnscore - Quality metrics for multiple sequence alignments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// TOML file with a [scoring] table
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    scoring: ScoringArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn scoring_parameters(config: Option<&Path>, overrides: ScoringOverrides) -> Result<ScoringParameters> {
    let base = match config {
        Some(path) => load_scoring_config(path)?,
        None => ScoringParameters::default(),
    };
    let params = base.with_overrides(&overrides);
    log::info!("scoring parameters: {:?}", params);
    Ok(params)
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Writes to stdout for "-", otherwise to a file.
fn write_output(output: &str, content: &str) -> Result<()> {
    if output == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(content.as_bytes())?;
    } else {
        fs::write(output, content).with_context(|| format!("Failed to write {}", output))?;
        eprintln!("Wrote report to {}", output);
    }
    Ok(())
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn run_validate(file: &Path) -> Result<bool> {
    let report = validate(&read_input(file)?);
    print!("{}", render_validation(&report));
    Ok(report.is_valid())
}

fn run_analyze(
    file: &Path,
    format: FormatArg,
    output: &str,
    pairs: bool,
    params: &ScoringParameters,
) -> Result<()> {
    let text = read_input(file)?;
    let records = parse_records(&text);
    let summary = AlignmentSummary::from_records(model_name(file), &records, params)
        .with_context(|| format!("Cannot score {}", file.display()))?
        .with_timestamp(chrono::Utc::now());

    let content = match format {
        FormatArg::Txt => {
            let mut content = render_statistics(&summary.statistics);
            content.push_str(&format!("Quality score: {:.2}\n", summary.quality));
            if pairs {
                content.push('\n');
                content.push_str(&render_pairwise(&records, &summary.statistics));
            }
            content
        }
        other => export(&[summary], other.into())?,
    };
    write_output(output, &content)
}

fn run_compare(
    data: &Path,
    file: &str,
    format: FormatArg,
    output: &str,
    params: &ScoringParameters,
) -> Result<()> {
    let dataset = Dataset::open(data)?;
    let metadata = dataset.metadata(file)?;
    if metadata.models_with_file.is_empty() {
        anyhow::bail!(
            "No model in {} provides {} ({} models checked)",
            data.display(),
            file,
            metadata.total_models
        );
    }

    let now = chrono::Utc::now();
    let mut summaries = Vec::with_capacity(metadata.models_with_file.len());
    for model in &metadata.models_with_file {
        let text = dataset.load(model, file)?;
        match AlignmentSummary::from_records(model.as_str(), &parse_records(&text), params) {
            Ok(summary) => summaries.push(summary.with_timestamp(now)),
            Err(e) => log::warn!("skipping {}/{}: {}", model, file, e),
        }
    }
    if summaries.is_empty() {
        anyhow::bail!("No alignment of {} could be scored", file);
    }

    let mut content = export(&summaries, format.into())?;
    if matches!(format, FormatArg::Txt) {
        for (i, a) in summaries.iter().enumerate() {
            for b in &summaries[i + 1..] {
                let cmp = compare(a, b);
                content.push_str(&format!(
                    "{} vs {}: quality {:+.2}, conservation {:+.2}, identity {:+.2}, similarity {:+.2} -> {}\n",
                    a.model,
                    b.model,
                    cmp.quality_difference,
                    cmp.conservation_difference,
                    cmp.identity_difference,
                    cmp.similarity_difference,
                    cmp.better_model
                ));
            }
        }
    }
    write_output(output, &content)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let params = scoring_parameters(args.config.as_deref(), args.scoring.into())?;

    match args.command {
        Command::Validate { file } => {
            if !run_validate(&file)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Analyze {
            file,
            format,
            output,
            pairs,
        } => run_analyze(&file, format, &output, pairs, &params)?,
        Command::Compare {
            data,
            file,
            format,
            output,
        } => run_compare(&data, &file, format, &output, &params)?,
    }

    Ok(ExitCode::SUCCESS)
}
