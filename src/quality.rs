//! Composite quality score and labels.
//!
//! The composite score is a weighted sum clamped to `[0, 100]`:
//!
//! ```text
//! conservation * 0.30 + identity * 0.25 + similarity * 0.25 + max(0, 20 - gap%)
//! ```
//!
//! The percentages can come from aggregate alignment statistics or from a
//! single pair; the caller picks through the [`QualityInputs`] constructors.

use std::fmt;

use serde::Serialize;

use crate::msa::AlignmentStatistics;
use crate::scoring::PairwiseScore;

const CONSERVATION_WEIGHT: f64 = 0.30;
const IDENTITY_WEIGHT: f64 = 0.25;
const SIMILARITY_WEIGHT: f64 = 0.25;
const GAP_ALLOWANCE: f64 = 20.0;

/// Percentages fed into [`rate`]. A missing term contributes zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QualityInputs {
    pub conservation_percent: Option<f64>,
    pub identity_percent: Option<f64>,
    pub similarity_percent: Option<f64>,
    pub gap_percent: Option<f64>,
}

impl QualityInputs {
    /// Aggregate inputs: conservation plus the mean pairwise identity,
    /// similarity and gap percentage of the whole alignment.
    pub fn from_statistics(stats: &AlignmentStatistics) -> Self {
        Self {
            conservation_percent: Some(stats.conservation_percent),
            identity_percent: Some(stats.average_identity_percent),
            similarity_percent: Some(stats.average_similarity_percent),
            gap_percent: Some(stats.gap_percent),
        }
    }

    /// Single-pair inputs. A pair has no conservation term.
    pub fn from_pair(pair: &PairwiseScore) -> Self {
        Self {
            conservation_percent: None,
            identity_percent: Some(pair.identity_percent),
            similarity_percent: Some(pair.similarity_percent),
            gap_percent: Some(pair.gap_percent()),
        }
    }
}

fn term(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Computes the composite quality score in `[0, 100]`.
pub fn rate(inputs: &QualityInputs) -> f64 {
    let mut score = term(inputs.conservation_percent) * CONSERVATION_WEIGHT
        + term(inputs.identity_percent) * IDENTITY_WEIGHT
        + term(inputs.similarity_percent) * SIMILARITY_WEIGHT;

    // The gap bonus only applies when a gap percentage is known
    if let Some(gap) = inputs.gap_percent.filter(|v| v.is_finite()) {
        score += (GAP_ALLOWANCE - gap).max(0.0);
    }

    score.clamp(0.0, 100.0)
}

/// Discrete quality label for an identity-like percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLabel {
    /// `>= 80` Excellent, `>= 60` Good, `>= 40` Fair, otherwise Poor.
    pub fn from_percent(percent: f64) -> Self {
        if percent >= 80.0 {
            QualityLabel::Excellent
        } else if percent >= 60.0 {
            QualityLabel::Good
        } else if percent >= 40.0 {
            QualityLabel::Fair
        } else {
            QualityLabel::Poor
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            QualityLabel::Excellent => Severity::Success,
            QualityLabel::Good => Severity::Warning,
            QualityLabel::Fair => Severity::Caution,
            QualityLabel::Poor => Severity::Danger,
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityLabel::Excellent => write!(f, "Excellent"),
            QualityLabel::Good => write!(f, "Good"),
            QualityLabel::Fair => write!(f, "Fair"),
            QualityLabel::Poor => write!(f, "Poor"),
        }
    }
}

/// Presentation tier matching the label thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Success,
    Warning,
    Caution,
    Danger,
}

impl Severity {
    pub fn from_percent(percent: f64) -> Self {
        QualityLabel::from_percent(percent).severity()
    }

    /// Hex colour conventionally used for this tier.
    pub fn color(self) -> &'static str {
        match self {
            Severity::Success => "#28a745",
            Severity::Warning => "#ffc107",
            Severity::Caution => "#fd7e14",
            Severity::Danger => "#dc3545",
        }
    }
}
