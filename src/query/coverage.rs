//! Coverage filters and the latest-per-requirement reduction.
//!
//! Two modes:
//!
//! - no run selected: one row per requirement, taken from its latest run;
//! - a run selected: every measurement that run produced, unreduced.
//!
//! Band and text filters then apply to whichever set is active.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::CoverageMeasurement;
use crate::error::ConfigError;
use crate::resolve::RunDirectory;

use super::TextQuery;

/// Scores at or above this are "excellent".
pub const EXCELLENT_THRESHOLD: f64 = 0.9;
/// Scores at or above this are "good"; below it is the "needs work" bucket.
pub const GOOD_THRESHOLD: f64 = 0.85;
/// Lower bound of the medium grade.
pub const MEDIUM_THRESHOLD: f64 = 0.8;

/// Selector value that means "below good" rather than "at least 0.5".
const BELOW_GOOD_SELECTOR: &str = "0.5";

/// How "latest run" is decided when reducing to one measurement per requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecencyPolicy {
    /// Lexicographically greatest `generatedBy` identifier wins.
    #[default]
    RunIdentifier,
    /// Latest run start (else end) time wins; falls back to identifier
    /// comparison when either run lacks a parseable timestamp.
    RunTimestamp,
}

impl FromStr for RecencyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run-identifier" => Ok(Self::RunIdentifier),
            "run-timestamp" => Ok(Self::RunTimestamp),
            other => Err(ConfigError::InvalidRecency {
                value: other.to_string(),
            }),
        }
    }
}

/// Score threshold selection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum CoverageBand {
    /// No threshold.
    #[default]
    Any,
    /// `score >= t`.
    AtLeast(f64),
    /// `score < 0.85`.
    BelowGood,
}

impl CoverageBand {
    /// Interpret a selector value: `""` is any, `"0.5"` is below-good, any
    /// other number is a lower bound. Unparsable input selects nothing.
    pub fn from_selector(selector: &str) -> Self {
        let selector = selector.trim();
        if selector.is_empty() {
            return Self::Any;
        }
        if selector == BELOW_GOOD_SELECTOR {
            return Self::BelowGood;
        }
        match selector.parse::<f64>() {
            Ok(t) => Self::AtLeast(t),
            Err(_) => Self::Any,
        }
    }

    /// Whether a score falls inside the band.
    pub fn accepts(self, score: f64) -> bool {
        match self {
            Self::Any => true,
            Self::AtLeast(t) => score >= t,
            Self::BelowGood => score < GOOD_THRESHOLD,
        }
    }
}

/// Display grade of a coverage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageGrade {
    High,
    Medium,
    Low,
}

impl CoverageGrade {
    /// Grade a score.
    pub fn of(score: f64) -> Self {
        if score >= EXCELLENT_THRESHOLD {
            Self::High
        } else if score >= MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// CSS-style class name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Summary figures over the active measurement set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Number of measurements (requirements, in the default view).
    pub total: usize,
    /// Mean score; 0 when there are no measurements.
    pub average: f64,
    /// Scores `>= 0.90`.
    pub excellent: usize,
    /// Scores in `[0.85, 0.90)`.
    pub good: usize,
}

impl CoverageStats {
    /// Compute stats over a measurement view.
    pub fn from_measurements(measurements: &[&CoverageMeasurement]) -> Self {
        let total = measurements.len();
        let sum: f64 = measurements.iter().map(|m| m.score).sum();
        let average = if total == 0 { 0.0 } else { sum / total as f64 };
        let excellent = measurements
            .iter()
            .filter(|m| m.score >= EXCELLENT_THRESHOLD)
            .count();
        let good = measurements
            .iter()
            .filter(|m| m.score >= GOOD_THRESHOLD && m.score < EXCELLENT_THRESHOLD)
            .count();
        Self {
            total,
            average,
            excellent,
            good,
        }
    }

    /// Grade of the average score.
    pub fn grade(&self) -> CoverageGrade {
        CoverageGrade::of(self.average)
    }
}

/// Selections on the coverage view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageFilter {
    text: TextQuery,
    band: CoverageBand,
    run: Option<String>,
}

impl CoverageFilter {
    /// A filter that passes everything (default view).
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search over requirement, reasoning, matched and missing terms.
    pub fn with_text(self, text: &str) -> Self {
        Self {
            text: TextQuery::new(text),
            ..self
        }
    }

    /// Score band.
    pub fn with_band(self, band: CoverageBand) -> Self {
        Self { band, ..self }
    }

    /// Select one run (switches off the latest-per-requirement reduction).
    /// An empty string returns to the default view.
    pub fn with_run(self, run: &str) -> Self {
        Self {
            run: (!run.is_empty()).then(|| run.to_string()),
            ..self
        }
    }

    /// The selected run, if any.
    pub fn run(&self) -> Option<&str> {
        self.run.as_deref()
    }

    /// The selected band.
    pub fn band(&self) -> CoverageBand {
        self.band
    }

    /// Whether a measurement passes the band and text selections.
    pub fn accepts(&self, m: &CoverageMeasurement) -> bool {
        if !self.band.accepts(m.score) {
            return false;
        }
        let fields = [
            m.requirement_label.as_deref().unwrap_or_default(),
            m.requirement_id.as_deref().unwrap_or_default(),
            m.reasoning.as_str(),
        ];
        self.text.matches(
            fields
                .into_iter()
                .chain(m.matched_terms.iter().map(String::as_str))
                .chain(m.missing.iter().map(String::as_str)),
        )
    }
}

fn is_newer(
    candidate: &CoverageMeasurement,
    current: &CoverageMeasurement,
    policy: RecencyPolicy,
    runs: &RunDirectory,
) -> bool {
    let by_identifier = || candidate.generated_by.as_deref() > current.generated_by.as_deref();
    match policy {
        RecencyPolicy::RunIdentifier => by_identifier(),
        RecencyPolicy::RunTimestamp => {
            let ts = |m: &CoverageMeasurement| {
                m.generated_by
                    .as_deref()
                    .and_then(|id| runs.timestamp_for(id))
            };
            match (ts(candidate), ts(current)) {
                (Some(a), Some(b)) => a > b,
                _ => by_identifier(),
            }
        }
    }
}

/// One measurement per `requirement_id` (measurements without one form their
/// own group), chosen by `policy`. Ties keep the first encountered; groups come
/// out in first-encounter order.
pub fn latest_per_requirement<'a>(
    measurements: &'a [CoverageMeasurement],
    policy: RecencyPolicy,
    runs: &RunDirectory,
) -> Vec<&'a CoverageMeasurement> {
    let mut slot: HashMap<Option<&str>, usize> = HashMap::new();
    let mut latest: Vec<&CoverageMeasurement> = Vec::new();

    for m in measurements {
        let key = m.requirement_id.as_deref();
        match slot.get(&key) {
            Some(&i) => {
                if is_newer(m, latest[i], policy, runs) {
                    latest[i] = m;
                }
            }
            None => {
                slot.insert(key, latest.len());
                latest.push(m);
            }
        }
    }

    latest
}

/// The measurement set a view works from: one run's measurements when `run`
/// is given, otherwise the latest-per-requirement reduction.
pub fn active_measurements<'a>(
    measurements: &'a [CoverageMeasurement],
    run: Option<&str>,
    policy: RecencyPolicy,
    runs: &RunDirectory,
) -> Vec<&'a CoverageMeasurement> {
    match run {
        Some(run) => measurements
            .iter()
            .filter(|m| m.generated_by.as_deref() == Some(run))
            .collect(),
        None => latest_per_requirement(measurements, policy, runs),
    }
}

/// Active set, filtered by band and text, sorted by requirement number.
/// Measurements without a numeric requirement sort last.
pub fn query_coverage<'a>(
    measurements: &'a [CoverageMeasurement],
    filter: &CoverageFilter,
    policy: RecencyPolicy,
    runs: &RunDirectory,
) -> Vec<&'a CoverageMeasurement> {
    let mut rows: Vec<&CoverageMeasurement> =
        active_measurements(measurements, filter.run(), policy, runs)
            .into_iter()
            .filter(|m| filter.accepts(m))
            .collect();
    rows.sort_by_key(|m| m.requirement_number().unwrap_or(u32::MAX));
    rows
}
