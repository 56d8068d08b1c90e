//! Cross-reference resolution between datasets.
//!
//! Foreign keys (a mapping's run, a measurement's requirement) are resolved by
//! identifier lookup. A key that points nowhere resolves to a fallback display
//! value; resolution itself never fails.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::entity::{CoverageMeasurement, Requirement, Run};
use crate::vocab;

/// Label prefix written by the coverage pipeline, stripped for display.
const COVERAGE_LABEL_PREFIX: &str = "LLM Coverage Analysis using ";

/// Parse an `xsd:dateTime` lexical form. Values without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as UTC `YYYY-MM-DD HH:MM:SS`; unparsable input is returned as-is.
pub fn display_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

impl Run {
    /// When the run happened: start time, else end time, else the id's
    /// trailing segment.
    pub fn when(&self) -> String {
        match self.started_at.as_deref().or(self.ended_at.as_deref()) {
            Some(t) => display_timestamp(t),
            None => vocab::trailing_segment(&self.id).to_string(),
        }
    }

    /// Tool the run used (trailing segment of `prov:used`), or `"run"`.
    pub fn tool(&self) -> &str {
        self.used
            .as_deref()
            .map(vocab::trailing_segment)
            .unwrap_or("run")
    }

    /// `"{tool} @ {when}"`, as shown next to alignment mappings.
    pub fn display_label(&self) -> String {
        format!("{} @ {}", self.tool(), self.when())
    }

    /// Label for the coverage run selector: `"{date} ({agent})"`.
    pub fn option_label(&self) -> String {
        let agent = match self.label.as_deref() {
            Some(label) => label
                .strip_prefix(COVERAGE_LABEL_PREFIX)
                .unwrap_or(label)
                .to_string(),
            None => vocab::trailing_segment(&self.id).to_string(),
        };
        let date = self
            .started_at
            .as_deref()
            .and_then(|t| t.split('T').next())
            .filter(|d| !d.is_empty());
        match date {
            Some(date) => format!("{date} ({agent})"),
            None => agent,
        }
    }

    /// Best timestamp for recency comparisons: start, else end.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.started_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| self.ended_at.as_deref().and_then(parse_timestamp))
    }
}

/// All known runs, addressable by id.
#[derive(Debug, Clone, Default)]
pub struct RunDirectory {
    runs: Vec<Run>,
    by_id: HashMap<String, usize>,
}

impl RunDirectory {
    /// Build a directory. On duplicate ids the first run wins.
    pub fn new(runs: Vec<Run>) -> Self {
        let mut by_id = HashMap::with_capacity(runs.len());
        for (i, run) in runs.iter().enumerate() {
            by_id.entry(run.id.clone()).or_insert(i);
        }
        Self { runs, by_id }
    }

    /// Look up a run.
    pub fn get(&self, id: &str) -> Option<&Run> {
        self.by_id.get(id).map(|&i| &self.runs[i])
    }

    /// Runs in load order.
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether there are no runs.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Display label for a run id, falling back to the id alone when unknown.
    pub fn label_for(&self, id: &str) -> String {
        match self.get(id) {
            Some(run) => run.display_label(),
            None => Run::new(id).display_label(),
        }
    }

    /// Selector label for a run id, falling back to the id alone when unknown.
    pub fn option_label_for(&self, id: &str) -> String {
        match self.get(id) {
            Some(run) => run.option_label(),
            None => Run::new(id).option_label(),
        }
    }

    /// Timestamp of a run, if the run is known and carries one.
    pub fn timestamp_for(&self, id: &str) -> Option<DateTime<Utc>> {
        self.get(id).and_then(Run::timestamp)
    }

    /// Runs ordered newest first by start time (or id when there is none).
    ///
    /// This compares the raw strings, which orders ISO timestamps correctly
    /// when they share a format.
    pub fn sorted_newest_first(&self) -> Vec<&Run> {
        let mut runs: Vec<&Run> = self.runs.iter().collect();
        runs.sort_by(|a, b| {
            let ka = a.started_at.as_deref().unwrap_or(&a.id);
            let kb = b.started_at.as_deref().unwrap_or(&b.id);
            kb.cmp(ka)
        });
        runs
    }
}

/// Requirement labels and descriptions, keyed by requirement id.
#[derive(Debug, Clone, Default)]
pub struct RequirementDirectory {
    entries: HashMap<String, (String, String)>,
}

impl RequirementDirectory {
    /// Build a directory from reconstructed requirements.
    pub fn new(requirements: &[Requirement]) -> Self {
        let entries = requirements
            .iter()
            .map(|r| (r.id.clone(), (r.label.clone(), r.description.clone())))
            .collect();
        Self { entries }
    }

    /// Label for a requirement id.
    pub fn label(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|(label, _)| label.as_str())
    }

    /// Description for a requirement id.
    pub fn description(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|(_, desc)| desc.as_str())
    }
}

/// Attach requirement labels and descriptions to copies of `measurements`.
///
/// Unknown requirement ids keep their raw id as the label and get no
/// description; measurements without a requirement id stay unlabelled.
pub fn resolve_requirements(
    measurements: &[CoverageMeasurement],
    requirements: &RequirementDirectory,
) -> Vec<CoverageMeasurement> {
    let mut unresolved = 0usize;
    let resolved = measurements
        .iter()
        .map(|m| {
            let mut out = m.clone();
            if let Some(id) = m.requirement_id.as_deref() {
                match requirements.label(id) {
                    Some(label) => {
                        out.requirement_label = Some(label.to_string());
                        out.requirement_description =
                            requirements.description(id).map(str::to_string);
                    }
                    None => {
                        unresolved += 1;
                        out.requirement_label = Some(id.to_string());
                        out.requirement_description = None;
                    }
                }
            }
            out
        })
        .collect();

    if unresolved > 0 {
        tracing::debug!(unresolved, "measurements reference unknown requirements");
    }
    resolved
}
