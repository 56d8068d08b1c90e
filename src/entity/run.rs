//! Provenance activities (runs of the alignment and coverage pipelines).

use serde::{Deserialize, Serialize};

use crate::graph::SubjectIndex;
use crate::vocab::{prov, rdfs};

/// A recorded execution of a generation process (`prov:Activity`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Activity identifier.
    pub id: String,
    /// `prov:startedAtTime`, as written in the source.
    pub started_at: Option<String>,
    /// `prov:endedAtTime`, as written in the source.
    pub ended_at: Option<String>,
    /// `prov:used`: the tool or model the run used.
    pub used: Option<String>,
    /// `rdfs:label`.
    pub label: Option<String>,
}

impl Run {
    /// Create a run with only an identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            started_at: None,
            ended_at: None,
            used: None,
            label: None,
        }
    }
}

/// Extract every `prov:Activity` subject as a [`Run`].
pub fn extract_runs(index: &SubjectIndex) -> Vec<Run> {
    index
        .subjects_of_type(prov::ACTIVITY)
        .map(|s| Run {
            id: s.to_string(),
            started_at: index.value(s, prov::STARTED_AT_TIME).map(str::to_string),
            ended_at: index.value(s, prov::ENDED_AT_TIME).map(str::to_string),
            used: index.value(s, prov::USED).map(str::to_string),
            label: index.value(s, rdfs::LABEL).map(str::to_string),
        })
        .collect()
}
