//! Annex IV requirements and their competency questions.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::graph::SubjectIndex;
use crate::vocab::{self, aiact, dcterms, rdfs};

/// Requirement identifiers are `req` followed by ASCII digits. Anything else
/// typed as a requirement is a placeholder or malformed node.
static REQUIREMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^req([0-9]+)$").expect("valid requirement id pattern"));

/// Lifecycle stage shown when a requirement has none.
pub const UNSPECIFIED_STAGE: &str = "Not specified";

/// An EU AI Act Annex IV documentation requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    /// Fragment id, e.g. `req3`.
    pub id: String,
    /// Full subject IRI.
    pub uri: String,
    /// `rdfs:label`; the id when absent.
    pub label: String,
    /// `dcterms:description`; empty when absent.
    pub description: String,
    /// `aiact:aiLifecycleStage`; [`UNSPECIFIED_STAGE`] when absent.
    pub lifecycle_stage: String,
    /// `dcterms:source`; empty when absent.
    pub source: String,
    /// Competency question labels, in statement order.
    pub competency_questions: Vec<String>,
}

impl Requirement {
    /// Numeric part of the id.
    pub fn number(&self) -> Option<u32> {
        requirement_number(&self.id)
    }
}

/// Numeric part of a requirement id, if it matches the recognised pattern.
pub fn requirement_number(id: &str) -> Option<u32> {
    REQUIREMENT_ID
        .captures(id)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Map every labelled `aiact:CompetencyQuestion` to its label.
pub fn competency_questions(index: &SubjectIndex) -> HashMap<String, String> {
    index
        .subjects_of_type(aiact::COMPETENCY_QUESTION)
        .filter_map(|s| {
            index
                .value(s, rdfs::LABEL)
                .map(|label| (s.to_string(), label.to_string()))
        })
        .collect()
}

/// Extract every `aiact:Requirement` whose fragment matches `req<digits>`.
///
/// Competency question references are expanded to their labels here;
/// references to unlabelled or untyped questions are dropped.
pub fn extract_requirements(index: &SubjectIndex) -> Vec<Requirement> {
    let questions = competency_questions(index);
    let mut out = Vec::new();

    for s in index.subjects_of_type(aiact::REQUIREMENT) {
        let Some(id) = vocab::fragment(s).filter(|f| REQUIREMENT_ID.is_match(f)) else {
            tracing::debug!(subject = s, "skipping requirement with unrecognised id");
            continue;
        };

        let competency_questions = index
            .values(s, aiact::HAS_COMPETENCY_QUESTION)
            .into_iter()
            .filter_map(|cq| questions.get(cq).cloned())
            .collect();

        out.push(Requirement {
            id: id.to_string(),
            uri: s.to_string(),
            label: index.value(s, rdfs::LABEL).unwrap_or(id).to_string(),
            description: index
                .value(s, dcterms::DESCRIPTION)
                .unwrap_or_default()
                .to_string(),
            lifecycle_stage: index
                .value(s, aiact::AI_LIFECYCLE_STAGE)
                .unwrap_or(UNSPECIFIED_STAGE)
                .to_string(),
            source: index
                .value(s, dcterms::SOURCE)
                .unwrap_or_default()
                .to_string(),
            competency_questions,
        });
    }

    out
}

/// Sort requirements by their numeric id (`req2` before `req10`).
pub fn sort_requirements(requirements: &mut [Requirement]) {
    requirements.sort_by_key(|r| r.number().unwrap_or(u32::MAX));
}
