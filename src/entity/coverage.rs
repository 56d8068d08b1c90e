//! Coverage measurements (`dqv:QualityMeasurement`): how well the ontology
//! covers one Annex IV requirement according to one run.

use serde::{Deserialize, Serialize};

use crate::graph::{SubjectIndex, Term};
use crate::vocab::{self, cov, dqv, prov};

use super::parse_number;

/// One coverage score for one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageMeasurement {
    /// Measurement node identifier.
    pub id: String,
    /// Fragment of the `cov:forRequirement` reference, e.g. `req7`.
    pub requirement_id: Option<String>,
    /// Requirement label, filled in by [`crate::resolve::resolve_requirements`].
    pub requirement_label: Option<String>,
    /// Requirement description, filled in alongside the label.
    pub requirement_description: Option<String>,
    /// `dqv:value`; 0 when absent or unparsable.
    pub score: f64,
    /// Local names of matched ontology terms, in statement order.
    pub matched_terms: Vec<String>,
    /// Concepts reported missing, in statement order.
    pub missing: Vec<String>,
    /// Model reasoning; empty when absent.
    pub reasoning: String,
    /// `prov:wasGeneratedBy`.
    pub generated_by: Option<String>,
    /// `prov:wasAttributedTo`.
    pub agent: Option<String>,
}

impl CoverageMeasurement {
    /// Numeric part of the requirement id (`req12` → 12).
    pub fn requirement_number(&self) -> Option<u32> {
        self.requirement_id
            .as_deref()
            .and_then(super::requirement::requirement_number)
    }

    /// Label to show for the requirement: resolved label, else the raw id.
    pub fn display_requirement(&self) -> &str {
        self.requirement_label
            .as_deref()
            .or(self.requirement_id.as_deref())
            .unwrap_or_default()
    }
}

/// Extract every `dqv:QualityMeasurement`.
///
/// Measurements have no required predicates: every typed subject is returned.
pub fn extract_measurements(index: &SubjectIndex) -> Vec<CoverageMeasurement> {
    index
        .subjects_of_type(dqv::QUALITY_MEASUREMENT)
        .map(|s| {
            let requirement_id = index
                .value(s, cov::FOR_REQUIREMENT)
                .and_then(vocab::fragment)
                .map(str::to_string);

            let score = index
                .value(s, dqv::VALUE)
                .and_then(parse_number)
                .unwrap_or(0.0);

            let matched_terms = index
                .all(s, cov::MATCHED_TERM)
                .into_iter()
                .map(|st| match &st.object {
                    Term::Node(id) => vocab::local_name(id).to_string(),
                    Term::Literal { value, .. } => value.clone(),
                })
                .collect();

            let missing = index
                .values(s, cov::MISSING_LABEL)
                .into_iter()
                .map(str::to_string)
                .collect();

            CoverageMeasurement {
                id: s.to_string(),
                requirement_id,
                requirement_label: None,
                requirement_description: None,
                score,
                matched_terms,
                missing,
                reasoning: index
                    .value(s, cov::REASONING)
                    .unwrap_or_default()
                    .to_string(),
                generated_by: index.value(s, prov::WAS_GENERATED_BY).map(str::to_string),
                agent: index.value(s, prov::WAS_ATTRIBUTED_TO).map(str::to_string),
            }
        })
        .collect()
}
