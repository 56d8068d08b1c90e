//! Query engine: filter state in, borrowed entity view out.
//!
//! Filter states are plain immutable values. A view callback that changes one
//! selection builds a new state with a `with_*` method and re-runs the query;
//! nothing is kept between calls, and stored entities are never touched.

pub mod alignment;
pub mod coverage;
pub mod requirement;

use std::collections::BTreeSet;

pub use alignment::{AlignmentFilter, RelationKind, query_alignments};
pub use coverage::{
    CoverageBand, CoverageFilter, CoverageGrade, CoverageStats, RecencyPolicy, active_measurements,
    latest_per_requirement, query_coverage,
};
pub use requirement::{RequirementFilter, query_requirements};

use crate::entity::{Alignment, Requirement};

/// Case-insensitive substring search over a fixed set of fields.
///
/// The needle is matched against the fields joined by single spaces, so a
/// needle may span a field boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextQuery {
    needle: String,
}

impl TextQuery {
    /// Build a query; the needle is lower-cased once here.
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
        }
    }

    /// Whether the query is inactive.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// The lower-cased needle.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Whether the needle occurs in the joined haystack. An empty query matches.
    pub fn matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        let haystack = fields.into_iter().collect::<Vec<_>>().join(" ").to_lowercase();
        haystack.contains(&self.needle)
    }
}

/// Distinct non-empty target namespaces, sorted.
pub fn distinct_namespaces(alignments: &[Alignment]) -> Vec<String> {
    alignments
        .iter()
        .map(|a| a.target_namespace.as_str())
        .filter(|ns| !ns.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct relation short forms, sorted.
pub fn distinct_relations(alignments: &[Alignment]) -> Vec<String> {
    alignments
        .iter()
        .map(|a| crate::vocab::short_form(&a.relation))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct lifecycle stages, sorted.
pub fn distinct_stages(requirements: &[Requirement]) -> Vec<String> {
    requirements
        .iter()
        .map(|r| r.lifecycle_stage.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_query_is_case_insensitive_and_spans_fields() {
        let q = TextQuery::new("Risk MAN");
        assert!(q.matches(["Risk", "management system"]));
        assert!(!q.matches(["Risk", "", "management"]));
        assert!(TextQuery::new("").matches(std::iter::empty()));
    }

    #[test]
    fn needle_is_lowercased_once() {
        assert_eq!(TextQuery::new("ExactMatch").needle(), "exactmatch");
    }
}
