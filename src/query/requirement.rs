//! Requirement filters.

use crate::entity::Requirement;

use super::TextQuery;

/// Selections on the requirements view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementFilter {
    text: TextQuery,
    stage: Option<String>,
}

impl RequirementFilter {
    /// A filter that passes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search over label, description, stage and competency questions.
    pub fn with_text(self, text: &str) -> Self {
        Self {
            text: TextQuery::new(text),
            ..self
        }
    }

    /// Exact lifecycle stage. An empty string clears the selection.
    pub fn with_stage(self, stage: &str) -> Self {
        Self {
            stage: (!stage.is_empty()).then(|| stage.to_string()),
            ..self
        }
    }

    /// The selected stage, if any.
    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn accepts(&self, r: &Requirement) -> bool {
        if self.stage.as_ref().is_some_and(|s| &r.lifecycle_stage != s) {
            return false;
        }
        let fields = [
            r.label.as_str(),
            r.description.as_str(),
            r.lifecycle_stage.as_str(),
        ];
        self.text.matches(
            fields
                .into_iter()
                .chain(r.competency_questions.iter().map(String::as_str)),
        )
    }
}

/// Requirements passing `filter`, in input order.
pub fn query_requirements<'a>(
    requirements: &'a [Requirement],
    filter: &RequirementFilter,
) -> Vec<&'a Requirement> {
    requirements.iter().filter(|r| filter.accepts(r)).collect()
}
