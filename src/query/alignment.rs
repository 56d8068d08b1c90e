//! Alignment filters.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Alignment;
use crate::vocab;

use super::TextQuery;

/// Display category of a mapping relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Equivalent,
    Exact,
    Close,
    Broad,
    Narrow,
    Related,
}

impl RelationKind {
    /// Categorise a relation IRI by its local name. `None` for an empty relation.
    pub fn from_iri(iri: &str) -> Option<Self> {
        if iri.is_empty() {
            return None;
        }
        let kind = if iri.ends_with("equivalentClass") {
            Self::Equivalent
        } else if iri.ends_with("exactMatch") {
            Self::Exact
        } else if iri.ends_with("closeMatch") {
            Self::Close
        } else if iri.ends_with("broadMatch") {
            Self::Broad
        } else if iri.ends_with("narrowMatch") {
            Self::Narrow
        } else {
            Self::Related
        };
        Some(kind)
    }

    /// Category name used by the view's relation pills.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Equivalent => "equivalent",
            Self::Exact => "exact",
            Self::Close => "close",
            Self::Broad => "broad",
            Self::Narrow => "narrow",
            Self::Related => "related",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Alignment {
    /// Relation in short form, e.g. `skos:exactMatch`.
    pub fn relation_short(&self) -> String {
        vocab::short_form(&self.relation)
    }

    /// Relation display category.
    pub fn relation_kind(&self) -> Option<RelationKind> {
        RelationKind::from_iri(&self.relation)
    }

    /// Local name of the AIDOC source term.
    pub fn source_name(&self) -> &str {
        vocab::local_name(&self.source)
    }
}

/// Selections on the alignment view. All active selections must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentFilter {
    text: TextQuery,
    namespace: Option<String>,
    relation: Option<String>,
    run: Option<String>,
    min_confidence: f64,
}

impl AlignmentFilter {
    /// A filter that passes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Free-text search over source, target, relation and rationale.
    pub fn with_text(self, text: &str) -> Self {
        Self {
            text: TextQuery::new(text),
            ..self
        }
    }

    /// Exact target namespace. An empty string clears the selection.
    pub fn with_namespace(self, namespace: &str) -> Self {
        Self {
            namespace: non_empty(namespace),
            ..self
        }
    }

    /// Relation short form, e.g. `skos:closeMatch`. An empty string clears it.
    pub fn with_relation(self, relation: &str) -> Self {
        Self {
            relation: non_empty(relation),
            ..self
        }
    }

    /// Exact run identifier. An empty string clears it.
    pub fn with_run(self, run: &str) -> Self {
        Self {
            run: non_empty(run),
            ..self
        }
    }

    /// Minimum confidence; 0 disables the threshold.
    pub fn with_min_confidence(self, min_confidence: f64) -> Self {
        Self {
            min_confidence,
            ..self
        }
    }

    /// The selected run, if any.
    pub fn run(&self) -> Option<&str> {
        self.run.as_deref()
    }

    /// The selected namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether a mapping passes every active selection.
    pub fn accepts(&self, m: &Alignment) -> bool {
        if self
            .namespace
            .as_ref()
            .is_some_and(|ns| &m.target_namespace != ns)
        {
            return false;
        }
        if self
            .relation
            .as_ref()
            .is_some_and(|rel| &m.relation_short() != rel)
        {
            return false;
        }
        if self
            .run
            .as_ref()
            .is_some_and(|run| m.generated_by.as_ref() != Some(run))
        {
            return false;
        }
        if self.min_confidence > 0.0 && m.confidence.unwrap_or(0.0) < self.min_confidence {
            return false;
        }
        self.text.matches([
            m.source.as_str(),
            m.target.as_str(),
            m.relation.as_str(),
            m.rationale.as_deref().unwrap_or_default(),
        ])
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// Mappings passing `filter`, in input order.
pub fn query_alignments<'a>(
    alignments: &'a [Alignment],
    filter: &AlignmentFilter,
) -> Vec<&'a Alignment> {
    alignments.iter().filter(|m| filter.accepts(m)).collect()
}
