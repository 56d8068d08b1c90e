//! Ontology alignment mappings (`align:Mapping`).

use serde::{Deserialize, Serialize};

use crate::graph::SubjectIndex;
use crate::vocab::{self, align, prov};

use super::parse_number;

/// A mapping between an AIDOC term and a reference-ontology term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alignment {
    /// Mapping node identifier.
    pub id: String,
    /// AIDOC-side term.
    pub source: String,
    /// Relation IRI (SKOS mapping property or OWL equivalence).
    pub relation: String,
    /// Reference-ontology term. Empty when the mapping names none.
    pub target: String,
    /// Namespace of `target`, derived at construction.
    pub target_namespace: String,
    /// Confidence as reported by the generator. Not range-checked.
    pub confidence: Option<f64>,
    /// Free-text justification.
    pub rationale: Option<String>,
    /// `prov:wasAttributedTo`.
    pub agent: Option<String>,
    /// `prov:wasGeneratedBy`: the run that produced this mapping.
    pub generated_by: Option<String>,
}

/// Extract every well-formed `align:Mapping`.
///
/// `source` and `relation` are required; mappings lacking either are skipped.
pub fn extract_alignments(index: &SubjectIndex) -> Vec<Alignment> {
    let mut out = Vec::new();

    for s in index.subjects_of_type(align::MAPPING) {
        let (Some(source), Some(relation)) = (
            index.value(s, align::SOURCE),
            index.value(s, align::RELATION),
        ) else {
            tracing::debug!(subject = s, "skipping mapping without source or relation");
            continue;
        };

        let target = index.value(s, align::TARGET).unwrap_or_default();

        let confidence = match index.value(s, align::CONFIDENCE) {
            Some(raw) => {
                let parsed = parse_number(raw);
                if parsed.is_none() {
                    tracing::debug!(subject = s, raw, "unparsable mapping confidence");
                }
                parsed
            }
            None => None,
        };

        out.push(Alignment {
            id: s.to_string(),
            source: source.to_string(),
            relation: relation.to_string(),
            target: target.to_string(),
            target_namespace: vocab::namespace_of(target).to_string(),
            confidence,
            rationale: index.value(s, align::RATIONALE).map(str::to_string),
            agent: index.value(s, prov::WAS_ATTRIBUTED_TO).map(str::to_string),
            generated_by: index.value(s, prov::WAS_GENERATED_BY).map(str::to_string),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Statement, Term};
    use crate::vocab::RDF_TYPE;

    const SKOS_EXACT: &str = "http://www.w3.org/2004/02/skos/core#exactMatch";

    fn mapping(id: &str, with_source: bool, with_relation: bool) -> Vec<Statement> {
        let mut v = vec![Statement::link(id, RDF_TYPE, align::MAPPING)];
        if with_source {
            v.push(Statement::link(id, align::SOURCE, "https://w3id.org/aidoc-ap#Risk"));
        }
        if with_relation {
            v.push(Statement::link(id, align::RELATION, SKOS_EXACT));
        }
        v
    }

    #[test]
    fn required_predicates_gate_extraction() {
        let mut stmts = mapping("urn:m:ok", true, true);
        stmts.extend(mapping("urn:m:no-source", false, true));
        stmts.extend(mapping("urn:m:no-relation", true, false));
        let index = SubjectIndex::build(stmts);

        let maps = extract_alignments(&index);
        assert_eq!(maps.len(), 1);
        assert_eq!(maps[0].id, "urn:m:ok");
        assert_eq!(maps[0].target, "");
        assert_eq!(maps[0].target_namespace, "");
        assert_eq!(maps[0].confidence, None);
    }

    #[test]
    fn optional_fields_and_namespace() {
        let mut stmts = mapping("urn:m:1", true, true);
        stmts.push(Statement::link("urn:m:1", align::TARGET, "https://w3id.org/airo#Risk"));
        stmts.push(Statement::new(
            "urn:m:1",
            align::CONFIDENCE,
            Term::typed_literal("0.87", crate::vocab::xsd::FLOAT),
        ));
        stmts.push(Statement::new(
            "urn:m:1",
            align::RATIONALE,
            Term::literal("Both describe risk."),
        ));
        stmts.push(Statement::link("urn:m:1", prov::WAS_GENERATED_BY, "urn:run:a"));
        let index = SubjectIndex::build(stmts);

        let m = &extract_alignments(&index)[0];
        assert_eq!(m.target_namespace, "https://w3id.org/airo");
        assert_eq!(m.confidence, Some(0.87));
        assert_eq!(m.rationale.as_deref(), Some("Both describe risk."));
        assert_eq!(m.generated_by.as_deref(), Some("urn:run:a"));
        assert_eq!(m.agent, None);
    }

    #[test]
    fn out_of_range_confidence_passes_through() {
        let mut stmts = mapping("urn:m:1", true, true);
        stmts.push(Statement::new("urn:m:1", align::CONFIDENCE, Term::literal("1.5")));
        let index = SubjectIndex::build(stmts);
        assert_eq!(extract_alignments(&index)[0].confidence, Some(1.5));
    }

    #[test]
    fn non_finite_confidence_is_unparsable() {
        let mut stmts = mapping("urn:m:nan", true, true);
        stmts.push(Statement::new(
            "urn:m:nan",
            align::CONFIDENCE,
            Term::typed_literal("NaN", crate::vocab::xsd::FLOAT),
        ));
        stmts.extend(mapping("urn:m:inf", true, true));
        stmts.push(Statement::new(
            "urn:m:inf",
            align::CONFIDENCE,
            Term::typed_literal("INF", crate::vocab::xsd::FLOAT),
        ));
        let index = SubjectIndex::build(stmts);

        let maps = extract_alignments(&index);
        assert_eq!(maps.len(), 2);
        assert!(maps.iter().all(|m| m.confidence.is_none()));
    }

    #[test]
    fn extraction_keeps_first_encounter_order() {
        let mut stmts = mapping("urn:m:b", true, true);
        stmts.extend(mapping("urn:m:a", true, true));
        let index = SubjectIndex::build(stmts);
        let ids: Vec<_> = extract_alignments(&index).into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["urn:m:b", "urn:m:a"]);
    }
}
