//! Vocabulary IRIs and IRI string helpers.
//!
//! Every predicate and class the reconstructors look for is named here, so the
//! set of recognised vocabularies is explicit in one place.

/// `rdf:type`.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub mod rdfs {
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
}

pub mod xsd {
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

pub mod skos {
    pub const NS: &str = "http://www.w3.org/2004/02/skos/core#";
}

pub mod owl {
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";
}

pub mod dcterms {
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const SOURCE: &str = "http://purl.org/dc/terms/source";
}

/// PROV-O terms used for runs and attribution.
pub mod prov {
    pub const ACTIVITY: &str = "http://www.w3.org/ns/prov#Activity";
    pub const STARTED_AT_TIME: &str = "http://www.w3.org/ns/prov#startedAtTime";
    pub const ENDED_AT_TIME: &str = "http://www.w3.org/ns/prov#endedAtTime";
    pub const USED: &str = "http://www.w3.org/ns/prov#used";
    pub const WAS_GENERATED_BY: &str = "http://www.w3.org/ns/prov#wasGeneratedBy";
    pub const WAS_ATTRIBUTED_TO: &str = "http://www.w3.org/ns/prov#wasAttributedTo";
}

/// AIDOC alignment vocabulary.
pub mod align {
    pub const MAPPING: &str = "https://w3id.org/aidoc-ap/alignment#Mapping";
    pub const SOURCE: &str = "https://w3id.org/aidoc-ap/alignment#source";
    pub const TARGET: &str = "https://w3id.org/aidoc-ap/alignment#target";
    pub const RELATION: &str = "https://w3id.org/aidoc-ap/alignment#relation";
    pub const CONFIDENCE: &str = "https://w3id.org/aidoc-ap/alignment#confidence";
    pub const RATIONALE: &str = "https://w3id.org/aidoc-ap/alignment#rationale";
}

/// Data Quality Vocabulary.
pub mod dqv {
    pub const QUALITY_MEASUREMENT: &str = "http://www.w3.org/ns/dqv#QualityMeasurement";
    pub const VALUE: &str = "http://www.w3.org/ns/dqv#value";
}

/// AIDOC coverage vocabulary.
pub mod cov {
    pub const FOR_REQUIREMENT: &str = "https://w3id.org/aidoc-ap/coverage#forRequirement";
    pub const REASONING: &str = "https://w3id.org/aidoc-ap/coverage#reasoning";
    pub const MATCHED_TERM: &str = "https://w3id.org/aidoc-ap/coverage#matchedTerm";
    pub const MISSING_LABEL: &str = "https://w3id.org/aidoc-ap/coverage#missingLabel";
}

/// Annex IV requirement vocabulary.
pub mod aiact {
    pub const NS: &str = "https://w3id.org/aidoc-ap/requirements#";
    pub const REQUIREMENT: &str = "https://w3id.org/aidoc-ap/requirements#Requirement";
    pub const COMPETENCY_QUESTION: &str =
        "https://w3id.org/aidoc-ap/requirements#CompetencyQuestion";
    pub const HAS_COMPETENCY_QUESTION: &str =
        "https://w3id.org/aidoc-ap/requirements#hasCompetencyQuestion";
    pub const AI_LIFECYCLE_STAGE: &str =
        "https://w3id.org/aidoc-ap/requirements#aiLifecycleStage";
}

/// Full-IRI prefix to short prefix, applied to relation IRIs for display and
/// for the relation filter.
pub const SHORT_FORMS: &[(&str, &str)] = &[(skos::NS, "skos:"), (owl::NS, "owl:")];

/// Rewrite a full IRI into its short form using [`SHORT_FORMS`].
///
/// IRIs outside the known vocabularies are returned unchanged.
pub fn short_form(iri: &str) -> String {
    for (prefix, short) in SHORT_FORMS {
        if let Some(local) = iri.strip_prefix(prefix) {
            return format!("{short}{local}");
        }
    }
    iri.to_string()
}

/// The part after the first `#`, if any.
pub fn fragment(iri: &str) -> Option<&str> {
    iri.split_once('#').map(|(_, frag)| frag)
}

/// The part after the last `/`, or the whole string when there is none.
pub fn trailing_segment(iri: &str) -> &str {
    iri.rsplit('/').next().unwrap_or(iri)
}

/// Local name of a term: its fragment when present, else its trailing segment.
pub fn local_name(iri: &str) -> &str {
    match fragment(iri) {
        Some(frag) if !frag.is_empty() => frag,
        _ => trailing_segment(iri),
    }
}

/// Namespace of a target IRI: everything before `#`, or before the last `/`
/// when there is no fragment. Empty when neither separator is present.
pub fn namespace_of(iri: &str) -> &str {
    if let Some((ns, _)) = iri.split_once('#') {
        return ns;
    }
    match iri.rfind('/') {
        Some(pos) => &iri[..pos],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_rewrites_known_prefixes() {
        assert_eq!(
            short_form("http://www.w3.org/2004/02/skos/core#exactMatch"),
            "skos:exactMatch"
        );
        assert_eq!(
            short_form("http://www.w3.org/2002/07/owl#equivalentClass"),
            "owl:equivalentClass"
        );
        assert_eq!(
            short_form("https://example.org/rel#near"),
            "https://example.org/rel#near"
        );
    }

    #[test]
    fn namespace_prefers_fragment_separator() {
        assert_eq!(
            namespace_of("http://purl.org/dpv#Risk"),
            "http://purl.org/dpv"
        );
        assert_eq!(
            namespace_of("https://w3id.org/airo/AISystem"),
            "https://w3id.org/airo"
        );
        assert_eq!(namespace_of("urn-without-separators"), "");
    }

    #[test]
    fn local_names() {
        assert_eq!(local_name("https://w3id.org/aidoc-ap#Dataset"), "Dataset");
        assert_eq!(local_name("https://example.org/run/42"), "42");
        assert_eq!(local_name("plain"), "plain");
        assert_eq!(fragment("https://x.org/a"), None);
        assert_eq!(trailing_segment("https://x.org/a/b"), "b");
    }
}
