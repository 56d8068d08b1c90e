//! Entity reconstruction from the subject index.
//!
//! Each entity kind scans the index for subjects carrying its `rdf:type`, pulls
//! named predicates off the subject's statements, and applies defaults for
//! anything optional. Subjects missing a required piece are skipped (and logged
//! at debug level), never returned half-filled.
//!
//! Output order is first-encounter order in the index. Callers that want a
//! display order sort explicitly (see [`requirement::sort_requirements`]).

pub mod alignment;
pub mod coverage;
pub mod requirement;
pub mod run;

pub use alignment::{Alignment, extract_alignments};
pub use coverage::{CoverageMeasurement, extract_measurements};
pub use requirement::{Requirement, competency_questions, extract_requirements, sort_requirements};
pub use run::{Run, extract_runs};

/// Parse a numeric literal, tolerating surrounding whitespace.
///
/// `NaN` and the infinities are lexically valid `xsd:float` values but never
/// valid scores, so they count as unparsable.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
