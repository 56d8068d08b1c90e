// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # aidoc-views
//!
//! Read-only data access for the AIDOC ontology documentation views:
//! ontology alignments, requirement coverage measurements, and the EU AI Act
//! Annex IV requirements.
//!
//! ## Architecture
//!
//! - **Sources** (`source`): triple documents (oxigraph parser) or precomputed
//!   JSON tables, probed in preference order
//! - **Subject index** (`graph`): arena of statements grouped by subject
//! - **Entities** (`entity`): typed records rebuilt from the index
//! - **Resolution** (`resolve`): run and requirement lookups with fallbacks
//! - **Queries** (`query`): immutable filter values in, borrowed views out
//! - **Catalog** (`catalog`): concurrent load of all three datasets
//!
//! ## Library usage
//!
//! ```no_run
//! use aidoc_views::catalog::Catalog;
//! use aidoc_views::config::CatalogConfig;
//! use aidoc_views::query::{CoverageBand, CoverageFilter};
//!
//! let config = CatalogConfig::with_base("docs").apply_env_overrides();
//! let catalog = Catalog::load(&config);
//!
//! let filter = CoverageFilter::new().with_band(CoverageBand::BelowGood);
//! for m in catalog.coverage().query(&filter) {
//!     println!("{} {:.2}", m.display_requirement(), m.score);
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod entity;
pub mod error;
pub mod graph;
pub mod query;
pub mod resolve;
pub mod source;
pub mod vocab;
