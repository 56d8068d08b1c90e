//! Statements and the subject index.
//!
//! Every load path ends in a flat `Vec<Statement>`. The [`SubjectIndex`] groups
//! that vector by subject once; everything downstream reads from the index.

pub mod index;

use serde::{Deserialize, Serialize};

pub use index::SubjectIndex;

/// Object position of a statement: a node reference or a literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// An IRI, or a blank node written as `_:label`.
    Node(String),
    /// A literal with its lexical value and optional datatype IRI.
    Literal {
        value: String,
        datatype: Option<String>,
    },
}

impl Term {
    /// Create a node term.
    pub fn node(id: impl Into<String>) -> Self {
        Self::Node(id.into())
    }

    /// Create an untyped literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
        }
    }

    /// Create a literal with a datatype IRI.
    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: Some(datatype.into()),
        }
    }

    /// The node identifier or the literal's lexical value.
    pub fn value(&self) -> &str {
        match self {
            Self::Node(id) => id,
            Self::Literal { value, .. } => value,
        }
    }

    /// Whether this term references a node.
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }
}

/// A single (subject, predicate, object) statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    /// Subject identifier (IRI or `_:` blank node).
    pub subject: String,
    /// Predicate IRI.
    pub predicate: String,
    /// Object term.
    pub object: Term,
}

impl Statement {
    /// Create a new statement.
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }

    /// Shorthand for a statement whose object is a node.
    pub fn link(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self::new(subject, predicate, Term::node(object))
    }
}
