//! Read-only subject index over a statement arena.
//!
//! Statements live in one `Vec`; a hash map from subject to arena positions
//! gives O(1) access to "all statements about X". Insertion order is kept both
//! within a subject and across subjects (first encounter).

use std::collections::HashMap;

use crate::vocab::RDF_TYPE;

use super::Statement;

/// Statements grouped by subject.
#[derive(Clone, Default)]
pub struct SubjectIndex {
    /// Arena of all statements in load order.
    statements: Vec<Statement>,
    /// Subject → positions in `statements`, ascending.
    by_subject: HashMap<String, Vec<usize>>,
    /// Subjects in first-encounter order.
    subjects: Vec<String>,
}

impl SubjectIndex {
    /// Build the index from a batch of statements.
    pub fn build(statements: Vec<Statement>) -> Self {
        let mut by_subject: HashMap<String, Vec<usize>> = HashMap::new();
        let mut subjects = Vec::new();

        for (pos, stmt) in statements.iter().enumerate() {
            match by_subject.get_mut(&stmt.subject) {
                Some(positions) => positions.push(pos),
                None => {
                    subjects.push(stmt.subject.clone());
                    by_subject.insert(stmt.subject.clone(), vec![pos]);
                }
            }
        }

        Self {
            statements,
            by_subject,
            subjects,
        }
    }

    fn positions(&self, subject: &str) -> &[usize] {
        self.by_subject
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All statements about `subject`, in load order. Empty if unknown.
    pub fn get(&self, subject: &str) -> Vec<&Statement> {
        self.positions(subject)
            .iter()
            .map(|&pos| &self.statements[pos])
            .collect()
    }

    /// The first statement about `subject` with the given predicate.
    pub fn first(&self, subject: &str, predicate: &str) -> Option<&Statement> {
        self.positions(subject)
            .iter()
            .map(|&pos| &self.statements[pos])
            .find(|s| s.predicate == predicate)
    }

    /// Every statement about `subject` with the given predicate, in load order.
    pub fn all(&self, subject: &str, predicate: &str) -> Vec<&Statement> {
        self.positions(subject)
            .iter()
            .map(|&pos| &self.statements[pos])
            .filter(|s| s.predicate == predicate)
            .collect()
    }

    /// Value of the first object for `(subject, predicate)`.
    pub fn value(&self, subject: &str, predicate: &str) -> Option<&str> {
        self.first(subject, predicate).map(|s| s.object.value())
    }

    /// Values of every object for `(subject, predicate)`, in load order.
    pub fn values(&self, subject: &str, predicate: &str) -> Vec<&str> {
        self.all(subject, predicate)
            .into_iter()
            .map(|s| s.object.value())
            .collect()
    }

    /// Whether `subject` carries an `rdf:type type_iri` statement.
    pub fn has_type(&self, subject: &str, type_iri: &str) -> bool {
        self.positions(subject).iter().any(|&pos| {
            let s = &self.statements[pos];
            s.predicate == RDF_TYPE && s.object.is_node() && s.object.value() == type_iri
        })
    }

    /// Subjects in first-encounter order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(String::as_str)
    }

    /// Subjects typed `type_iri`, in first-encounter order.
    pub fn subjects_of_type<'a>(&'a self, type_iri: &'a str) -> impl Iterator<Item = &'a str> {
        self.subjects().filter(move |s| self.has_type(s, type_iri))
    }

    /// All statements in load order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the index holds no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Number of distinct subjects.
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }
}

impl std::fmt::Debug for SubjectIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubjectIndex")
            .field("subjects", &self.subject_count())
            .field("statements", &self.len())
            .finish()
    }
}
