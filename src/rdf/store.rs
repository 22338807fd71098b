//! RDF triple store implementation
//!
//! This module provides the [`TripleStore`] interface the mapping engine talks
//! to, and [`RdfStore`], an in-memory implementation with subject, predicate
//! and object indices. Triples are kept in insertion order so that lookups
//! return statements in the order they were written.

use super::types::{
    BlankNode, Literal, NamedNode, QueryPattern, RdfError, RdfObject, RdfPredicate, RdfSubject,
    RdfTerm, Triple,
};
use indexmap::IndexSet;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// RDF store errors
#[derive(Error, Debug)]
pub enum RdfStoreError {
    /// Triple not found
    #[error("Triple not found")]
    TripleNotFound,

    /// Duplicate triple
    #[error("Duplicate triple")]
    DuplicateTriple,

    /// Node cannot appear in subject position
    #[error("Invalid subject node: {0}")]
    InvalidSubject(String),

    /// Node cannot appear in predicate position
    #[error("Invalid predicate node: {0}")]
    InvalidPredicate(String),

    /// Node construction failed
    #[error(transparent)]
    Rdf(#[from] RdfError),
}

pub type RdfStoreResult<T> = Result<T, RdfStoreError>;

/// Statement storage consumed by the mapping engine.
///
/// Lookups take a [`QueryPattern`] whose `None` positions are wildcards.
/// Node constructors live here too so that a store backed by an external
/// database can hand out its own node handles.
pub trait TripleStore {
    /// Assert a statement. Positions are checked against RDF rules.
    fn add_statement(&mut self, subject: RdfTerm, predicate: RdfTerm, object: RdfTerm) -> RdfStoreResult<()>;

    /// First statement matching the pattern, if any
    fn find_statement(&self, pattern: &QueryPattern) -> Option<Triple>;

    /// Every statement matching the pattern
    fn find_statements(&self, pattern: &QueryPattern) -> Vec<Triple>;

    /// Fresh blank node
    fn make_blank_node(&self) -> RdfTerm {
        RdfTerm::BlankNode(BlankNode::new())
    }

    /// Named node for a full IRI
    fn make_named_node(&self, uri: &str) -> RdfStoreResult<RdfTerm> {
        Ok(RdfTerm::NamedNode(NamedNode::new(uri)?))
    }

    /// Literal node
    fn make_literal_node(&self, literal: Literal) -> RdfTerm {
        RdfTerm::Literal(literal)
    }
}

/// Iterator over triples
pub struct TripleIterator<'a> {
    triples: Vec<&'a Triple>,
    current: usize,
}

impl<'a> TripleIterator<'a> {
    fn new(triples: Vec<&'a Triple>) -> Self {
        Self { triples, current: 0 }
    }
}

impl<'a> Iterator for TripleIterator<'a> {
    type Item = &'a Triple;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.triples.len() {
            let triple = self.triples[self.current];
            self.current += 1;
            Some(triple)
        } else {
            None
        }
    }
}

/// RDF triple store with per-position indices
///
/// Each index maps a node to the triples holding it in that position, in
/// insertion order. A lookup scans the smallest bucket among the fixed
/// positions of the pattern.
#[derive(Clone, Default)]
pub struct RdfStore {
    /// All triples (primary storage, insertion ordered)
    triples: IndexSet<Triple>,

    /// Subject -> triples
    subject_index: HashMap<RdfSubject, Vec<Triple>>,

    /// Predicate -> triples
    predicate_index: HashMap<RdfPredicate, Vec<Triple>>,

    /// Object -> triples
    object_index: HashMap<RdfObject, Vec<Triple>>,
}

impl RdfStore {
    /// Create a new empty RDF store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a triple into the store
    pub fn insert(&mut self, triple: Triple) -> RdfStoreResult<()> {
        if self.triples.contains(&triple) {
            return Err(RdfStoreError::DuplicateTriple);
        }

        self.update_indices_insert(&triple);
        self.triples.insert(triple);

        Ok(())
    }

    /// Remove a triple from the store
    pub fn remove(&mut self, triple: &Triple) -> RdfStoreResult<()> {
        if !self.triples.shift_remove(triple) {
            return Err(RdfStoreError::TripleNotFound);
        }

        self.update_indices_remove(triple);

        Ok(())
    }

    /// Check if a triple exists in the store
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Get the total number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Clear all triples
    pub fn clear(&mut self) {
        self.triples.clear();
        self.subject_index.clear();
        self.predicate_index.clear();
        self.object_index.clear();
    }

    /// Query triples matching a pattern
    pub fn query(&self, pattern: &QueryPattern) -> Vec<Triple> {
        self.candidates(pattern)
            .filter(|triple| pattern.matches(triple))
            .cloned()
            .collect()
    }

    /// Get triples with a specific subject
    pub fn get_triples_with_subject(&self, subject: &RdfSubject) -> Vec<Triple> {
        self.subject_index.get(subject).cloned().unwrap_or_default()
    }

    /// Get an iterator over all triples, in insertion order
    pub fn iter(&self) -> TripleIterator<'_> {
        TripleIterator::new(self.triples.iter().collect())
    }

    /// Get all subjects in the store
    pub fn subjects(&self) -> Vec<RdfSubject> {
        self.triples
            .iter()
            .map(|t| t.subject.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    // Private helper methods

    fn candidates<'a>(&'a self, pattern: &QueryPattern) -> Box<dyn Iterator<Item = &'a Triple> + 'a> {
        let mut best: Option<&'a Vec<Triple>> = None;

        if let Some(s) = &pattern.subject {
            match self.subject_index.get(s) {
                Some(bucket) => best = Some(bucket),
                None => return Box::new(std::iter::empty()),
            }
        }
        if let Some(o) = &pattern.object {
            match self.object_index.get(o) {
                Some(bucket) if best.map_or(true, |b| bucket.len() < b.len()) => best = Some(bucket),
                Some(_) => {}
                None => return Box::new(std::iter::empty()),
            }
        }
        if let Some(p) = &pattern.predicate {
            match self.predicate_index.get(p) {
                Some(bucket) if best.map_or(true, |b| bucket.len() < b.len()) => best = Some(bucket),
                Some(_) => {}
                None => return Box::new(std::iter::empty()),
            }
        }

        match best {
            Some(bucket) => Box::new(bucket.iter()),
            None => Box::new(self.triples.iter()),
        }
    }

    fn update_indices_insert(&mut self, triple: &Triple) {
        self.subject_index
            .entry(triple.subject.clone())
            .or_default()
            .push(triple.clone());

        self.predicate_index
            .entry(triple.predicate.clone())
            .or_default()
            .push(triple.clone());

        self.object_index
            .entry(triple.object.clone())
            .or_default()
            .push(triple.clone());
    }

    fn update_indices_remove(&mut self, triple: &Triple) {
        if let Some(bucket) = self.subject_index.get_mut(&triple.subject) {
            bucket.retain(|t| t != triple);
            if bucket.is_empty() {
                self.subject_index.remove(&triple.subject);
            }
        }

        if let Some(bucket) = self.predicate_index.get_mut(&triple.predicate) {
            bucket.retain(|t| t != triple);
            if bucket.is_empty() {
                self.predicate_index.remove(&triple.predicate);
            }
        }

        if let Some(bucket) = self.object_index.get_mut(&triple.object) {
            bucket.retain(|t| t != triple);
            if bucket.is_empty() {
                self.object_index.remove(&triple.object);
            }
        }
    }
}

impl TripleStore for RdfStore {
    /// Re-asserting an existing statement is a no-op (graphs are sets).
    fn add_statement(&mut self, subject: RdfTerm, predicate: RdfTerm, object: RdfTerm) -> RdfStoreResult<()> {
        let subject = RdfSubject::try_from(subject)
            .map_err(|t| RdfStoreError::InvalidSubject(t.to_string()))?;
        let predicate = RdfPredicate::try_from(predicate)
            .map_err(|t| RdfStoreError::InvalidPredicate(t.to_string()))?;
        let triple = Triple::new(subject, predicate, object.into());

        trace!("add {}", triple);
        match self.insert(triple) {
            Ok(()) | Err(RdfStoreError::DuplicateTriple) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn find_statement(&self, pattern: &QueryPattern) -> Option<Triple> {
        self.candidates(pattern)
            .find(|triple| pattern.matches(triple))
            .cloned()
    }

    fn find_statements(&self, pattern: &QueryPattern) -> Vec<Triple> {
        self.query(pattern)
    }
}
