//! RDF (Resource Description Framework) primitives
//!
//! This module provides what the mapping engine consumes from the graph side:
//! - RDF terms and triples (subject-predicate-object)
//! - A statement store interface and an indexed in-memory store
//! - Namespace prefix expansion
//! - Turtle / N-Triples serialization
//!
//! # Example
//!
//! ```rust
//! use triplemap::rdf::{RdfStore, Triple, NamedNode, Literal, RdfPredicate};
//!
//! let mut store = RdfStore::new();
//!
//! // Create a triple
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! let triple = Triple::new(subject.clone().into(), predicate, object.into());
//! store.insert(triple.clone()).unwrap();
//!
//! // Query triples
//! let results = store.get_triples_with_subject(&subject.into());
//! assert_eq!(results.len(), 1);
//! ```

mod types;
mod store;
mod namespace;
mod serialization;

pub use types::{
    RdfError, RdfResult,
    RdfTerm, RdfSubject, RdfPredicate, RdfObject,
    NamedNode, BlankNode, Literal, Triple,
    Position, QueryPattern,
};

pub use store::{
    RdfStore, RdfStoreError, RdfStoreResult,
    TripleIterator, TripleStore,
};

pub use namespace::{
    NamespaceManager, Namespace, Namespaces,
    PrefixError, PrefixResult,
};

pub use serialization::{
    RdfFormat, RdfParser, RdfSerializer,
    ParseError, ParseResult,
    SerializeError, SerializeResult,
};
