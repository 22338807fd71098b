//! triplemap
//!
//! Bidirectional mapping between typed objects and an RDF triple graph,
//! driven by a declarative per-type schema.
//!
//! # Architecture
//!
//! - `rdf`: terms, triples, the statement store interface with an indexed
//!   in-memory store, namespace expansion, Turtle / N-Triples
//! - `mapping`: the schema, the path resolver, the graph writer and the
//!   graph reader
//!
//! A caller obtains a subject node (from the path resolver or the store),
//! then writes an instance under it or reads an instance back from it. Both
//! directions walk the same schema: base mappings first, then class
//! triples, then members in declaration order.
//!
//! ## Features
//!
//! - ✅ Class triples, member triples and per-element collection triples
//! - ✅ `$this` / `$that` / `$that.element` / `_:blank` pattern terms
//! - ✅ Blank, unique-id and path-template identities
//! - ✅ Base type composition under one subject
//! - ✅ Optional members
//! - ✅ Subtype dispatch by `rdf:type` on read
//! - ✅ YAML / JSON schema documents
//! - ✅ Turtle and N-Triples
//!
//! ## Example Usage
//!
//! ```rust
//! use triplemap::{MappingConfig, MappingContext, RdfFormat, RdfSerializer, RdfStore, Schema};
//! use triplemap::mapping::{DynamicObject, Value};
//!
//! let schema = Schema::from_yaml_str(r#"
//! classes:
//!   Translation:
//!     identity:
//!       path: "translations/{name}"
//!     triples:
//!       - ["$this", "rdf:type", "ex:Translation"]
//!     members:
//!       - name: x
//!         type: float
//!         triples:
//!           - ["$this", "ex:x", "$that"]
//! "#).unwrap();
//!
//! let config = MappingConfig::new("http://example.org/")
//!     .with_prefix("ex", "http://example.org/ns#");
//! let ctx = MappingContext::new(schema, config).unwrap();
//!
//! let mut store = RdfStore::new();
//! let t = DynamicObject::new("Translation")
//!     .with("name", Value::scalar("t1"))
//!     .with("x", Value::scalar(1.0));
//! let subject = ctx.insert(&mut store, &t).unwrap();
//! assert_eq!(subject.as_iri(), Some("http://example.org/translations/t1"));
//!
//! let turtle = RdfSerializer::serialize_store(&store, RdfFormat::Turtle).unwrap();
//! assert!(turtle.contains("translations/t1"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod mapping;
pub mod rdf;

// Re-export main types for convenience
pub use mapping::{
    ClassMapping, DynamicObject, GraphReader, GraphWriter, Identity, Mapped, MappingConfig,
    MappingContext, MappingError, MappingResult, MemberMapping, NodeRef, Scalar, Schema,
    SchemaError, TriplePattern, Value, View,
};

pub use rdf::{
    BlankNode, Literal, NamedNode, NamespaceManager, RdfFormat, RdfParser, RdfSerializer,
    RdfStore, RdfStoreError, RdfTerm, Triple, TripleStore,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
