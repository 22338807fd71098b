//! Object-graph mapping engine
//!
//! Maps instances of schema-described types to and from RDF statements:
//! - [`Schema`]: per-type class triples, member triples and identity rules
//! - Path resolver: computes an instance's graph node
//! - [`GraphWriter`]: instance → statements
//! - [`GraphReader`]: statements → instance
//!
//! # Example
//!
//! ```rust
//! use triplemap::mapping::{
//!     ClassMapping, DynamicObject, MappingConfig, MappingContext, MemberMapping, Scalar,
//!     ScalarKind, Schema, TriplePattern, Value,
//! };
//! use triplemap::rdf::RdfStore;
//!
//! let schema = Schema::new()
//!     .with_class(
//!         ClassMapping::new("Person")
//!             .class_triple(TriplePattern::parse("$this", "rdf:type", "foaf:Person").unwrap())
//!             .member(
//!                 MemberMapping::new("name", ScalarKind::String)
//!                     .triple(TriplePattern::parse("$this", "foaf:name", "$that").unwrap()),
//!             ),
//!     )
//!     .unwrap();
//! let ctx = MappingContext::new(schema, MappingConfig::default()).unwrap();
//!
//! let mut store = RdfStore::new();
//! let alice = DynamicObject::new("Person").with("name", Value::scalar("Alice"));
//! let subject = ctx.insert(&mut store, &alice).unwrap();
//! assert_eq!(store.len(), 2);
//!
//! let mut back = DynamicObject::new("Person");
//! ctx.read(&store, &subject, &mut back).unwrap();
//! assert_eq!(back.scalar("name"), Some(&Scalar::String("Alice".into())));
//! ```

mod bindings;
mod codec;
mod config;
mod context;
mod error;
mod loader;
mod path;
mod reader;
mod schema;
mod value;
mod writer;

pub use bindings::Bindings;
pub use codec::{LiteralCodec, XsdLiteralCodec};
pub use config::{ConfigError, ConfigResult, MappingConfig};
pub use context::MappingContext;
pub use error::{DecodeError, MappingError, MappingResult, SchemaError, SchemaResult};
pub use loader::{ClassDocument, IdentityDocument, MemberDocument, SchemaDocument};
pub use path::{join_path, PathKind, PathResolver, PathRule, PathTemplate, Segment};
pub use reader::GraphReader;
pub use schema::{
    ClassMapping, Direction, Factory, Identity, MemberMapping, NodeRef, Schema, TriplePattern,
    ValueKind,
};
pub use value::{
    unknown_member, AsAny, DynamicObject, FromValue, Mapped, Scalar, ScalarKind, Value, View,
};
pub use writer::GraphWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_module_exports() {
        let _schema = Schema::new();
        let _config = MappingConfig::default();
        let _codec = XsdLiteralCodec::new();
        let _env = Bindings::new();
    }
}
