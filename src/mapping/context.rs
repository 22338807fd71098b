//! Mapping context
//!
//! Everything one mapping session needs, passed explicitly into every call:
//! the schema, the namespace table, the literal codec and the configuration.
//! Independent contexts never interfere with each other.

use super::codec::{LiteralCodec, XsdLiteralCodec};
use super::config::MappingConfig;
use super::error::MappingResult;
use super::path::PathResolver;
use super::reader::GraphReader;
use super::schema::{NodeRef, Schema};
use super::value::Mapped;
use super::writer::GraphWriter;
use crate::rdf::{Namespaces, RdfTerm, TripleStore};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub struct MappingContext {
    schema: Arc<Schema>,
    namespaces: Box<dyn Namespaces + Send + Sync>,
    codec: Arc<dyn LiteralCodec>,
    config: MappingConfig,
    /// Constant names from the schema, expanded once
    expanded: HashMap<String, String>,
}

impl MappingContext {
    /// Build a context with the config's namespaces and the XSD literal codec
    ///
    /// Fails if the schema refers to unknown base types or prefixes.
    pub fn new(schema: impl Into<Arc<Schema>>, config: MappingConfig) -> MappingResult<Self> {
        let namespaces = config.namespaces();
        let mut ctx = Self {
            schema: schema.into(),
            namespaces: Box::new(namespaces),
            codec: Arc::new(XsdLiteralCodec::new()),
            config,
            expanded: HashMap::new(),
        };
        ctx.schema.check()?;
        ctx.expand_names()?;
        Ok(ctx)
    }

    /// Replace the namespace table
    pub fn with_namespaces<N>(mut self, namespaces: N) -> MappingResult<Self>
    where
        N: Namespaces + Send + Sync + 'static,
    {
        self.namespaces = Box::new(namespaces);
        self.expand_names()?;
        Ok(self)
    }

    /// Replace the literal codec
    pub fn with_codec<C: LiteralCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    fn expand_names(&mut self) -> MappingResult<()> {
        self.expanded.clear();
        let schema = Arc::clone(&self.schema);
        for mapping in schema.classes() {
            let triples = mapping
                .class_triples
                .iter()
                .chain(mapping.members.iter().flat_map(|m| m.triples()));
            for triple in triples {
                for node in triple.refs() {
                    if let NodeRef::Named(name) = node {
                        if !self.expanded.contains_key(name) {
                            let iri = self.namespaces.expand(name)?;
                            self.expanded.insert(name.clone(), iri);
                        }
                    }
                }
            }
        }
        debug!("Expanded {} schema names", self.expanded.len());
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &MappingConfig {
        &self.config
    }

    pub fn codec(&self) -> &dyn LiteralCodec {
        self.codec.as_ref()
    }

    pub fn namespaces(&self) -> &dyn Namespaces {
        self.namespaces.as_ref()
    }

    /// Full IRI for a constant name
    pub fn expand(&self, name: &str) -> MappingResult<String> {
        match self.expanded.get(name) {
            Some(iri) => Ok(iri.clone()),
            None => Ok(self.namespaces.expand(name)?),
        }
    }

    /// Full IRI of a constant node reference; `None` for placeholders
    pub fn constant(&self, node: &NodeRef) -> MappingResult<Option<String>> {
        match node {
            NodeRef::Iri(iri) => Ok(Some(iri.clone())),
            NodeRef::Named(name) => self.expand(name).map(Some),
            _ => Ok(None),
        }
    }

    /// Graph identity of an instance
    pub fn identity_of<S: TripleStore + ?Sized>(
        &self,
        store: &S,
        instance: &dyn Mapped,
    ) -> MappingResult<RdfTerm> {
        PathResolver::new(self).identity_of(store, instance)
    }

    /// Write `instance` under `subject`; returns `subject`
    pub fn write<S: TripleStore + ?Sized>(
        &self,
        store: &mut S,
        subject: &RdfTerm,
        instance: &dyn Mapped,
    ) -> MappingResult<RdfTerm> {
        GraphWriter::new(self, store).write(subject, instance)
    }

    /// Write `instance` under its own identity; returns that node
    pub fn insert<S: TripleStore + ?Sized>(
        &self,
        store: &mut S,
        instance: &dyn Mapped,
    ) -> MappingResult<RdfTerm> {
        GraphWriter::new(self, store).insert(instance)
    }

    /// Populate `instance` from the statements about `subject`
    pub fn read<S: TripleStore + ?Sized>(
        &self,
        store: &S,
        subject: &RdfTerm,
        instance: &mut dyn Mapped,
    ) -> MappingResult<()> {
        GraphReader::new(self, store).read(subject, instance)
    }

    /// Instantiate `type_name` (or a more derived type) and read it
    pub fn load<S: TripleStore + ?Sized>(
        &self,
        store: &S,
        subject: &RdfTerm,
        type_name: &str,
    ) -> MappingResult<Box<dyn Mapped>> {
        GraphReader::new(self, store).load(subject, type_name)
    }

    /// Read into a fresh `T::default()`
    pub fn load_as<T, S>(&self, store: &S, subject: &RdfTerm) -> MappingResult<T>
    where
        T: Mapped + Default,
        S: TripleStore + ?Sized,
    {
        let mut instance = T::default();
        self.read(store, subject, &mut instance)?;
        Ok(instance)
    }
}

impl fmt::Debug for MappingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingContext")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
