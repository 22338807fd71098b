//! Mapping schema
//!
//! Per-type mapping rules: the triples describing a type itself, the
//! triples describing each member, and how an instance's graph identity is
//! computed. A [`Schema`] is built once and only read afterwards.

use super::error::{MappingError, MappingResult, SchemaError, SchemaResult};
use super::path::{PathRule, PathTemplate};
use super::value::{DynamicObject, Mapped, ScalarKind};
use crate::rdf::Position;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Placeholder in one position of a triple pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NodeRef {
    /// The instance being mapped (`$this`)
    ThisRef,
    /// The current member's value (`$that`)
    ThatRef,
    /// One element of a collection member (`$that.element`)
    ThatElementRef,
    /// Constant IRI written in full (`<iri>`, or bare with a `://`)
    Iri(String),
    /// Constant prefixed name (`prefix:local`)
    Named(String),
    /// Local pattern variable (`_:label`)
    Blank(String),
}

impl NodeRef {
    pub fn named(name: impl Into<String>) -> Self {
        NodeRef::Named(name.into())
    }

    pub fn iri(iri: impl Into<String>) -> Self {
        NodeRef::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        NodeRef::Blank(label.into())
    }

    /// Refers to a member value or element
    pub fn is_member_ref(&self) -> bool {
        matches!(self, NodeRef::ThatRef | NodeRef::ThatElementRef)
    }
}

impl FromStr for NodeRef {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "$this" => return Ok(NodeRef::ThisRef),
            "$that" => return Ok(NodeRef::ThatRef),
            "$that.element" | "$that.foreach" | "$that.item" => return Ok(NodeRef::ThatElementRef),
            _ => {}
        }

        if let Some(label) = s.strip_prefix("_:") {
            if !label.is_empty() {
                return Ok(NodeRef::Blank(label.to_string()));
            }
        } else if let Some(inner) = s.strip_prefix('<').and_then(|r| r.strip_suffix('>')) {
            if !inner.is_empty() {
                return Ok(NodeRef::Iri(inner.to_string()));
            }
        } else if s.contains("://") {
            return Ok(NodeRef::Iri(s.to_string()));
        } else if !s.starts_with('$') {
            if let Some((prefix, _)) = s.split_once(':') {
                let valid = prefix
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
                if valid {
                    return Ok(NodeRef::Named(s.to_string()));
                }
            }
        }
        Err(SchemaError::UnknownNodeRef(s.to_string()))
    }
}

impl TryFrom<String> for NodeRef {
    type Error = SchemaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NodeRef> for String {
    fn from(node: NodeRef) -> Self {
        node.to_string()
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::ThisRef => write!(f, "$this"),
            NodeRef::ThatRef => write!(f, "$that"),
            NodeRef::ThatElementRef => write!(f, "$that.element"),
            NodeRef::Iri(iri) => write!(f, "<{}>", iri),
            NodeRef::Named(name) => write!(f, "{}", name),
            NodeRef::Blank(label) => write!(f, "_:{}", label),
        }
    }
}

/// Subject, predicate and object placeholders
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[NodeRef; 3]", into = "[NodeRef; 3]")]
pub struct TriplePattern {
    pub subject: NodeRef,
    pub predicate: NodeRef,
    pub object: NodeRef,
}

impl TriplePattern {
    pub fn new(subject: NodeRef, predicate: NodeRef, object: NodeRef) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Parse the three terms of a directive
    pub fn parse(subject: &str, predicate: &str, object: &str) -> SchemaResult<Self> {
        Ok(Self::new(subject.parse()?, predicate.parse()?, object.parse()?))
    }

    pub fn refs(&self) -> [&NodeRef; 3] {
        [&self.subject, &self.predicate, &self.object]
    }

    pub fn ref_at(&self, position: Position) -> &NodeRef {
        match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
        }
    }

    pub fn mentions(&self, node: &NodeRef) -> bool {
        self.refs().contains(&node)
    }

    pub fn has_element_ref(&self) -> bool {
        self.mentions(&NodeRef::ThatElementRef)
    }

    /// Labels of the blank variables, in position order
    pub fn blank_labels(&self) -> impl Iterator<Item = &str> {
        self.refs().into_iter().filter_map(|r| match r {
            NodeRef::Blank(label) => Some(label.as_str()),
            _ => None,
        })
    }
}

impl From<[NodeRef; 3]> for TriplePattern {
    fn from([subject, predicate, object]: [NodeRef; 3]) -> Self {
        Self::new(subject, predicate, object)
    }
}

impl From<TriplePattern> for [NodeRef; 3] {
    fn from(p: TriplePattern) -> Self {
        [p.subject, p.predicate, p.object]
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Which accessors a member exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ReaderOnly,
    WriterOnly,
    #[default]
    Both,
}

impl Direction {
    /// Member takes part in graph writing
    pub fn writes(&self) -> bool {
        matches!(self, Direction::WriterOnly | Direction::Both)
    }

    /// Member takes part in graph reading
    pub fn reads(&self) -> bool {
        matches!(self, Direction::ReaderOnly | Direction::Both)
    }
}

/// Declared type of a member value (or of each collection element)
///
/// Serialized as a single name: one of the scalar kinds
/// (`string`, `integer`, `float`, `boolean`, `iri`) or a mapped type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ValueKind {
    Scalar(ScalarKind),
    Object(String),
}

impl ValueKind {
    pub fn object(type_name: impl Into<String>) -> Self {
        ValueKind::Object(type_name.into())
    }
}

impl From<ScalarKind> for ValueKind {
    fn from(kind: ScalarKind) -> Self {
        ValueKind::Scalar(kind)
    }
}

impl From<String> for ValueKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "string" => ValueKind::Scalar(ScalarKind::String),
            "integer" => ValueKind::Scalar(ScalarKind::Integer),
            "float" => ValueKind::Scalar(ScalarKind::Float),
            "boolean" => ValueKind::Scalar(ScalarKind::Boolean),
            "iri" => ValueKind::Scalar(ScalarKind::Iri),
            _ => ValueKind::Object(name),
        }
    }
}

impl From<&str> for ValueKind {
    fn from(name: &str) -> Self {
        ValueKind::from(name.to_string())
    }
}

impl From<ValueKind> for String {
    fn from(kind: ValueKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Scalar(kind) => write!(f, "{}", kind.to_string().to_lowercase()),
            ValueKind::Object(name) => write!(f, "{}", name),
        }
    }
}

/// Mapping rules for one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberMapping {
    pub name: String,
    pub direction: Direction,
    /// Evaluated once per instance
    pub member_triples: Vec<TriplePattern>,
    /// Evaluated once per collection element; empty for single values
    pub element_triples: Vec<TriplePattern>,
    /// Type of the value, or of each element for a collection
    pub value: ValueKind,
    /// Address of the member value node
    pub path: Option<PathRule>,
    /// Address of each element node
    pub element_path: Option<PathRule>,
    /// Missing triples leave the member unset instead of failing the read
    pub optional: bool,
}

impl MemberMapping {
    pub fn new(name: impl Into<String>, value: impl Into<ValueKind>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Both,
            member_triples: Vec::new(),
            element_triples: Vec::new(),
            value: value.into(),
            path: None,
            element_path: None,
            optional: false,
        }
    }

    /// Build a member from its declared triples, split into member and
    /// element triples with declaration order kept in each
    pub fn from_triples(
        name: impl Into<String>,
        value: impl Into<ValueKind>,
        triples: impl IntoIterator<Item = TriplePattern>,
    ) -> Self {
        triples
            .into_iter()
            .fold(Self::new(name, value), |member, triple| member.triple(triple))
    }

    /// Add a triple; element-referencing triples go to the element list
    pub fn triple(mut self, triple: TriplePattern) -> Self {
        if triple.has_element_ref() {
            self.element_triples.push(triple);
        } else {
            self.member_triples.push(triple);
        }
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn path(mut self, rule: PathRule) -> Self {
        self.path = Some(rule);
        self
    }

    pub fn element_path(mut self, rule: PathRule) -> Self {
        self.element_path = Some(rule);
        self
    }

    pub fn is_collection(&self) -> bool {
        !self.element_triples.is_empty()
    }

    /// The member's triples refer to the member value node
    pub fn uses_that(&self) -> bool {
        self.member_triples
            .iter()
            .chain(&self.element_triples)
            .any(|t| t.mentions(&NodeRef::ThatRef))
    }

    pub fn triples(&self) -> impl Iterator<Item = &TriplePattern> {
        self.member_triples.iter().chain(&self.element_triples)
    }

    fn validate(&self, class: &str) -> SchemaResult<()> {
        let invalid = |reason: &str| SchemaError::InvalidMember {
            class: class.to_string(),
            member: self.name.clone(),
            reason: reason.to_string(),
        };

        if self.member_triples.is_empty() && self.element_triples.is_empty() {
            return Err(invalid("member has no triples"));
        }
        if self.triples().any(|t| t.predicate == NodeRef::ThatElementRef) {
            return Err(invalid("element reference in predicate position"));
        }
        if self.element_path.is_some() && !self.is_collection() {
            return Err(invalid("element path on a single-valued member"));
        }
        Ok(())
    }
}

/// How an instance's graph node is computed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// Fresh blank node, unless a base type supplies a named identity
    #[default]
    Blank,
    /// The named accessor returns the node id
    UniqueIdAccessor(String),
    /// IRI rendered from member values, joined onto the base IRI when relative
    PathTemplate(PathTemplate),
}

impl Identity {
    pub fn is_blank(&self) -> bool {
        matches!(self, Identity::Blank)
    }
}

/// Mapping rules for one type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMapping {
    pub type_name: String,
    /// Asserted once per instance
    pub class_triples: Vec<TriplePattern>,
    /// Blank variables used anywhere in this type's triples
    pub blank_declarations: IndexSet<String>,
    /// Composed base types, in declaration order
    pub bases: Vec<String>,
    pub members: Vec<MemberMapping>,
    pub identity: Identity,
}

impl ClassMapping {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            class_triples: Vec::new(),
            blank_declarations: IndexSet::new(),
            bases: Vec::new(),
            members: Vec::new(),
            identity: Identity::Blank,
        }
    }

    pub fn class_triple(mut self, triple: TriplePattern) -> Self {
        self.declare_blanks(&triple);
        self.class_triples.push(triple);
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn member(mut self, member: MemberMapping) -> Self {
        for triple in member.triples() {
            for label in triple.blank_labels() {
                self.blank_declarations.insert(label.to_string());
            }
        }
        self.members.push(member);
        self
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn get_member(&self, name: &str) -> Option<&MemberMapping> {
        self.members.iter().find(|m| m.name == name)
    }

    fn declare_blanks(&mut self, triple: &TriplePattern) {
        for label in triple.blank_labels() {
            self.blank_declarations.insert(label.to_string());
        }
    }

    /// Structural checks that need no other class
    pub fn validate(&self) -> SchemaResult<()> {
        for triple in &self.class_triples {
            if let Some(reference) = triple.refs().into_iter().find(|r| r.is_member_ref()) {
                return Err(SchemaError::MemberRefInClassTriple {
                    class: self.type_name.clone(),
                    reference: reference.to_string(),
                });
            }
        }
        for member in &self.members {
            member.validate(&self.type_name)?;
        }
        Ok(())
    }
}

/// Constructor for instances the reader creates
pub type Factory = Arc<dyn Fn() -> Box<dyn Mapped> + Send + Sync>;

/// Registry of class mappings keyed by runtime type name
#[derive(Clone, Default, Serialize)]
pub struct Schema {
    classes: IndexMap<String, ClassMapping>,
    #[serde(skip)]
    factories: HashMap<String, Factory>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class mapping
    pub fn insert(&mut self, mapping: ClassMapping) -> SchemaResult<()> {
        mapping.validate()?;
        if self.classes.contains_key(&mapping.type_name) {
            return Err(SchemaError::DuplicateClass(mapping.type_name));
        }
        debug!(
            "Mapped {}: {} class triples, {} members",
            mapping.type_name,
            mapping.class_triples.len(),
            mapping.members.len()
        );
        self.classes.insert(mapping.type_name.clone(), mapping);
        Ok(())
    }

    /// Builder-style [`Schema::insert`]
    pub fn with_class(mut self, mapping: ClassMapping) -> SchemaResult<Self> {
        self.insert(mapping)?;
        Ok(self)
    }

    /// Check that every base names a known class and that no class is
    /// its own ancestor
    pub fn check(&self) -> SchemaResult<()> {
        for mapping in self.classes.values() {
            for base in &mapping.bases {
                if !self.classes.contains_key(base) {
                    return Err(SchemaError::UnknownBase {
                        class: mapping.type_name.clone(),
                        base: base.clone(),
                    });
                }
            }
        }

        let mut done = IndexSet::new();
        for type_name in self.classes.keys() {
            let mut on_stack = IndexSet::new();
            self.check_bases(type_name, &mut on_stack, &mut done)?;
        }
        Ok(())
    }

    fn check_bases<'a>(
        &'a self,
        type_name: &'a str,
        on_stack: &mut IndexSet<&'a str>,
        done: &mut IndexSet<&'a str>,
    ) -> SchemaResult<()> {
        if done.contains(type_name) {
            return Ok(());
        }
        if !on_stack.insert(type_name) {
            return Err(SchemaError::CyclicBase {
                class: type_name.to_string(),
            });
        }
        if let Some(mapping) = self.classes.get(type_name) {
            for base in &mapping.bases {
                self.check_bases(base, on_stack, done)?;
            }
        }
        on_stack.shift_remove(type_name);
        done.insert(type_name);
        Ok(())
    }

    /// Class mapping, or `None` for unmapped (leaf) types
    pub fn get(&self, type_name: &str) -> Option<&ClassMapping> {
        self.classes.get(type_name)
    }

    /// Class mapping, failing with `UnmappedType`
    pub fn mapping_for(&self, type_name: &str) -> MappingResult<&ClassMapping> {
        self.get(type_name)
            .ok_or_else(|| MappingError::UnmappedType(type_name.to_string()))
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassMapping> {
        self.classes.values()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Register the constructor used when reading values of `type_name`
    pub fn register_factory<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Mapped> + Send + Sync + 'static,
    {
        self.factories.insert(type_name.into(), Arc::new(factory));
    }

    /// Register `T::default` as the constructor for `type_name`
    pub fn register<T: Mapped + Default>(&mut self, type_name: impl Into<String>) {
        self.register_factory(type_name, || Box::new(T::default()));
    }

    /// New blank instance; a [`DynamicObject`] when no factory is registered
    pub fn instantiate(&self, type_name: &str) -> Box<dyn Mapped> {
        match self.factories.get(type_name) {
            Some(factory) => factory(),
            None => Box::new(DynamicObject::new(type_name)),
        }
    }

    /// Effective identity rule, inherited depth-first through bases
    pub fn identity_rule(&self, type_name: &str) -> &Identity {
        self.find_identity(type_name, 0).unwrap_or(&Identity::Blank)
    }

    fn find_identity(&self, type_name: &str, depth: usize) -> Option<&Identity> {
        if depth > self.classes.len() {
            return None;
        }
        let mapping = self.classes.get(type_name)?;
        if !mapping.identity.is_blank() {
            return Some(&mapping.identity);
        }
        mapping
            .bases
            .iter()
            .find_map(|base| self.find_identity(base, depth + 1))
    }

    /// `type_name` followed by all its transitive bases, depth-first
    pub fn ancestors<'a>(&'a self, type_name: &'a str) -> Vec<&'a str> {
        let mut out: Vec<&'a str> = Vec::new();
        let mut stack = vec![type_name];
        while let Some(current) = stack.pop() {
            if out.contains(&current) {
                continue;
            }
            out.push(current);
            if let Some(mapping) = self.classes.get(current) {
                stack.extend(mapping.bases.iter().rev().map(String::as_str));
            }
        }
        out
    }

    pub fn is_subtype_of(&self, type_name: &str, base: &str) -> bool {
        self.ancestors(type_name).contains(&base)
    }

    /// Mapped types that are `type_name` or derive from it, in declaration order
    pub fn subtypes_of<'a>(&'a self, type_name: &'a str) -> Vec<&'a str> {
        self.classes
            .keys()
            .map(String::as_str)
            .filter(|candidate| self.is_subtype_of(candidate, type_name))
            .collect()
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("classes", &self.classes)
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tp(s: &str, p: &str, o: &str) -> TriplePattern {
        TriplePattern::parse(s, p, o).unwrap()
    }

    #[test]
    fn test_node_ref_parsing() {
        assert_eq!("$this".parse::<NodeRef>().unwrap(), NodeRef::ThisRef);
        assert_eq!("$that".parse::<NodeRef>().unwrap(), NodeRef::ThatRef);
        for s in ["$that.element", "$that.foreach", "$that.item"] {
            assert_eq!(s.parse::<NodeRef>().unwrap(), NodeRef::ThatElementRef);
        }
        assert_eq!("_:1".parse::<NodeRef>().unwrap(), NodeRef::blank("1"));
        assert_eq!(
            "http://example.org/x".parse::<NodeRef>().unwrap(),
            NodeRef::iri("http://example.org/x")
        );
        assert_eq!(
            "<http://example.org/x>".parse::<NodeRef>().unwrap(),
            NodeRef::iri("http://example.org/x")
        );
        assert_eq!("<urn:ex:p>".parse::<NodeRef>().unwrap(), NodeRef::iri("urn:ex:p"));
        assert_eq!("rdf:type".parse::<NodeRef>().unwrap(), NodeRef::named("rdf:type"));

        for bad in ["$those", "plain", "_:", "a b:c"] {
            assert!(matches!(bad.parse::<NodeRef>(), Err(SchemaError::UnknownNodeRef(_))), "{}", bad);
        }
    }

    #[test]
    fn test_node_ref_display_parses_back() {
        for r in [
            NodeRef::ThisRef,
            NodeRef::ThatElementRef,
            NodeRef::blank("x"),
            NodeRef::named("ex:p"),
            NodeRef::iri("http://example.org/p"),
            NodeRef::iri("urn:ex:p"),
        ] {
            assert_eq!(r.to_string().parse::<NodeRef>().unwrap(), r);
        }
    }

    #[test]
    fn test_from_triples_partitions_in_order() {
        let member = MemberMapping::from_triples(
            "points",
            ValueKind::object("Point"),
            vec![
                tp("$this", "ex:list", "_:1"),
                tp("_:1", "ex:item", "$that.element"),
                tp("_:1", "ex:count", "$that"),
                tp("$that.element", "rdf:type", "ex:Point"),
            ],
        );
        assert_eq!(
            member.member_triples,
            vec![tp("$this", "ex:list", "_:1"), tp("_:1", "ex:count", "$that")]
        );
        assert_eq!(
            member.element_triples,
            vec![tp("_:1", "ex:item", "$that.element"), tp("$that.element", "rdf:type", "ex:Point")]
        );
        assert!(member.is_collection());
        assert!(member.uses_that());
    }

    #[test]
    fn test_blank_declarations_collected_in_order() {
        let mapping = ClassMapping::new("Pose")
            .class_triple(tp("$this", "ex:rel", "_:2"))
            .member(MemberMapping::new("x", ScalarKind::Float).triple(tp("_:1", "ex:x", "$that")))
            .class_triple(tp("_:2", "ex:other", "_:1"));
        assert_eq!(
            mapping.blank_declarations.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["2", "1"]
        );
    }

    #[test]
    fn test_validation() {
        let bad = ClassMapping::new("Bad").class_triple(tp("$this", "ex:p", "$that"));
        assert!(matches!(bad.validate(), Err(SchemaError::MemberRefInClassTriple { .. })));

        let empty = ClassMapping::new("Empty").member(MemberMapping::new("x", ScalarKind::Integer));
        assert!(matches!(empty.validate(), Err(SchemaError::InvalidMember { .. })));

        let mut schema = Schema::new();
        schema.insert(ClassMapping::new("A").base("Missing")).unwrap();
        assert!(matches!(schema.check(), Err(SchemaError::UnknownBase { .. })));
        assert!(matches!(
            schema.insert(ClassMapping::new("A")),
            Err(SchemaError::DuplicateClass(_))
        ));
    }

    #[test]
    fn test_cyclic_bases_rejected() {
        let schema = Schema::new()
            .with_class(ClassMapping::new("A").base("B"))
            .and_then(|s| s.with_class(ClassMapping::new("B").base("A")))
            .unwrap();
        assert!(matches!(schema.check(), Err(SchemaError::CyclicBase { .. })));

        let own = Schema::new().with_class(ClassMapping::new("Loop").base("Loop")).unwrap();
        assert!(matches!(own.check(), Err(SchemaError::CyclicBase { class }) if class == "Loop"));

        // A shared ancestor reached twice is not a cycle
        let diamond = Schema::new()
            .with_class(ClassMapping::new("Root"))
            .and_then(|s| s.with_class(ClassMapping::new("Left").base("Root")))
            .and_then(|s| s.with_class(ClassMapping::new("Right").base("Root")))
            .and_then(|s| s.with_class(ClassMapping::new("Both").base("Left").base("Right")))
            .unwrap();
        diamond.check().unwrap();
    }

    #[test]
    fn test_identity_inheritance_and_hierarchy() {
        let schema = Schema::new()
            .with_class(ClassMapping::new("Entity").identity(Identity::UniqueIdAccessor("id".into())))
            .and_then(|s| s.with_class(ClassMapping::new("Named").base("Entity")))
            .and_then(|s| s.with_class(ClassMapping::new("Person").base("Named")))
            .and_then(|s| s.with_class(ClassMapping::new("Other")))
            .unwrap();

        assert_eq!(schema.identity_rule("Person"), &Identity::UniqueIdAccessor("id".into()));
        assert_eq!(schema.identity_rule("Other"), &Identity::Blank);
        assert_eq!(schema.ancestors("Person"), vec!["Person", "Named", "Entity"]);
        assert!(schema.is_subtype_of("Person", "Entity"));
        assert!(!schema.is_subtype_of("Entity", "Person"));
        assert_eq!(schema.subtypes_of("Named"), vec!["Named", "Person"]);
    }

    #[test]
    fn test_instantiate_falls_back_to_dynamic_object() {
        #[derive(Debug, Default)]
        struct Marker;
        impl Mapped for Marker {
            fn type_name(&self) -> &str {
                "Marker"
            }
            fn get(&self, _member: &str) -> Option<crate::mapping::View<'_>> {
                None
            }
            fn set(&mut self, member: &str, _value: crate::mapping::Value) -> MappingResult<()> {
                Err(crate::mapping::unknown_member("Marker", member))
            }
        }

        let mut schema = Schema::new();
        schema.register::<Marker>("Marker");

        let marker = schema.instantiate("Marker");
        assert!(marker.as_ref().as_any().downcast_ref::<Marker>().is_some());

        let dynamic = schema.instantiate("Unknown");
        assert_eq!(dynamic.type_name(), "Unknown");
        assert!(dynamic.as_ref().as_any().downcast_ref::<DynamicObject>().is_some());
    }

    #[test]
    fn test_schema_serializes_for_inspection() {
        let schema = Schema::new()
            .with_class(
                ClassMapping::new("Translation")
                    .class_triple(tp("$this", "rdf:type", "ex:Translation"))
                    .member(MemberMapping::new("x", ScalarKind::Float).triple(tp("$this", "ex:x", "$that"))),
            )
            .unwrap();

        let json = serde_json::to_value(&schema).unwrap();
        let class = &json["classes"]["Translation"];
        assert_eq!(class["class_triples"][0][1], "rdf:type");
        assert_eq!(class["members"][0]["value"], "float");
        assert_eq!(class["members"][0]["member_triples"][0][2], "$that");
    }
}
