//! Graph reader
//!
//! Populates an instance from the statements about its subject. Traversal
//! order is the writer's: bases, class triples, then members. Every pattern
//! is one store lookup with the already-bound nodes fixed, evaluated in
//! declaration order, since later patterns depend on earlier bindings.

use super::bindings::Bindings;
use super::context::MappingContext;
use super::error::{DecodeError, MappingError, MappingResult};
use super::schema::{ClassMapping, MemberMapping, NodeRef, TriplePattern, ValueKind};
use super::value::{Mapped, Value};
use crate::rdf::{
    Position, QueryPattern, RdfObject, RdfPredicate, RdfSubject, RdfTerm, Triple, TripleStore,
};
use oxrdf::vocab::rdf;
use std::cell::RefCell;
use tracing::{debug, trace};

/// Reads mapped instances out of a store
pub struct GraphReader<'c, S: TripleStore + ?Sized> {
    ctx: &'c MappingContext,
    store: &'c S,
    /// Subjects and types on the current read path, outermost first
    reading: RefCell<Vec<(RdfTerm, String)>>,
}

/// Which triples a pattern belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Class,
    Member,
    Element,
}

/// Member value and element nodes bound so far
#[derive(Debug, Clone, Default)]
struct Slots {
    that: Option<RdfTerm>,
    element: Option<RdfTerm>,
}

const CLASS_TRIPLES: &str = "<class>";

impl<'c, S: TripleStore + ?Sized> GraphReader<'c, S> {
    pub fn new(ctx: &'c MappingContext, store: &'c S) -> Self {
        Self {
            ctx,
            store,
            reading: RefCell::new(Vec::new()),
        }
    }

    /// Populate `instance` from the statements about `subject`
    ///
    /// On error the instance may be partially populated and must be
    /// discarded. Reading a subject as a type it is already being read as
    /// further up fails with [`MappingError::CyclicGraph`].
    pub fn read(&self, subject: &RdfTerm, instance: &mut dyn Mapped) -> MappingResult<()> {
        let type_name = instance.type_name().to_string();
        let key = (subject.clone(), type_name);
        if self.reading.borrow().contains(&key) {
            let (node, type_name) = key;
            return Err(MappingError::CyclicGraph {
                type_name,
                node: node.to_string(),
            });
        }

        debug!("Reading {} from {}", key.1, subject);
        self.reading.borrow_mut().push(key.clone());
        let mut env = Bindings::new();
        let result = self.read_class(&key.1, subject, instance, &mut env);
        self.reading.borrow_mut().pop();
        result
    }

    /// Instantiate `type_name`, or its most derived subtype present at
    /// `subject`, and read it
    pub fn load(&self, subject: &RdfTerm, type_name: &str) -> MappingResult<Box<dyn Mapped>> {
        let chosen = self.dispatch(type_name, subject)?;
        let mut instance = self.ctx.schema().instantiate(chosen);
        self.read(subject, &mut *instance)?;
        Ok(instance)
    }

    fn read_class(
        &self,
        type_name: &str,
        subject: &RdfTerm,
        instance: &mut dyn Mapped,
        env: &mut Bindings,
    ) -> MappingResult<()> {
        let mapping = self.ctx.schema().mapping_for(type_name)?;

        for base in &mapping.bases {
            self.read_class(base, subject, instance, env)?;
        }

        let mut slots = Slots::default();
        for pattern in &mapping.class_triples {
            self.match_one(mapping, CLASS_TRIPLES, pattern, Scope::Class, subject, env, &mut slots)?;
        }

        for member in mapping.members.iter().filter(|m| m.direction.reads()) {
            self.read_member(mapping, member, subject, instance, env)?;
        }
        Ok(())
    }

    fn read_member(
        &self,
        mapping: &ClassMapping,
        member: &MemberMapping,
        subject: &RdfTerm,
        instance: &mut dyn Mapped,
        env: &mut Bindings,
    ) -> MappingResult<()> {
        let mut slots = Slots::default();

        for (i, pattern) in member.member_triples.iter().enumerate() {
            match self.match_one(mapping, &member.name, pattern, Scope::Member, subject, env, &mut slots) {
                Ok(_) => {}
                Err(e) if i == 0 && member.optional && e.is_pattern_not_found() => {
                    debug!("{}.{} not present, left unset", mapping.type_name, member.name);
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }

        let Some((first, rest)) = member.element_triples.split_first() else {
            if let Some(that) = slots.that {
                let value = self.decode(&member.value, &that)?;
                instance.set(&member.name, value)?;
            }
            return Ok(());
        };

        let matches: Vec<Triple> = match self.query_for(first, Scope::Element, subject, env, &slots)? {
            Some(query) => self
                .store
                .find_statements(&query)
                .into_iter()
                .filter(|t| consistent(first, &query, t))
                .collect(),
            None => Vec::new(),
        };

        if matches.is_empty() {
            if !member.optional {
                return Err(self.not_found(mapping, &member.name, first, subject, env, &slots));
            }
            if !member.member_triples.is_empty() {
                instance.set(&member.name, Value::List(Vec::new()))?;
            }
            debug!("{}.{} has no elements", mapping.type_name, member.name);
            return Ok(());
        }

        let mut items = Vec::with_capacity(matches.len());
        for triple in &matches {
            let mut element_env = env.clone();
            let mut element_slots = slots.clone();
            bind(first, triple, Scope::Element, &mut element_env, &mut element_slots);

            for pattern in rest {
                self.match_one(
                    mapping,
                    &member.name,
                    pattern,
                    Scope::Element,
                    subject,
                    &mut element_env,
                    &mut element_slots,
                )?;
            }

            let element = element_slots.element.ok_or_else(|| MappingError::InvalidPattern {
                class: mapping.type_name.clone(),
                reason: format!("{} binds no element", first),
            })?;
            items.push(self.decode(&member.value, &element)?);
        }
        trace!("{}.{}: {} elements", mapping.type_name, member.name, items.len());
        instance.set(&member.name, Value::List(items))
    }

    /// Resolve one pattern to a single statement and bind its wildcards
    #[allow(clippy::too_many_arguments)]
    fn match_one(
        &self,
        mapping: &ClassMapping,
        member: &str,
        pattern: &TriplePattern,
        scope: Scope,
        subject: &RdfTerm,
        env: &mut Bindings,
        slots: &mut Slots,
    ) -> MappingResult<Triple> {
        let found = match self.query_for(pattern, scope, subject, env, slots)? {
            Some(query) if has_repeated_wildcard(pattern, &query) => self
                .store
                .find_statements(&query)
                .into_iter()
                .find(|t| consistent(pattern, &query, t)),
            Some(query) => self.store.find_statement(&query),
            None => None,
        };

        match found {
            Some(triple) => {
                trace!("{} matched {}", pattern, triple);
                bind(pattern, &triple, scope, env, slots);
                Ok(triple)
            }
            None => Err(self.not_found(mapping, member, pattern, subject, env, slots)),
        }
    }

    /// Store query for a pattern; `None` when a bound node can't occupy its
    /// position, so nothing can match
    fn query_for(
        &self,
        pattern: &TriplePattern,
        scope: Scope,
        subject: &RdfTerm,
        env: &Bindings,
        slots: &Slots,
    ) -> MappingResult<Option<QueryPattern>> {
        let s = self.bound(&pattern.subject, scope, subject, env, slots)?;
        let p = self.bound(&pattern.predicate, scope, subject, env, slots)?;
        let o = self.bound(&pattern.object, scope, subject, env, slots)?;

        let s = match s.map(RdfSubject::try_from).transpose() {
            Ok(s) => s,
            Err(_) => return Ok(None),
        };
        let p = match p.map(RdfPredicate::try_from).transpose() {
            Ok(p) => p,
            Err(_) => return Ok(None),
        };
        Ok(Some(QueryPattern::new(s, p, o.map(RdfObject::from))))
    }

    /// Node a placeholder is fixed to, or `None` for a wildcard
    fn bound(
        &self,
        node: &NodeRef,
        scope: Scope,
        subject: &RdfTerm,
        env: &Bindings,
        slots: &Slots,
    ) -> MappingResult<Option<RdfTerm>> {
        Ok(match node {
            NodeRef::ThisRef => Some(subject.clone()),
            NodeRef::Iri(iri) => Some(self.store.make_named_node(iri)?),
            NodeRef::Named(name) => Some(self.store.make_named_node(&self.ctx.expand(name)?)?),
            NodeRef::Blank(label) => env.get(label).cloned(),
            NodeRef::ThatRef if scope == Scope::Element => slots.that.clone(),
            NodeRef::ThatRef => None,
            NodeRef::ThatElementRef => slots.element.clone(),
        })
    }

    fn not_found(
        &self,
        mapping: &ClassMapping,
        member: &str,
        pattern: &TriplePattern,
        subject: &RdfTerm,
        env: &Bindings,
        slots: &Slots,
    ) -> MappingError {
        let described = match self.query_for(pattern, Scope::Element, subject, env, slots) {
            Ok(Some(query)) => query.to_string(),
            _ => pattern.to_string(),
        };
        MappingError::PatternNotFound {
            class: mapping.type_name.clone(),
            member: member.to_string(),
            pattern: described,
        }
    }

    fn decode(&self, kind: &ValueKind, node: &RdfTerm) -> MappingResult<Value> {
        match kind {
            ValueKind::Scalar(scalar) => Ok(Value::Scalar(self.ctx.codec().decode(node, *scalar)?)),
            ValueKind::Object(type_name) => {
                if node.is_literal() {
                    return Err(DecodeError::new(node, type_name.as_str(), "expected a resource node").into());
                }
                Ok(Value::Object(self.load(node, type_name)?))
            }
        }
    }

    /// Most derived subtype of `declared` whose type assertions all hold
    /// for `node`; `declared` itself when none qualifies
    fn dispatch<'a>(&'a self, declared: &'a str, node: &RdfTerm) -> MappingResult<&'a str> {
        let schema = self.ctx.schema();
        if !self.ctx.config().dispatch_by_type || node.is_literal() {
            return Ok(declared);
        }

        let mut best = declared;
        let mut best_depth = schema.ancestors(declared).len();
        for candidate in schema.subtypes_of(declared) {
            if candidate == declared {
                continue;
            }
            let ancestors = schema.ancestors(candidate);
            if ancestors.len() <= best_depth || self.own_type_assertions(candidate)?.is_empty() {
                continue;
            }
            let mut all_present = true;
            for ancestor in &ancestors {
                for class_iri in self.own_type_assertions(ancestor)? {
                    if !self.has_type(node, &class_iri)? {
                        all_present = false;
                    }
                }
            }
            if all_present {
                best = candidate;
                best_depth = ancestors.len();
            }
        }

        if best != declared {
            debug!("Dispatching {} to {} for {}", declared, best, node);
        }
        Ok(best)
    }

    /// Class IRIs asserted by `$this rdf:type C` in the type's own class triples
    fn own_type_assertions(&self, type_name: &str) -> MappingResult<Vec<String>> {
        let mut out = Vec::new();
        let Some(mapping) = self.ctx.schema().get(type_name) else {
            return Ok(out);
        };
        for pattern in &mapping.class_triples {
            if pattern.subject != NodeRef::ThisRef {
                continue;
            }
            let predicate = self.ctx.constant(&pattern.predicate)?;
            if predicate.as_deref() != Some(rdf::TYPE.as_str()) {
                continue;
            }
            if let Some(class_iri) = self.ctx.constant(&pattern.object)? {
                out.push(class_iri);
            }
        }
        Ok(out)
    }

    fn has_type(&self, node: &RdfTerm, class_iri: &str) -> MappingResult<bool> {
        let Ok(subject) = RdfSubject::try_from(node.clone()) else {
            return Ok(false);
        };
        let class = self.store.make_named_node(class_iri)?;
        let query = QueryPattern::new(
            Some(subject),
            Some(RdfPredicate::new(rdf::TYPE.as_str())?),
            Some(class.into()),
        );
        Ok(self.store.find_statement(&query).is_some())
    }
}

/// Record the nodes a match assigns to the pattern's unbound placeholders
fn bind(pattern: &TriplePattern, triple: &Triple, scope: Scope, env: &mut Bindings, slots: &mut Slots) {
    for position in Position::ALL {
        match pattern.ref_at(position) {
            NodeRef::Blank(label) if !env.contains(label) => {
                env.bind(label, triple.term_at(position));
            }
            NodeRef::ThatRef if slots.that.is_none() && scope != Scope::Class => {
                slots.that = Some(triple.term_at(position));
            }
            NodeRef::ThatElementRef if slots.element.is_none() => {
                slots.element = Some(triple.term_at(position));
            }
            _ => {}
        }
    }
}

fn is_wildcard(query: &QueryPattern, position: Position) -> bool {
    match position {
        Position::Subject => query.subject.is_none(),
        Position::Predicate => query.predicate.is_none(),
        Position::Object => query.object.is_none(),
    }
}

fn has_repeated_wildcard(pattern: &TriplePattern, query: &QueryPattern) -> bool {
    let free: Vec<&NodeRef> = Position::ALL
        .into_iter()
        .filter(|p| is_wildcard(query, *p))
        .map(|p| pattern.ref_at(p))
        .collect();
    free.iter()
        .enumerate()
        .any(|(i, r)| free[..i].contains(r))
}

/// A placeholder repeated across wildcard positions matches the same node
fn consistent(pattern: &TriplePattern, query: &QueryPattern, triple: &Triple) -> bool {
    let free: Vec<(&NodeRef, RdfTerm)> = Position::ALL
        .into_iter()
        .filter(|p| is_wildcard(query, *p))
        .map(|p| (pattern.ref_at(p), triple.term_at(p)))
        .collect();
    free.iter().enumerate().all(|(i, (r, t))| {
        free[..i]
            .iter()
            .all(|(earlier, term)| earlier != r || term == t)
    })
}
