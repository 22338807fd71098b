//! Graph writer
//!
//! Turns an instance into statements: base mappings first, then the class
//! triples, then each member in declaration order. Nested mapped values are
//! written under their own node with their own binding environment.

use super::bindings::Bindings;
use super::context::MappingContext;
use super::error::{MappingError, MappingResult};
use super::path::{PathResolver, PathRule};
use super::schema::{ClassMapping, MemberMapping, NodeRef, TriplePattern};
use super::value::{unknown_member, Mapped, View};
use crate::rdf::{RdfTerm, TripleStore};
use tracing::{debug, trace};

/// Writes mapped instances into a store
pub struct GraphWriter<'c, S: TripleStore + ?Sized> {
    ctx: &'c MappingContext,
    store: &'c mut S,
    resolver: PathResolver<'c>,
}

/// Nodes the member placeholders stand for while emitting one pattern
#[derive(Clone, Copy, Default)]
struct Slots<'a> {
    that: Option<&'a RdfTerm>,
    element: Option<&'a RdfTerm>,
}

impl<'c, S: TripleStore + ?Sized> GraphWriter<'c, S> {
    pub fn new(ctx: &'c MappingContext, store: &'c mut S) -> Self {
        Self {
            ctx,
            store,
            resolver: PathResolver::new(ctx),
        }
    }

    /// Write `instance` under `subject` and return `subject`
    pub fn write(&mut self, subject: &RdfTerm, instance: &dyn Mapped) -> MappingResult<RdfTerm> {
        debug!("Writing {} as {}", instance.type_name(), subject);
        let mut env = Bindings::new();
        self.write_class(instance.type_name(), subject, instance, &mut env)?;
        Ok(subject.clone())
    }

    /// Write `instance` under the node its identity rule yields
    pub fn insert(&mut self, instance: &dyn Mapped) -> MappingResult<RdfTerm> {
        let subject = self.resolver.identity_of(&*self.store, instance)?;
        self.write(&subject, instance)
    }

    fn write_class(
        &mut self,
        type_name: &str,
        subject: &RdfTerm,
        instance: &dyn Mapped,
        env: &mut Bindings,
    ) -> MappingResult<()> {
        let ctx = self.ctx;
        let mapping = ctx.schema().mapping_for(type_name)?;

        for base in &mapping.bases {
            self.write_class(base, subject, instance, env)?;
        }

        for label in &mapping.blank_declarations {
            if !env.contains(label) {
                let node = self.store.make_blank_node();
                env.bind(label, node);
            }
        }

        for pattern in &mapping.class_triples {
            self.emit(mapping, pattern, subject, env, Slots::default())?;
        }

        for member in mapping.members.iter().filter(|m| m.direction.writes()) {
            self.write_member(mapping, member, subject, instance, env)?;
        }
        Ok(())
    }

    fn write_member(
        &mut self,
        mapping: &ClassMapping,
        member: &MemberMapping,
        subject: &RdfTerm,
        instance: &dyn Mapped,
        env: &Bindings,
    ) -> MappingResult<()> {
        let value = instance
            .get(&member.name)
            .ok_or_else(|| unknown_member(instance.type_name(), &member.name))?;

        if value.is_absent() {
            trace!("{}.{} absent, skipped", mapping.type_name, member.name);
            return Ok(());
        }

        if !member.is_collection() {
            let that = self.value_node(mapping, member.path.as_ref(), subject, instance, &value, None)?;
            let slots = Slots {
                that: Some(&that),
                element: None,
            };
            for pattern in &member.member_triples {
                self.emit(mapping, pattern, subject, env, slots)?;
            }
            return Ok(());
        }

        let items = match value {
            View::List(items) => items,
            single => vec![single],
        };

        // The collection node itself carries no value; it only anchors
        // the member and element triples.
        let anchor = if member.uses_that() {
            Some(self.path_node(member.path.as_ref(), subject, instance, None)?)
        } else {
            None
        };

        for pattern in &member.member_triples {
            let slots = Slots {
                that: anchor.as_ref(),
                element: None,
            };
            self.emit(mapping, pattern, subject, env, slots)?;
        }

        let mut written = 0usize;
        for (index, item) in items.iter().enumerate() {
            if item.is_absent() {
                continue;
            }
            let element = self.value_node(
                mapping,
                member.element_path.as_ref(),
                subject,
                instance,
                item,
                Some(index),
            )?;
            let slots = Slots {
                that: anchor.as_ref(),
                element: Some(&element),
            };
            for pattern in &member.element_triples {
                self.emit(mapping, pattern, subject, env, slots)?;
            }
            written += 1;
        }
        trace!("{}.{}: {} elements", mapping.type_name, member.name, written);
        Ok(())
    }

    /// Node for a member value or element, writing nested objects
    fn value_node(
        &mut self,
        mapping: &ClassMapping,
        rule: Option<&PathRule>,
        owner_subject: &RdfTerm,
        owner: &dyn Mapped,
        value: &View<'_>,
        index: Option<usize>,
    ) -> MappingResult<RdfTerm> {
        match value {
            View::Scalar(scalar) => self.ctx.codec().encode(scalar),
            View::Object(object) => {
                let node = match rule {
                    Some(_) => self.path_node(rule, owner_subject, owner, index)?,
                    None => self.resolver.identity_of(&*self.store, *object)?,
                };
                self.write(&node, *object)
            }
            View::List(_) => Err(MappingError::InvalidPattern {
                class: mapping.type_name.clone(),
                reason: "nested list where a single value is expected".to_string(),
            }),
            View::Absent => Err(MappingError::InvalidPattern {
                class: mapping.type_name.clone(),
                reason: "absent value has no node".to_string(),
            }),
        }
    }

    /// Named node from a path rule, or a fresh blank node
    fn path_node(
        &self,
        rule: Option<&PathRule>,
        owner_subject: &RdfTerm,
        owner: &dyn Mapped,
        index: Option<usize>,
    ) -> MappingResult<RdfTerm> {
        let iri = match rule {
            Some(rule) => self.resolver.resolve_rule(rule, owner_subject, owner, index)?,
            None => None,
        };
        match iri {
            Some(iri) => Ok(self.store.make_named_node(&iri)?),
            None => Ok(self.store.make_blank_node()),
        }
    }

    fn emit(
        &mut self,
        mapping: &ClassMapping,
        pattern: &TriplePattern,
        subject: &RdfTerm,
        env: &Bindings,
        slots: Slots<'_>,
    ) -> MappingResult<()> {
        let s = self.resolve(mapping, &pattern.subject, subject, env, slots)?;
        let p = self.resolve(mapping, &pattern.predicate, subject, env, slots)?;
        let o = self.resolve(mapping, &pattern.object, subject, env, slots)?;

        if !p.is_named_node() {
            return Err(MappingError::InvalidPattern {
                class: mapping.type_name.clone(),
                reason: format!("{} resolves to a non-IRI predicate {}", pattern, p),
            });
        }
        if s.is_literal() {
            return Err(MappingError::InvalidPattern {
                class: mapping.type_name.clone(),
                reason: format!("{} resolves to a literal subject {}", pattern, s),
            });
        }

        trace!("{} {} {} .", s, p, o);
        self.store.add_statement(s, p, o)?;
        Ok(())
    }

    fn resolve(
        &self,
        mapping: &ClassMapping,
        node: &NodeRef,
        subject: &RdfTerm,
        env: &Bindings,
        slots: Slots<'_>,
    ) -> MappingResult<RdfTerm> {
        let unbound = |what: &str| MappingError::InvalidPattern {
            class: mapping.type_name.clone(),
            reason: format!("{} is not bound here", what),
        };

        match node {
            NodeRef::ThisRef => Ok(subject.clone()),
            NodeRef::ThatRef => slots.that.cloned().ok_or_else(|| unbound("$that")),
            NodeRef::ThatElementRef => slots.element.cloned().ok_or_else(|| unbound("$that.element")),
            NodeRef::Iri(iri) => Ok(self.store.make_named_node(iri)?),
            NodeRef::Named(name) => {
                let iri = self.ctx.expand(name)?;
                Ok(self.store.make_named_node(&iri)?)
            }
            NodeRef::Blank(label) => env
                .get(label)
                .cloned()
                .ok_or_else(|| unbound(&format!("_:{}", label))),
        }
    }
}
