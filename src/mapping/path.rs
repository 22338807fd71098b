//! Path templates and identity resolution
//!
//! A path template is literal text with `{member}` placeholders. Each
//! placeholder is replaced by the lexical form of the named accessor's value,
//! percent-encoded as a single path segment. IRI-valued accessors and nested
//! objects contribute their IRI unchanged. A backslash escapes the next character; braces nest, so `{a{b}}` is a
//! single placeholder named `a{b}`.

use super::context::MappingContext;
use super::error::{MappingError, MappingResult};
use super::schema::Identity;
use super::value::{Mapped, Scalar, View};
use crate::rdf::{RdfTerm, TripleStore};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{trace, warn};

/// Placeholder name bound to an element's position in element paths
pub const INDEX_PLACEHOLDER: &str = "index";

/// Escaped in a value substituted into a template (RFC 3986 unreserved kept)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Escaped in a unique id, which is already an IRI reference
const IRI_UNSAFE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// One piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Placeholder(String),
}

/// Parsed path template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = parse_segments(&source);
        Self { source, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all placeholders, in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Text(_) => None,
        })
    }

    /// Substitute every placeholder through `lookup`
    pub fn render<F>(&self, mut lookup: F) -> MappingResult<String>
    where
        F: FnMut(&str) -> MappingResult<String>,
    {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Placeholder(name) => out.push_str(&lookup(name)?),
            }
        }
        Ok(out)
    }
}

impl From<String> for PathTemplate {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}

impl From<&str> for PathTemplate {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.source
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

fn parse_segments(s: &str) -> Vec<Segment> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut escaped = false;

    for c in s.chars() {
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                continue;
            }
            '{' => {
                depth += 1;
                if depth == 1 {
                    if !current.is_empty() {
                        result.push(Segment::Text(std::mem::take(&mut current)));
                    }
                    continue;
                }
            }
            '}' if depth == 1 => {
                depth = 0;
                result.push(Segment::Placeholder(std::mem::take(&mut current)));
                continue;
            }
            '}' if depth > 1 => depth -= 1,
            _ => {}
        }
        current.push(c);
    }

    if !current.is_empty() {
        if depth > 0 {
            result.push(Segment::Placeholder(current));
        } else {
            result.push(Segment::Text(current));
        }
    }
    result
}

/// How a member path is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    /// Rendered text is the full IRI (or is joined onto the base IRI)
    Absolute,
    /// Rendered text is appended to the owning subject's IRI
    Relative,
}

/// Addressing rule for a member value or collection element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRule {
    pub kind: PathKind,
    pub template: PathTemplate,
}

impl PathRule {
    pub fn absolute(template: impl Into<PathTemplate>) -> Self {
        Self {
            kind: PathKind::Absolute,
            template: template.into(),
        }
    }

    pub fn relative(template: impl Into<PathTemplate>) -> Self {
        Self {
            kind: PathKind::Relative,
            template: template.into(),
        }
    }
}

/// True when `s` starts with a URI scheme (`http:`, `urn:`, ...)
pub fn has_scheme(s: &str) -> bool {
    match s.find(':') {
        Some(pos) if pos > 0 => {
            let scheme = &s[..pos];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        _ => false,
    }
}

/// Append a path onto a base IRI
///
/// Absolute paths win. Fragments (`#x`) and queries (`?x`) attach directly;
/// anything else is joined with exactly one `/`.
pub fn join_path(base: &str, path: &str) -> String {
    if has_scheme(path) {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    if path.starts_with('#') || path.starts_with('?') {
        return format!("{}{}", base, path);
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Computes graph identities and path-addressed nodes
pub struct PathResolver<'c> {
    ctx: &'c MappingContext,
}

impl<'c> PathResolver<'c> {
    pub fn new(ctx: &'c MappingContext) -> Self {
        Self { ctx }
    }

    /// The node an instance is addressed by
    ///
    /// Named identities are deterministic: the same instance state always
    /// yields the same node. Types without a named identity get a fresh
    /// blank node on every call.
    pub fn identity_of<S: TripleStore + ?Sized>(
        &self,
        store: &S,
        instance: &dyn Mapped,
    ) -> MappingResult<RdfTerm> {
        match self.named_identity_of(instance)? {
            Some(iri) => Ok(store.make_named_node(&iri)?),
            None => Ok(store.make_blank_node()),
        }
    }

    /// IRI of an instance with a named identity; `None` for blank identities
    pub fn named_identity_of(&self, instance: &dyn Mapped) -> MappingResult<Option<String>> {
        let schema = self.ctx.schema();
        let type_name = instance.type_name();
        schema.mapping_for(type_name)?;

        match schema.identity_rule(type_name) {
            Identity::Blank => Ok(None),
            Identity::UniqueIdAccessor(accessor) => {
                let view = instance.get(accessor).ok_or_else(|| MappingError::UnknownMember {
                    type_name: type_name.to_string(),
                    member: accessor.clone(),
                })?;
                let id = self.lexical(&view, accessor, accessor)?;
                let id = utf8_percent_encode(&id, IRI_UNSAFE).to_string();
                Ok(Some(self.absolutize(&id)))
            }
            Identity::PathTemplate(template) => {
                let rendered = self.render(template, instance, None)?;
                trace!("{} identity {} -> {}", type_name, template, rendered);
                Ok(Some(self.absolutize(&rendered)))
            }
        }
    }

    /// IRI for a member or element path rule
    ///
    /// Placeholders resolve against `owner`. Returns `None` when a relative
    /// path has no named subject to attach to.
    pub fn resolve_rule(
        &self,
        rule: &PathRule,
        owner_subject: &RdfTerm,
        owner: &dyn Mapped,
        index: Option<usize>,
    ) -> MappingResult<Option<String>> {
        let rendered = self.render(&rule.template, owner, index)?;
        match rule.kind {
            PathKind::Absolute => Ok(Some(self.absolutize(&rendered))),
            PathKind::Relative if has_scheme(&rendered) => Ok(Some(rendered)),
            PathKind::Relative => match owner_subject.as_iri() {
                Some(base) => Ok(Some(join_path(base, &rendered))),
                None => {
                    warn!(
                        "relative path {:?} under blank subject {}; using a blank node",
                        rule.template.as_str(),
                        owner_subject
                    );
                    Ok(None)
                }
            },
        }
    }

    /// Render a template against an instance's accessors
    pub fn render(
        &self,
        template: &PathTemplate,
        instance: &dyn Mapped,
        index: Option<usize>,
    ) -> MappingResult<String> {
        template.render(|name| {
            if name == INDEX_PLACEHOLDER {
                if let Some(i) = index {
                    return Ok(i.to_string());
                }
            }
            match instance.get(name) {
                Some(view) => self.component(&view, template.as_str(), name),
                None => Err(MappingError::UnresolvedPlaceholder {
                    template: template.as_str().to_string(),
                    placeholder: name.to_string(),
                }),
            }
        })
    }

    fn component(&self, view: &View<'_>, template: &str, name: &str) -> MappingResult<String> {
        match view {
            View::Scalar(Scalar::Iri(_)) | View::Object(_) => self.lexical(view, template, name),
            _ => {
                let lexical = self.lexical(view, template, name)?;
                Ok(utf8_percent_encode(&lexical, SEGMENT).to_string())
            }
        }
    }

    fn lexical(&self, view: &View<'_>, template: &str, name: &str) -> MappingResult<String> {
        match view {
            View::Scalar(s) => Ok(s.lexical()),
            View::Object(obj) => match self.named_identity_of(*obj)? {
                Some(iri) => Ok(iri),
                None => Err(MappingError::UnresolvedPlaceholder {
                    template: template.to_string(),
                    placeholder: name.to_string(),
                }),
            },
            View::Absent | View::List(_) => Err(MappingError::UnresolvedPlaceholder {
                template: template.to_string(),
                placeholder: name.to_string(),
            }),
        }
    }

    fn absolutize(&self, s: &str) -> String {
        if has_scheme(s) {
            s.to_string()
        } else {
            join_path(&self.ctx.config().base_iri, s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ClassMapping, MappingConfig, Schema, Value, DynamicObject};
    use crate::rdf::RdfStore;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    fn ph(s: &str) -> Segment {
        Segment::Placeholder(s.to_string())
    }

    #[test]
    fn test_parse_segments() {
        let t = PathTemplate::parse("http://example.com/{deviceID}/head");
        assert_eq!(
            t.segments(),
            &[text("http://example.com/"), ph("deviceID"), text("/head")]
        );
        assert_eq!(t.placeholders().collect::<Vec<_>>(), vec!["deviceID"]);
    }

    #[test]
    fn test_parse_escapes_and_nesting() {
        assert_eq!(PathTemplate::parse(r"a\{b\}c").segments(), &[text("a{b}c")]);
        assert_eq!(PathTemplate::parse("{a{b}}x").segments(), &[ph("a{b}"), text("x")]);
        assert_eq!(PathTemplate::parse("p/{open").segments(), &[text("p/"), ph("open")]);
        assert!(PathTemplate::parse("").segments().is_empty());
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("http://ex.org/pose", "/transl"), "http://ex.org/pose/transl");
        assert_eq!(join_path("http://ex.org/", "devices/1"), "http://ex.org/devices/1");
        assert_eq!(join_path("http://ex.org/a", "#frag"), "http://ex.org/a#frag");
        assert_eq!(join_path("http://ex.org/a", "urn:x:1"), "urn:x:1");
        assert_eq!(join_path("http://ex.org/a", ""), "http://ex.org/a");
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("http://x"));
        assert!(has_scheme("urn:uuid:1"));
        assert!(!has_scheme("/rot"));
        assert!(!has_scheme("devices/1:2"));
        assert!(!has_scheme(":x"));
    }

    fn context() -> MappingContext {
        let mut schema = Schema::new();
        schema
            .insert(ClassMapping::new("Device").identity(Identity::PathTemplate("devices/{serial}".into())))
            .unwrap();
        schema
            .insert(ClassMapping::new("Tag").identity(Identity::UniqueIdAccessor("uri".into())))
            .unwrap();
        schema.insert(ClassMapping::new("Loose")).unwrap();
        MappingContext::new(schema, MappingConfig::new("http://example.org/")).unwrap()
    }

    #[test]
    fn test_path_template_identity_is_deterministic() {
        let ctx = context();
        let store = RdfStore::new();
        let resolver = PathResolver::new(&ctx);
        let device = DynamicObject::new("Device").with("serial", Value::scalar(42i64));

        let first = resolver.identity_of(&store, &device).unwrap();
        let second = resolver.identity_of(&store, &device).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_iri(), Some("http://example.org/devices/42"));
    }

    #[test]
    fn test_placeholder_values_are_percent_encoded() {
        let ctx = context();
        let store = RdfStore::new();
        let resolver = PathResolver::new(&ctx);

        let device = DynamicObject::new("Device").with("serial", Value::scalar("head mounted"));
        let node = resolver.identity_of(&store, &device).unwrap();
        assert_eq!(node.as_iri(), Some("http://example.org/devices/head%20mounted"));

        let device = DynamicObject::new("Device").with("serial", Value::scalar("a/b?c#d"));
        let node = resolver.identity_of(&store, &device).unwrap();
        assert_eq!(node.as_iri(), Some("http://example.org/devices/a%2Fb%3Fc%23d"));

        let device = DynamicObject::new("Device").with("serial", Value::scalar("v1.2-rc_3~x"));
        let node = resolver.identity_of(&store, &device).unwrap();
        assert_eq!(node.as_iri(), Some("http://example.org/devices/v1.2-rc_3~x"));
    }

    #[test]
    fn test_unique_id_keeps_iri_structure() {
        let ctx = context();
        let store = RdfStore::new();
        let tag = DynamicObject::new("Tag").with("uri", Value::scalar("tags/big red"));

        let node = PathResolver::new(&ctx).identity_of(&store, &tag).unwrap();
        assert_eq!(node.as_iri(), Some("http://example.org/tags/big%20red"));
    }

    #[test]
    fn test_unique_id_identity() {
        let ctx = context();
        let store = RdfStore::new();
        let tag = DynamicObject::new("Tag").with("uri", Value::scalar(crate::mapping::Scalar::Iri("urn:tag:7".into())));

        let node = PathResolver::new(&ctx).identity_of(&store, &tag).unwrap();
        assert_eq!(node.as_iri(), Some("urn:tag:7"));
    }

    #[test]
    fn test_blank_identity_is_fresh() {
        let ctx = context();
        let store = RdfStore::new();
        let loose = DynamicObject::new("Loose");
        let resolver = PathResolver::new(&ctx);

        let a = resolver.identity_of(&store, &loose).unwrap();
        let b = resolver.identity_of(&store, &loose).unwrap();
        assert!(a.is_blank_node());
        assert_ne!(a, b);
    }

    #[test]
    fn test_unresolved_placeholder() {
        let ctx = context();
        let store = RdfStore::new();
        let device = DynamicObject::new("Device");

        let err = PathResolver::new(&ctx).identity_of(&store, &device).unwrap_err();
        assert!(matches!(err, MappingError::UnresolvedPlaceholder { placeholder, .. } if placeholder == "serial"));
    }

    #[test]
    fn test_unmapped_type() {
        let ctx = context();
        let store = RdfStore::new();
        let err = PathResolver::new(&ctx)
            .identity_of(&store, &DynamicObject::new("Nope"))
            .unwrap_err();
        assert!(matches!(err, MappingError::UnmappedType(t) if t == "Nope"));
    }

    #[test]
    fn test_resolve_rule() {
        let ctx = context();
        let resolver = PathResolver::new(&ctx);
        let owner = DynamicObject::new("Device").with("serial", Value::scalar("X1"));
        let named = RdfTerm::NamedNode(crate::rdf::NamedNode::new("http://example.org/devices/X1").unwrap());
        let blank = RdfTerm::BlankNode(crate::rdf::BlankNode::new());

        let rel = PathRule::relative("/head");
        assert_eq!(
            resolver.resolve_rule(&rel, &named, &owner, None).unwrap().as_deref(),
            Some("http://example.org/devices/X1/head")
        );
        assert_eq!(resolver.resolve_rule(&rel, &blank, &owner, None).unwrap(), None);

        let abs = PathRule::absolute("http://example.com/{serial}/head");
        assert_eq!(
            resolver.resolve_rule(&abs, &blank, &owner, None).unwrap().as_deref(),
            Some("http://example.com/X1/head")
        );

        let element = PathRule::relative("/items/{index}");
        assert_eq!(
            resolver.resolve_rule(&element, &named, &owner, Some(3)).unwrap().as_deref(),
            Some("http://example.org/devices/X1/items/3")
        );
    }
}
