//! Literal codec
//!
//! Leaf values are never schema-mapped. Wherever `$that` or an element
//! reference resolves to a [`Scalar`], the codec produces the node on write
//! and parses it back on read.

use super::error::{DecodeError, MappingResult};
use super::value::{Scalar, ScalarKind};
use crate::rdf::{Literal, NamedNode, RdfTerm};
use oxrdf::vocab::xsd;

/// Conversion between leaf values and graph nodes
pub trait LiteralCodec: Send + Sync {
    fn encode(&self, value: &Scalar) -> MappingResult<RdfTerm>;

    fn decode(&self, node: &RdfTerm, kind: ScalarKind) -> Result<Scalar, DecodeError>;
}

/// XML Schema datatypes: `xsd:integer`, `xsd:double`, `xsd:boolean`, plain strings
///
/// [`Scalar::Iri`] values become named nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct XsdLiteralCodec;

impl XsdLiteralCodec {
    pub fn new() -> Self {
        Self
    }
}

impl LiteralCodec for XsdLiteralCodec {
    fn encode(&self, value: &Scalar) -> MappingResult<RdfTerm> {
        let term = match value {
            Scalar::String(s) => Literal::new_simple_literal(s.as_str()).into(),
            Scalar::Integer(i) => typed(i.to_string(), xsd::INTEGER.into_owned()),
            Scalar::Float(f) => typed(format_double(*f), xsd::DOUBLE.into_owned()),
            Scalar::Boolean(b) => typed(b.to_string(), xsd::BOOLEAN.into_owned()),
            Scalar::Iri(iri) => NamedNode::new(iri)?.into(),
        };
        Ok(term)
    }

    fn decode(&self, node: &RdfTerm, kind: ScalarKind) -> Result<Scalar, DecodeError> {
        let fail = |reason: &str| DecodeError::new(node, kind.to_string(), reason);

        let lexical = || {
            node.as_literal()
                .map(Literal::value)
                .ok_or_else(|| fail("expected a literal"))
        };

        match kind {
            ScalarKind::Iri => match node {
                RdfTerm::NamedNode(n) => Ok(Scalar::Iri(n.as_str().to_string())),
                RdfTerm::Literal(l) if l.datatype_iri() == xsd::ANY_URI.as_str() => {
                    Ok(Scalar::Iri(l.value().to_string()))
                }
                _ => Err(fail("expected a named node")),
            },
            ScalarKind::String => Ok(Scalar::String(lexical()?.to_string())),
            ScalarKind::Integer => lexical()?
                .trim()
                .trim_start_matches('+')
                .parse::<i64>()
                .map(Scalar::Integer)
                .map_err(|_| fail("invalid integer literal")),
            ScalarKind::Float => parse_double(lexical()?)
                .map(Scalar::Float)
                .ok_or_else(|| fail("invalid float literal")),
            ScalarKind::Boolean => match lexical()?.trim() {
                "true" | "1" => Ok(Scalar::Boolean(true)),
                "false" | "0" => Ok(Scalar::Boolean(false)),
                _ => Err(fail("invalid boolean literal")),
            },
        }
    }
}

fn typed(lexical: String, datatype: oxrdf::NamedNode) -> RdfTerm {
    Literal::new_typed_literal(lexical, NamedNode::from(datatype)).into()
}

fn format_double(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "INF" } else { "-INF" }.to_string()
    } else {
        f.to_string()
    }
}

fn parse_double(s: &str) -> Option<f64> {
    match s.trim() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}
