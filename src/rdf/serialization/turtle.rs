//! Turtle and N-Triples implementation over rio

use super::{ParseError, ParseResult, RdfFormat, SerializeError, SerializeResult};
use crate::rdf::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use rio_api::formatter::TriplesFormatter;
use rio_api::model;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesFormatter, NTriplesParser, TurtleFormatter, TurtleParser};
use std::io::BufRead;

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

pub(super) fn parse<R: BufRead>(reader: R, format: RdfFormat) -> ParseResult<Vec<Triple>> {
    let mut triples = Vec::new();
    let mut on_triple = |t: model::Triple<'_>| -> Result<(), ParseError> {
        triples.push(Triple::new(
            convert_subject(t.subject)?,
            convert_predicate(t.predicate)?,
            convert_object(t.object)?,
        ));
        Ok(())
    };

    match format {
        RdfFormat::Turtle => TurtleParser::new(reader, None).parse_all(&mut on_triple)?,
        RdfFormat::NTriples => NTriplesParser::new(reader).parse_all(&mut on_triple)?,
    }

    Ok(triples)
}

pub(super) fn serialize<'a, I>(triples: I, format: RdfFormat) -> SerializeResult<String>
where
    I: Iterator<Item = &'a Triple>,
{
    let output = match format {
        RdfFormat::Turtle => {
            let mut formatter = TurtleFormatter::new(Vec::new());
            for triple in triples {
                formatter.format(&to_rio(triple))?;
            }
            formatter.finish()?
        }
        RdfFormat::NTriples => {
            let mut formatter = NTriplesFormatter::new(Vec::new());
            for triple in triples {
                formatter.format(&to_rio(triple))?;
            }
            formatter.finish()?
        }
    };

    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

fn to_rio(triple: &Triple) -> model::Triple<'_> {
    let subject = match &triple.subject {
        RdfSubject::NamedNode(n) => model::Subject::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfSubject::BlankNode(b) => model::Subject::BlankNode(model::BlankNode { id: b.as_str() }),
    };

    let predicate = model::NamedNode {
        iri: triple.predicate.as_named_node().as_str(),
    };

    let object = match &triple.object {
        RdfObject::NamedNode(n) => model::Term::NamedNode(model::NamedNode { iri: n.as_str() }),
        RdfObject::BlankNode(b) => model::Term::BlankNode(model::BlankNode { id: b.as_str() }),
        RdfObject::Literal(l) => model::Term::Literal(literal_to_rio(l)),
    };

    model::Triple {
        subject,
        predicate,
        object,
    }
}

fn literal_to_rio(l: &Literal) -> model::Literal<'_> {
    if let Some(language) = l.language() {
        model::Literal::LanguageTaggedString {
            value: l.value(),
            language,
        }
    } else if l.datatype_iri() == XSD_STRING {
        model::Literal::Simple { value: l.value() }
    } else {
        model::Literal::Typed {
            value: l.value(),
            datatype: model::NamedNode {
                iri: l.datatype_iri(),
            },
        }
    }
}

fn convert_subject(s: model::Subject<'_>) -> Result<RdfSubject, ParseError> {
    match s {
        model::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        model::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(
            BlankNode::from_str(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        _ => Err(ParseError::Parse("Unsupported subject type".to_string())),
    }
}

fn convert_predicate(p: model::NamedNode<'_>) -> Result<RdfPredicate, ParseError> {
    RdfPredicate::new(p.iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn convert_object(o: model::Term<'_>) -> Result<RdfObject, ParseError> {
    match o {
        model::Term::NamedNode(n) => Ok(RdfObject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        model::Term::BlankNode(b) => Ok(RdfObject::BlankNode(
            BlankNode::from_str(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        model::Term::Literal(l) => match l {
            model::Literal::Simple { value } => {
                Ok(RdfObject::Literal(Literal::new_simple_literal(value)))
            }
            model::Literal::LanguageTaggedString { value, language } => Ok(RdfObject::Literal(
                Literal::new_language_tagged_literal(value, language)
                    .map_err(|e| ParseError::Parse(e.to_string()))?,
            )),
            model::Literal::Typed { value, datatype } => {
                let dt = NamedNode::new(datatype.iri)
                    .map_err(|e| ParseError::Parse(e.to_string()))?;
                Ok(RdfObject::Literal(Literal::new_typed_literal(value, dt)))
            }
        },
        _ => Err(ParseError::Parse("Unsupported object type".to_string())),
    }
}
