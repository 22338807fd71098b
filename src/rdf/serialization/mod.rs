//! RDF serialization formats
//!
//! Supports:
//! - Turtle (TTL)
//! - N-Triples (NT)

mod turtle;

use super::{RdfStore, Triple};
use thiserror::Error;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
}

impl RdfFormat {
    /// Pick a format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            _ => None,
        }
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<rio_turtle::TurtleError> for ParseError {
    fn from(e: rio_turtle::TurtleError) -> Self {
        ParseError::Parse(e.to_string())
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF data from a string
    pub fn parse(input: &str, format: RdfFormat) -> ParseResult<Vec<Triple>> {
        turtle::parse(input.as_bytes(), format)
    }

    /// Parse RDF data from a file
    pub fn parse_file(path: &std::path::Path, format: RdfFormat) -> ParseResult<Vec<Triple>> {
        let input = std::fs::read(path)?;
        turtle::parse(input.as_slice(), format)
    }

    /// Parse RDF data straight into a store
    pub fn load_into(input: &str, format: RdfFormat, store: &mut RdfStore) -> ParseResult<usize> {
        let mut added = 0;
        for triple in Self::parse(input, format)? {
            if store.insert(triple).is_ok() {
                added += 1;
            }
        }
        Ok(added)
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize triples to a string
    pub fn serialize(triples: &[Triple], format: RdfFormat) -> SerializeResult<String> {
        turtle::serialize(triples.iter(), format)
    }

    /// Serialize RDF store to a string, in insertion order
    pub fn serialize_store(store: &RdfStore, format: RdfFormat) -> SerializeResult<String> {
        turtle::serialize(store.iter(), format)
    }

    /// Serialize triples to a file
    pub fn serialize_file(
        triples: &[Triple],
        path: &std::path::Path,
        format: RdfFormat,
    ) -> SerializeResult<()> {
        let output = Self::serialize(triples, format)?;
        std::fs::write(path, output)?;
        Ok(())
    }
}
