//! Mapping errors

use crate::rdf::{PrefixError, RdfError, RdfStoreError};
use thiserror::Error;

/// A matched node that could not be turned into the requested value type
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot decode {node} as {target}: {reason}")]
pub struct DecodeError {
    /// The offending node, in N-Triples notation
    pub node: String,
    /// Name of the target value type
    pub target: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(node: impl ToString, target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            node: node.to_string(),
            target: target.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a schema from declarations
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Unrecognised triple term
    #[error("Unknown node reference: {0:?}")]
    UnknownNodeRef(String),

    /// `$that` or an element reference used outside a member
    #[error("Class-level triple of {class} cannot refer to {reference}")]
    MemberRefInClassTriple { class: String, reference: String },

    /// Declared member kind doesn't fit its triples
    #[error("Member {class}.{member}: {reason}")]
    InvalidMember {
        class: String,
        member: String,
        reason: String,
    },

    /// Base type that was never declared
    #[error("Class {class} extends unknown class {base}")]
    UnknownBase { class: String, base: String },

    /// Class that is its own ancestor
    #[error("Class {class} is its own base")]
    CyclicBase { class: String },

    /// A class listed twice
    #[error("Duplicate class mapping: {0}")]
    DuplicateClass(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised by the graph writer, graph reader and path resolver
#[derive(Error, Debug)]
pub enum MappingError {
    /// No class mapping for a runtime type
    #[error("Unmapped type: {0}")]
    UnmappedType(String),

    /// Path template placeholder names no accessor
    #[error("Unresolved placeholder {{{placeholder}}} in path template {template:?}")]
    UnresolvedPlaceholder { template: String, placeholder: String },

    /// A required triple had no match during read
    #[error("No statement matches {pattern} (class {class}, member {member})")]
    PatternNotFound {
        class: String,
        member: String,
        pattern: String,
    },

    /// Matched node could not be converted to the member's type
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Nested read reached a subject already being read as the same type
    #[error("Cyclic graph: {node} is already being read as {type_name}")]
    CyclicGraph { type_name: String, node: String },

    /// Schema names a member the instance doesn't expose
    #[error("Type {type_name} has no member {member}")]
    UnknownMember { type_name: String, member: String },

    /// Pattern that can't be evaluated in the current position
    #[error("Invalid pattern in {class}: {reason}")]
    InvalidPattern { class: String, reason: String },

    /// Schema rejected when the mapping context was built
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Namespace expansion failure
    #[error(transparent)]
    Prefix(#[from] PrefixError),

    /// Node construction failure
    #[error(transparent)]
    Rdf(#[from] RdfError),

    /// Store failure
    #[error(transparent)]
    Store(#[from] RdfStoreError),
}

pub type MappingResult<T> = Result<T, MappingError>;

impl MappingError {
    /// True for a missing required triple
    pub fn is_pattern_not_found(&self) -> bool {
        matches!(self, MappingError::PatternNotFound { .. })
    }
}
