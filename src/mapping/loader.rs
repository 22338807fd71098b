//! Declarative schema documents
//!
//! A schema can be written by hand in YAML or JSON instead of being built
//! in code. Triples use the directive syntax (`$this`, `$that`,
//! `$that.element`, `_:label`, `prefix:local`, full IRIs):
//!
//! ```yaml
//! classes:
//!   Pose:
//!     identity:
//!       path: "poses/{id}"
//!     triples:
//!       - ["$this", "rdf:type", "spatial:SpatialRelationship"]
//!     members:
//!       - name: translation
//!         type: Translation
//!         path: "/transl"
//!         triples:
//!           - ["$this", "spatial:translation", "$that"]
//! ```

use super::error::{SchemaError, SchemaResult};
use super::path::PathRule;
use super::schema::{ClassMapping, Direction, Identity, MemberMapping, Schema, TriplePattern, ValueKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Top-level schema file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(default)]
    pub classes: IndexMap<String, ClassDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassDocument {
    #[serde(default)]
    pub bases: Vec<String>,
    #[serde(default)]
    pub identity: Option<IdentityDocument>,
    #[serde(default)]
    pub triples: Vec<TriplePattern>,
    #[serde(default)]
    pub members: Vec<MemberDocument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityDocument {
    UniqueId(String),
    Path(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub value: ValueKind,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub absolute_path: Option<String>,
    #[serde(default)]
    pub element_path: Option<String>,
    #[serde(default)]
    pub absolute_element_path: Option<String>,
    pub triples: Vec<TriplePattern>,
}

impl SchemaDocument {
    pub fn from_yaml_str(yaml: &str) -> SchemaResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a `.json` file as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        debug!("Loading schema document {}", path.display());
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Build and validate the schema
    pub fn into_schema(self) -> SchemaResult<Schema> {
        let mut schema = Schema::new();
        for (name, class) in self.classes {
            schema.insert(class.into_mapping(name)?)?;
        }
        schema.check()?;
        info!("Loaded schema with {} classes", schema.len());
        Ok(schema)
    }
}

impl ClassDocument {
    fn into_mapping(self, type_name: String) -> SchemaResult<ClassMapping> {
        let mut mapping = ClassMapping::new(type_name.as_str());
        for base in self.bases {
            mapping = mapping.base(base);
        }
        for triple in self.triples {
            mapping = mapping.class_triple(triple);
        }
        for member in self.members {
            mapping = mapping.member(member.into_mapping(&type_name)?);
        }
        let identity = match self.identity {
            Some(IdentityDocument::UniqueId(accessor)) => Identity::UniqueIdAccessor(accessor),
            Some(IdentityDocument::Path(template)) => Identity::PathTemplate(template.into()),
            None => Identity::Blank,
        };
        Ok(mapping.identity(identity))
    }
}

impl MemberDocument {
    fn into_mapping(self, class: &str) -> SchemaResult<MemberMapping> {
        let path = path_rule(class, &self.name, self.path, self.absolute_path)?;
        let element_path = path_rule(class, &self.name, self.element_path, self.absolute_element_path)?;

        let mut member = MemberMapping::from_triples(self.name, self.value, self.triples)
            .direction(self.direction);
        member.optional = self.optional;
        member.path = path;
        member.element_path = element_path;
        Ok(member)
    }
}

fn path_rule(
    class: &str,
    member: &str,
    relative: Option<String>,
    absolute: Option<String>,
) -> SchemaResult<Option<PathRule>> {
    match (relative, absolute) {
        (Some(_), Some(_)) => Err(SchemaError::InvalidMember {
            class: class.to_string(),
            member: member.to_string(),
            reason: "both a relative and an absolute path".to_string(),
        }),
        (Some(t), None) => Ok(Some(PathRule::relative(t))),
        (None, Some(t)) => Ok(Some(PathRule::absolute(t))),
        (None, None) => Ok(None),
    }
}

impl Schema {
    /// Parse a YAML schema document
    pub fn from_yaml_str(yaml: &str) -> SchemaResult<Self> {
        SchemaDocument::from_yaml_str(yaml)?.into_schema()
    }

    /// Load a YAML or JSON schema document
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        SchemaDocument::from_file(path)?.into_schema()
    }
}
