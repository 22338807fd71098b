//! Mapping configuration

use crate::rdf::NamespaceManager;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Session-wide mapping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// IRI that relative identity templates are joined onto
    pub base_iri: String,
    /// Prefixes added on top of the common ones
    pub prefixes: IndexMap<String, String>,
    /// Pick the most-derived subtype by `rdf:type` when reading nested objects
    pub dispatch_by_type: bool,
}

impl MappingConfig {
    pub fn new(base_iri: impl Into<String>) -> Self {
        Self {
            base_iri: base_iri.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), iri.into());
        self
    }

    pub fn with_dispatch_by_type(mut self, enabled: bool) -> Self {
        self.dispatch_by_type = enabled;
        self
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Common prefixes plus the configured ones
    pub fn namespaces(&self) -> NamespaceManager {
        let mut namespaces = NamespaceManager::new();
        namespaces.extend(self.prefixes.iter().map(|(p, iri)| (p.clone(), iri.clone())));
        namespaces
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            base_iri: "http://example.org/".to_string(),
            prefixes: IndexMap::new(),
            dispatch_by_type: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::Namespaces;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MappingConfig::default();
        assert_eq!(config.base_iri, "http://example.org/");
        assert!(config.dispatch_by_type);
        assert!(config.prefixes.is_empty());
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = MappingConfig::from_yaml_str(
            "base_iri: http://robots.example/\nprefixes:\n  spatial: http://example.org/spatial#\n",
        )
        .unwrap();
        assert_eq!(config.base_iri, "http://robots.example/");
        assert!(config.dispatch_by_type);

        let ns = config.namespaces();
        assert_eq!(ns.expand("spatial:x").unwrap(), "http://example.org/spatial#x");
        assert_eq!(
            ns.expand("rdf:type").unwrap(),
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#type"
        );
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_iri: urn:test:").unwrap();
        writeln!(file, "dispatch_by_type: false").unwrap();

        let config = MappingConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_iri, "urn:test:");
        assert!(!config.dispatch_by_type);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            MappingConfig::from_yaml_str("base_iri: [unclosed"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
