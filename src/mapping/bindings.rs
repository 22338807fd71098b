//! Binding environment
//!
//! Maps blank pattern variables to concrete nodes for the duration of one
//! write or read of a mapped object. Never persisted, never shared between
//! calls.

use crate::rdf::RdfTerm;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    blanks: HashMap<String, RdfTerm>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<&RdfTerm> {
        self.blanks.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.blanks.contains_key(label)
    }

    /// Bind `label`, keeping an existing binding
    pub fn bind(&mut self, label: &str, node: RdfTerm) -> &RdfTerm {
        self.blanks.entry(label.to_string()).or_insert(node)
    }

    pub fn len(&self) -> usize {
        self.blanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blanks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::BlankNode;

    #[test]
    fn test_first_binding_wins() {
        let mut env = Bindings::new();
        let a = RdfTerm::BlankNode(BlankNode::new());
        let b = RdfTerm::BlankNode(BlankNode::new());

        assert_eq!(env.bind("1", a.clone()), &a);
        assert_eq!(env.bind("1", b), &a);
        assert_eq!(env.get("1"), Some(&a));
        assert!(env.contains("1"));
        assert!(!env.contains("2"));
        assert_eq!(env.len(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut env = Bindings::new();
        env.bind("outer", RdfTerm::BlankNode(BlankNode::new()));

        let mut scoped = env.clone();
        scoped.bind("inner", RdfTerm::BlankNode(BlankNode::new()));

        assert!(scoped.contains("outer"));
        assert!(!env.contains("inner"));
    }
}
