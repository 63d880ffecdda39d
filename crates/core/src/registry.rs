//! Person attribute-type lookup

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A person attribute type defined by the host platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttributeType {
    pub name: String,
}

/// Host lookup from a person-attribute key to its defined type
pub trait AttributeTypeRegistry: Send + Sync {
    fn resolve(&self, key: &str) -> Option<AttributeType>;
}

/// Registry backed by a fixed set of attribute-type names.
///
/// Keys match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAttributeTypes {
    types: HashMap<String, AttributeType>,
}

impl InMemoryAttributeTypes {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types = names
            .into_iter()
            .map(Into::into)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .map(|name| (name.to_lowercase(), AttributeType { name }))
            .collect();
        Self { types }
    }
}

impl AttributeTypeRegistry for InMemoryAttributeTypes {
    fn resolve(&self, key: &str) -> Option<AttributeType> {
        self.types.get(&key.trim().to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = InMemoryAttributeTypes::new(["Telephone contact", " ", "Email address"]);
        assert!(registry.resolve(" ").is_none());
        assert!(registry.resolve("").is_none());
        assert_eq!(
            registry.resolve("telephone CONTACT").map(|t| t.name),
            Some("Telephone contact".to_string())
        );
        assert!(registry.resolve("Shoe size").is_none());
    }
}
