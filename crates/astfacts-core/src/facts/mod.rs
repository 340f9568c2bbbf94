//! The fact model: the flattened, keyed records emitted for every syntax
//! node, grouping container and project/directory/file frame.
//!
//! # Components
//!
//! - [`Fact`] - One emitted record
//! - [`KeyManager`] - Hierarchical key allocation for one run
//! - [`KindNormalizer`] - Native kind to [`CommonKind`] lookup
//! - [`Emitter`] - Sink for the fact stream ([`JsonLinesEmitter`] writes NDJSON)
//! - [`replace_properties`] - Property rewrite hook (no rules yet)

mod deltas;
mod emitter;
mod keys;
mod kind;
mod property;

pub use deltas::{replace_properties, FactPropDelta};
pub use emitter::{Emitter, JsonLinesEmitter};
pub use keys::KeyManager;
pub use kind::{CommonKind, KindNormalizer};
pub use property::{make_common_properties, make_property, PropValue, Span, TypeNaming};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of the flattened tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fact {
    /// Coarse cross-language classification.
    pub common_kind: String,
    /// Native kind, namespace and orderability.
    pub kind: Kind,
    /// `<trunk>_<n>`, unique within a run.
    pub key: String,
    /// Key of the structural parent, empty for the project root.
    pub parent_key: String,
    /// Keys of the facts emitted earlier under the same parent, in order.
    pub older_siblings: Vec<String>,
    /// Typed properties, keyed by name.
    pub properties: BTreeMap<String, Property>,
}

impl Fact {
    /// Property value by name, if present.
    pub fn prop(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.value.as_str())
    }
}

/// `{kind, namespace, orderable}` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kind {
    pub kind: String,
    pub namespace: String,
    /// Sibling position under this fact's parent is meaningful.
    pub orderable: bool,
}

impl Kind {
    pub fn new(kind: impl Into<String>, namespace: impl Into<String>, orderable: bool) -> Self {
        Self {
            kind: kind.into(),
            namespace: namespace.into(),
            orderable,
        }
    }
}

/// A property value on the wire: its original type name and a string rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fact_wire_format() {
        let mut properties = BTreeMap::new();
        properties.insert(
            "name".to_string(),
            Property {
                type_name: "string".to_string(),
                value: "x".to_string(),
            },
        );
        let fact = Fact {
            common_kind: "unknown".to_string(),
            kind: Kind::new("ident", "ts", false),
            key: "5_4".to_string(),
            parent_key: "5_3".to_string(),
            older_siblings: vec!["5_2".to_string()],
            properties,
        };

        let json: serde_json::Value = serde_json::to_value(&fact).unwrap();
        assert_eq!(json["commonKind"], "unknown");
        assert_eq!(json["kind"]["kind"], "ident");
        assert_eq!(json["kind"]["namespace"], "ts");
        assert_eq!(json["kind"]["orderable"], false);
        assert_eq!(json["parentKey"], "5_3");
        assert_eq!(json["olderSiblings"][0], "5_2");
        assert_eq!(json["properties"]["name"]["type"], "string");
        assert_eq!(json["properties"]["name"]["value"], "x");
    }
}
