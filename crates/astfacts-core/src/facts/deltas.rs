//! Property rewrite hook invoked by the query engine.
//!
//! A rule, keyed by fact name, inspects the fact's properties and answers
//! with deltas. No language defines rules yet, so every call answers with
//! an empty list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One property change requested by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactPropDelta {
    pub action: String,
    pub arg: String,
    pub prop: String,
}

type Rule = fn(&BTreeMap<&str, &str>) -> Vec<FactPropDelta>;

const RULES: &[(&str, Rule)] = &[];

/// Answer the deltas for `fact` given alternating name/value `properties`.
///
/// A trailing name without a value is ignored.
pub fn replace_properties(fact: &str, properties: &[String]) -> Vec<FactPropDelta> {
    let mut props = BTreeMap::new();
    let mut pairs = properties.chunks_exact(2);
    for pair in &mut pairs {
        props.insert(pair[0].as_str(), pair[1].as_str());
    }
    if let [dangling] = pairs.remainder() {
        debug!(fact, property = %dangling, "Ignoring property without a value");
    }

    RULES
        .iter()
        .find(|(name, _)| *name == fact)
        .map(|(_, rule)| rule(&props))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rules_means_no_deltas() {
        let props = vec!["name".to_string(), "x".to_string()];
        assert!(replace_properties("ts.ident", &props).is_empty());
        assert!(replace_properties("", &[]).is_empty());
    }

    #[test]
    fn test_odd_property_list_is_tolerated() {
        let props = vec!["name".to_string(), "x".to_string(), "dangling".to_string()];
        assert!(replace_properties("csharp.IdentifierName", &props).is_empty());
    }

    #[test]
    fn test_delta_wire_format() {
        let delta = FactPropDelta {
            action: "set".to_string(),
            arg: "y".to_string(),
            prop: "name".to_string(),
        };
        let json = serde_json::to_string(&vec![delta]).unwrap();
        assert_eq!(json, r#"[{"action":"set","arg":"y","prop":"name"}]"#);
    }
}
