//! Node selection and volume association.

use std::collections::HashSet;

use regex::RegexBuilder;

use crate::client::types::{Node, Volume};
use crate::error::Result;

/// Node name predicate.
///
/// The CLI exposes the modes as mutually exclusive flags; when built
/// programmatically with several options set, [`NodeFilter::from_options`]
/// applies the priority names > pattern > contains > prefix.
#[derive(Debug, Clone)]
pub enum NodeFilter {
    /// Exact, case-sensitive name list.
    Names(Vec<String>),
    /// Case-insensitive regex search.
    Pattern(regex::Regex),
    /// Case-insensitive substring.
    Contains(String),
    /// Case-insensitive prefix. Default mode.
    Prefix(String),
}

/// Prefix assumed when no filter flag is given.
pub const DEFAULT_PREFIX: &str = "instance";

impl NodeFilter {
    /// Build a filter from optional CLI values.
    pub fn from_options(
        names: &[String],
        pattern: Option<&str>,
        contains: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<Self> {
        if !names.is_empty() {
            return Ok(NodeFilter::Names(names.to_vec()));
        }
        if let Some(pattern) = pattern {
            let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
            return Ok(NodeFilter::Pattern(re));
        }
        if let Some(contains) = contains {
            return Ok(NodeFilter::Contains(contains.to_string()));
        }
        Ok(NodeFilter::Prefix(
            prefix.unwrap_or(DEFAULT_PREFIX).to_string(),
        ))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NodeFilter::Names(names) => names.iter().any(|n| n == name),
            NodeFilter::Pattern(re) => re.is_match(name),
            NodeFilter::Contains(needle) => {
                name.to_lowercase().contains(&needle.to_lowercase())
            }
            NodeFilter::Prefix(prefix) => {
                name.to_lowercase().starts_with(&prefix.to_lowercase())
            }
        }
    }

    /// Select matching nodes, preserving input order.
    pub fn apply<'a>(&self, nodes: &'a [Node]) -> Vec<&'a Node> {
        nodes.iter().filter(|n| self.matches(&n.name)).collect()
    }

    /// Human-readable description for run output.
    pub fn describe(&self) -> String {
        match self {
            NodeFilter::Names(names) => format!("matching names: {}", names.join(", ")),
            NodeFilter::Pattern(re) => format!("matching pattern: '{}'", re.as_str()),
            NodeFilter::Contains(needle) => format!("containing: '{needle}'"),
            NodeFilter::Prefix(prefix) => format!("starting with: '{prefix}'"),
        }
    }
}

/// Volumes associated with a node.
///
/// Union of volumes whose name embeds `<node>::` and volumes whose node
/// reference names the node, deduplicated by volume name with input
/// order preserved.
pub fn volumes_for_node<'a>(volumes: &'a [Volume], node_name: &str) -> Vec<&'a Volume> {
    let needle = format!("{node_name}::");
    let mut seen: HashSet<&str> = HashSet::new();
    let mut matching = Vec::new();

    for volume in volumes {
        let by_name = volume.name.contains(&needle);
        let by_reference = volume
            .node
            .as_ref()
            .is_some_and(|node| node.name == node_name);

        if (by_name || by_reference) && seen.insert(volume.name.as_str()) {
            matching.push(volume);
        }
    }

    matching
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> Node {
        Node {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn volume(name: &str, node_name: Option<&str>) -> Volume {
        Volume {
            name: name.to_string(),
            node: node_name.map(|n| crate::client::types::NodeRef {
                name: n.to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_prefix_is_case_insensitive_and_order_preserving() {
        let nodes = vec![node("instance1"), node("INSTANCE2"), node("other")];
        let filter = NodeFilter::from_options(&[], None, None, Some("instance")).unwrap();

        let matched: Vec<&str> = filter
            .apply(&nodes)
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(matched, vec!["instance1", "INSTANCE2"]);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let filter = NodeFilter::from_options(&[], None, Some("BU-Test"), None).unwrap();
        assert!(filter.matches("prod-bu-test-01"));
        assert!(!filter.matches("prod-01"));
    }

    #[test]
    fn test_pattern_searches_case_insensitively() {
        let filter = NodeFilter::from_options(&[], Some("^bu-.*-01$"), None, None).unwrap();
        assert!(filter.matches("BU-test-01"));
        assert!(!filter.matches("bu-test-02"));
    }

    #[test]
    fn test_names_are_exact_and_case_sensitive() {
        let names = vec!["node-a".to_string()];
        let filter = NodeFilter::from_options(&names, None, None, None).unwrap();
        assert!(filter.matches("node-a"));
        assert!(!filter.matches("Node-A"));
        assert!(!filter.matches("node-a-1"));
    }

    #[test]
    fn test_priority_order() {
        let names = vec!["exact".to_string()];
        let filter =
            NodeFilter::from_options(&names, Some("pat"), Some("sub"), Some("pre")).unwrap();
        assert!(matches!(filter, NodeFilter::Names(_)));

        let filter = NodeFilter::from_options(&[], Some("pat"), Some("sub"), Some("pre")).unwrap();
        assert!(matches!(filter, NodeFilter::Pattern(_)));

        let filter = NodeFilter::from_options(&[], None, Some("sub"), Some("pre")).unwrap();
        assert!(matches!(filter, NodeFilter::Contains(_)));
    }

    #[test]
    fn test_default_prefix() {
        let filter = NodeFilter::from_options(&[], None, None, None).unwrap();
        match filter {
            NodeFilter::Prefix(prefix) => assert_eq!(prefix, DEFAULT_PREFIX),
            other => panic!("expected prefix filter, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(NodeFilter::from_options(&[], Some("("), None, None).is_err());
    }

    #[test]
    fn test_volumes_for_node_unions_and_dedupes() {
        let volumes = vec![
            // Matches by embedded name and by reference: must appear once.
            volume("AZ1:n1::/d", Some("n1")),
            // Matches by reference only (renamed out-of-band).
            volume("legacy-vol", Some("n1")),
            // Matches by embedded name only.
            volume("n1::/scratch", None),
            // Different node entirely.
            volume("n2::/d", Some("n2")),
        ];

        let matched: Vec<&str> = volumes_for_node(&volumes, "n1")
            .iter()
            .map(|v| v.name.as_str())
            .collect();
        assert_eq!(matched, vec!["AZ1:n1::/d", "legacy-vol", "n1::/scratch"]);
    }

    #[test]
    fn test_volumes_for_node_requires_separator() {
        // "n1" alone must not match "n10::/d".
        let volumes = vec![volume("n10::/d", None)];
        assert!(volumes_for_node(&volumes, "n1").is_empty());
    }
}
