use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Pending,
    Accepted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
}

/// The unit of fan-out: a transient description of what changed in the
/// graph, published once per industry it touches. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDelta {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub industries: Vec<String>,
}

impl GraphDelta {
    fn pair_nodes(a: &str, b: &str) -> Vec<GraphNode> {
        vec![
            GraphNode {
                id: a.to_string(),
                kind: NodeKind::User,
            },
            GraphNode {
                id: b.to_string(),
                kind: NodeKind::User,
            },
        ]
    }

    pub fn linked(
        a: &str, b: &str, kind: LinkKind, industries: Vec<String>,
    ) -> Self {
        Self {
            nodes: Self::pair_nodes(a, b),
            links: vec![GraphLink {
                source: a.to_string(),
                target: b.to_string(),
                kind,
            }],
            industries,
        }
    }

    /// Empty-links delta: tells listeners to drop any edge they were
    /// optimistically showing between the pair.
    pub fn unlinked(a: &str, b: &str, industries: Vec<String>) -> Self {
        Self {
            nodes: Self::pair_nodes(a, b),
            links: Vec::new(),
            industries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_delta_wire_shape() {
        let delta = GraphDelta::linked("alice", "bob", LinkKind::Accepted, vec![
            "tech".to_string(),
        ]);

        let raw = serde_json::to_string(&delta).unwrap();
        assert!(raw.contains(r#""kind":"accepted""#));
        assert!(raw.contains(r#""source":"alice""#));
        assert!(raw.contains(r#""industries":["tech"]"#));
    }

    #[test]
    fn test_unlinked_delta_has_no_links() {
        let delta = GraphDelta::unlinked("alice", "bob", vec![]);

        assert_eq!(delta.nodes.len(), 2);
        assert!(delta.links.is_empty());
    }
}
