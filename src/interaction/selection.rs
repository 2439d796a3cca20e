//! Selection state: what the user has focused, and what that highlights.

use serde::{Deserialize, Serialize};

use crate::graph::{Graph, NodeId};

/// The current focus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Selection {
    /// Nothing selected; every node and edge is neutral.
    #[default]
    None,
    /// A node, which also lights up the rest of its cluster.
    Node(String),
    /// A whole cluster.
    Cluster(u32),
}

impl Selection {
    /// The cluster this selection highlights in `graph`, if any.
    pub fn cluster(&self, graph: &Graph) -> Option<u32> {
        match self {
            Selection::None => None,
            Selection::Node(key) => graph.node_id(key).and_then(|id| graph.cluster(id)),
            Selection::Cluster(cluster) => Some(*cluster),
        }
    }

    /// Whether `id` is highlighted under this selection.
    pub fn highlights(&self, graph: &Graph, id: NodeId) -> bool {
        match self {
            Selection::None => false,
            Selection::Node(key) => {
                graph.key(id) == Some(key.as_str())
                    || self
                        .cluster(graph)
                        .is_some_and(|cluster| graph.cluster(id) == Some(cluster))
            }
            Selection::Cluster(cluster) => graph.cluster(id) == Some(*cluster),
        }
    }

    /// Check if nothing is selected.
    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build_graph, NodeSpec};

    fn graph() -> Graph {
        build_graph(
            &[
                NodeSpec::new("a").with_cluster(1),
                NodeSpec::new("b").with_cluster(1),
                NodeSpec::new("c").with_cluster(2),
            ],
            &[],
        )
        .unwrap()
    }

    #[test]
    fn test_node_selection_covers_cluster() {
        let graph = graph();
        let selection = Selection::Node("a".into());
        let lit: Vec<_> = graph
            .node_ids()
            .map(|id| selection.highlights(&graph, id))
            .collect();
        assert_eq!(lit, vec![true, true, false]);
        assert_eq!(selection.cluster(&graph), Some(1));
    }

    #[test]
    fn test_cluster_and_none() {
        let graph = graph();
        let c = graph.node_id("c").unwrap();
        assert!(Selection::Cluster(2).highlights(&graph, c));
        assert!(!Selection::None.highlights(&graph, c));
        assert!(Selection::default().is_none());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Selection::Cluster(3)).unwrap();
        assert_eq!(json, r#"{"kind":"cluster","value":3}"#);
        let none: Selection = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(none, Selection::None);
    }
}
