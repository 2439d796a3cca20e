//! JSON graph payload in the `{nodes, links}` shape used by the dashboards.

use serde::{Deserialize, Serialize};

use super::edge::EdgeSpec;
use super::model::{build_graph_with, BuildOptions, Graph};
use super::node::NodeSpec;
use crate::error::Result;

/// Node and edge specs as they arrive from the ingestion side.
///
/// ```json
/// {"nodes": [{"id": "A", "group": 5}], "links": [{"source": "A", "target": "B"}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    /// Node specs.
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    /// Edge specs. Also accepted under `edges`.
    #[serde(default, rename = "links", alias = "edges")]
    pub edges: Vec<EdgeSpec>,
}

impl GraphPayload {
    /// Decode a payload from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encode the payload as JSON text.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Validate and build the graph.
    pub fn into_graph(self, options: BuildOptions) -> Result<Graph> {
        build_graph_with(&self.nodes, &self.edges, options)
    }
}
