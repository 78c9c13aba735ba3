//! Weighted undirected relationship graph between bidders
//!
//! Nodes are bidder IDs; edges accumulate evidence of a connection. Adding
//! an edge that already exists merges it: the weight becomes the max of old
//! and new, and the relation label is appended with its evidence.

pub mod clique;
pub mod community;

use std::collections::BTreeMap;

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engines::types::GraphEdgeRecord;

/// One relation label with the evidence that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RelationTag {
    pub relation_type: String,
    pub evidence: serde_json::Value,
}

/// Edge payload: merged weight plus relation labels in insertion order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EdgeData {
    pub weight: f64,
    pub relations: Vec<RelationTag>,
}

/// Compact adjacency view handed to the community and clique algorithms.
/// Node slots are ordered by bidder ID.
pub(crate) struct Adjacency {
    pub ids: Vec<String>,
    pub neighbors: Vec<BTreeMap<usize, f64>>,
}

pub struct RelationshipGraph {
    graph: UnGraph<String, EdgeData>,
    indices: BTreeMap<String, NodeIndex>,
}

impl Default for RelationshipGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            indices: BTreeMap::new(),
        }
    }

    /// Add a bidder node; repeated adds are no-ops
    pub fn add_bidder(&mut self, bidder_id: &str) -> NodeIndex {
        if let Some(index) = self.indices.get(bidder_id) {
            return *index;
        }
        let index = self.graph.add_node(bidder_id.to_string());
        self.indices.insert(bidder_id.to_string(), index);
        index
    }

    /// Add or merge a relationship edge between two bidders
    pub fn add_relationship(
        &mut self,
        bidder1: &str,
        bidder2: &str,
        relation_type: &str,
        weight: f64,
        evidence: serde_json::Value,
    ) {
        let a = self.add_bidder(bidder1);
        let b = self.add_bidder(bidder2);
        let tag = RelationTag {
            relation_type: relation_type.to_string(),
            evidence,
        };

        if let Some(edge) = self.graph.find_edge(a, b) {
            let data = &mut self.graph[edge];
            data.weight = data.weight.max(weight);
            data.relations.push(tag);
        } else {
            self.graph.add_edge(
                a,
                b,
                EdgeData {
                    weight,
                    relations: vec![tag],
                },
            );
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `2|E| / (|V| (|V|-1))`, 0 when one node or fewer
    pub fn density(&self) -> f64 {
        let n = self.graph.node_count();
        if n <= 1 {
            return 0.0;
        }
        2.0 * self.graph.edge_count() as f64 / (n as f64 * (n as f64 - 1.0))
    }

    /// Degree centrality per bidder: `degree / (|V| - 1)`
    pub fn degree_centrality(&self) -> BTreeMap<String, f64> {
        let n = self.graph.node_count();
        self.indices
            .iter()
            .map(|(id, index)| {
                let centrality = if n <= 1 {
                    0.0
                } else {
                    self.graph.neighbors(*index).count() as f64 / (n as f64 - 1.0)
                };
                (id.clone(), centrality)
            })
            .collect()
    }

    /// Edge list with merged weights, ordered by (source, target)
    pub fn edge_records(&self) -> Vec<GraphEdgeRecord> {
        let mut records: Vec<GraphEdgeRecord> = self
            .graph
            .edge_references()
            .map(|edge| {
                let mut source = self.graph[edge.source()].clone();
                let mut target = self.graph[edge.target()].clone();
                if source > target {
                    std::mem::swap(&mut source, &mut target);
                }
                GraphEdgeRecord {
                    source,
                    target,
                    weight: edge.weight().weight,
                    relations: edge
                        .weight()
                        .relations
                        .iter()
                        .map(|tag| tag.relation_type.clone())
                        .collect(),
                }
            })
            .collect();
        records.sort_by(|a, b| a.source.cmp(&b.source).then_with(|| a.target.cmp(&b.target)));
        records
    }

    /// Merged weight of the edge between two bidders, if connected
    pub fn edge_weight(&self, bidder1: &str, bidder2: &str) -> Option<f64> {
        let a = self.indices.get(bidder1)?;
        let b = self.indices.get(bidder2)?;
        let edge = self.graph.find_edge(*a, *b)?;
        Some(self.graph[edge].weight)
    }

    /// Relation labels of the edge between two bidders, in insertion order
    pub fn edge_relations(&self, bidder1: &str, bidder2: &str) -> Vec<String> {
        let (Some(a), Some(b)) = (self.indices.get(bidder1), self.indices.get(bidder2)) else {
            return Vec::new();
        };
        match self.graph.find_edge(*a, *b) {
            Some(edge) => self.graph[edge]
                .relations
                .iter()
                .map(|tag| tag.relation_type.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn adjacency(&self) -> Adjacency {
        let ids: Vec<String> = self.indices.keys().cloned().collect();
        let slot_of: BTreeMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(slot, id)| (id.as_str(), slot))
            .collect();

        let mut neighbors = vec![BTreeMap::new(); ids.len()];
        for edge in self.graph.edge_references() {
            let a = slot_of[self.graph[edge.source()].as_str()];
            let b = slot_of[self.graph[edge.target()].as_str()];
            let weight = edge.weight().weight;
            neighbors[a].insert(b, weight);
            neighbors[b].insert(a, weight);
        }

        Adjacency { ids, neighbors }
    }
}
