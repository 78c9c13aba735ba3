//! Relationship-network analysis
//!
//! Builds the weighted bidder graph out of cross-bidder document similarity
//! and shared contact fields, then mines it for communities, cliques and
//! centrality. Groups of connected bidders surface as high-risk groups.

use std::collections::BTreeMap;

use crate::engines::types::{
    GroupKind, HighRiskGroup, NetworkAnalysis, SimilarityAnalysis,
};
use crate::graph::{clique, community, RelationshipGraph};
use crate::model::{Bidder, ContactField, RiskSignal, Severity, SignalType};

/// Weight assigned to a shared contact field edge
const SHARED_CONTACT_WEIGHT: f64 = 0.80;

pub struct RelationshipEngine {
    min_clique_size: usize,
}

impl RelationshipEngine {
    pub fn new(min_clique_size: usize) -> Self {
        Self { min_clique_size }
    }

    /// Build and analyze the bidder network
    pub fn analyze(
        &self,
        bidders: &[Bidder],
        similarity: Option<&SimilarityAnalysis>,
    ) -> NetworkAnalysis {
        let graph = self.build_graph(bidders, similarity);

        let all_communities = community::greedy_modularity_communities(&graph);
        let communities: Vec<Vec<String>> = all_communities
            .into_iter()
            .filter(|c| c.len() >= 2)
            .collect();
        let cliques = clique::maximal_cliques(&graph, self.min_clique_size);

        let high_risk_groups = collect_high_risk_groups(&cliques, &communities);

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            communities = communities.len(),
            cliques = cliques.len(),
            high_risk_groups = high_risk_groups.len(),
            "relationship network analysis complete"
        );

        NetworkAnalysis {
            num_bidders: graph.node_count(),
            num_relationships: graph.edge_count(),
            network_density: graph.density(),
            communities,
            cliques,
            centrality: graph.degree_centrality(),
            high_risk_groups,
            edges: graph.edge_records(),
        }
    }

    /// One `relationship_network` signal per high-risk group
    pub fn signals(&self, analysis: &NetworkAnalysis) -> Vec<RiskSignal> {
        analysis
            .high_risk_groups
            .iter()
            .map(|group| {
                let severity = if group.size >= 4 {
                    Severity::High
                } else {
                    Severity::Medium
                };
                let score = if analysis.num_bidders == 0 {
                    0.0
                } else {
                    f64::min(group.size as f64 / analysis.num_bidders as f64, 1.0)
                };
                RiskSignal::new(
                    SignalType::RelationshipNetwork,
                    severity,
                    score,
                    format!(
                        "Detected {} of {} connected bidders",
                        group.kind.as_str(),
                        group.size
                    ),
                    serde_json::to_value(group).unwrap_or(serde_json::Value::Null),
                    group.bidders.clone(),
                )
            })
            .collect()
    }

    fn build_graph(
        &self,
        bidders: &[Bidder],
        similarity: Option<&SimilarityAnalysis>,
    ) -> RelationshipGraph {
        let mut graph = RelationshipGraph::new();
        for bidder in bidders {
            graph.add_bidder(&bidder.bidder_id);
        }

        if let Some(similarity) = similarity {
            for pair in &similarity.cross_bidder_similarities {
                graph.add_relationship(
                    &pair.bidder1,
                    &pair.bidder2,
                    "document_similarity",
                    pair.similarity,
                    serde_json::json!({ "similarity_score": pair.similarity }),
                );
            }
        }

        for field in ContactField::ALL {
            let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
            for bidder in bidders {
                let Some(contact) = &bidder.contact else {
                    continue;
                };
                if let Some(value) = contact.normalized(field) {
                    groups.entry(value).or_default().push(bidder.bidder_id.as_str());
                }
            }

            for (value, members) in groups {
                if members.len() < 2 {
                    continue;
                }
                let relation_type = format!("shared_{}", field.as_str());
                for i in 0..members.len() {
                    for j in (i + 1)..members.len() {
                        graph.add_relationship(
                            members[i],
                            members[j],
                            &relation_type,
                            SHARED_CONTACT_WEIGHT,
                            serde_json::json!({ field.as_str(): value }),
                        );
                    }
                }
            }
        }

        graph
    }
}

/// Cliques first, then communities whose member set no clique already covers
fn collect_high_risk_groups(
    cliques: &[Vec<String>],
    communities: &[Vec<String>],
) -> Vec<HighRiskGroup> {
    let mut groups: Vec<HighRiskGroup> = cliques
        .iter()
        .map(|members| HighRiskGroup {
            bidders: members.clone(),
            size: members.len(),
            kind: GroupKind::Clique,
        })
        .collect();

    for members in communities {
        if members.len() < 3 {
            continue;
        }
        let duplicate = cliques.iter().any(|clique| clique == members);
        if !duplicate {
            groups.push(HighRiskGroup {
                bidders: members.clone(),
                size: members.len(),
                kind: GroupKind::Community,
            });
        }
    }

    groups
}
