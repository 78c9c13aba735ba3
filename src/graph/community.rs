//! Greedy modularity community detection (Clauset-Newman-Moore)
//!
//! Agglomerative: every node starts as its own community and the pair with
//! the largest modularity gain merges, until no merge improves modularity.
//! Weighted, with deterministic tie-breaking on community slot order, so the
//! same graph always yields the same partition.

use std::collections::BTreeMap;

use super::RelationshipGraph;

struct Community {
    members: Vec<usize>,
    /// Sum of edge weights fully inside the community
    internal: f64,
    /// Sum of weighted degrees of the members
    total_degree: f64,
}

/// All communities of the graph, each as a sorted list of bidder IDs.
/// Communities are ordered by size descending, then by first member.
pub fn greedy_modularity_communities(graph: &RelationshipGraph) -> Vec<Vec<String>> {
    let adjacency = graph.adjacency();
    let n = adjacency.ids.len();
    if n == 0 {
        return Vec::new();
    }

    let total_weight: f64 = adjacency
        .neighbors
        .iter()
        .map(|nbrs| nbrs.values().sum::<f64>())
        .sum::<f64>()
        / 2.0;

    let mut communities: Vec<Option<Community>> = adjacency
        .neighbors
        .iter()
        .enumerate()
        .map(|(slot, nbrs)| {
            Some(Community {
                members: vec![slot],
                internal: 0.0,
                total_degree: nbrs.values().sum(),
            })
        })
        .collect();

    // Weight between community slots, keyed (low, high)
    let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    for (a, nbrs) in adjacency.neighbors.iter().enumerate() {
        for (&b, &weight) in nbrs {
            if a < b {
                between.insert((a, b), weight);
            }
        }
    }

    if total_weight > 0.0 {
        loop {
            let mut best: Option<((usize, usize), f64)> = None;
            for (&(a, b), &weight) in &between {
                let (ca, cb) = match (&communities[a], &communities[b]) {
                    (Some(ca), Some(cb)) => (ca, cb),
                    _ => continue,
                };
                let gain = weight / total_weight
                    - (ca.total_degree * cb.total_degree) / (2.0 * total_weight * total_weight);
                let better = match best {
                    None => gain > 1e-12,
                    Some((_, best_gain)) => gain > best_gain + 1e-12,
                };
                if better {
                    best = Some(((a, b), gain));
                }
            }

            let Some(((a, b), _)) = best else { break };
            merge(&mut communities, &mut between, a, b);
        }
    }

    let mut result: Vec<Vec<String>> = communities
        .into_iter()
        .flatten()
        .map(|community| {
            let mut members: Vec<String> = community
                .members
                .into_iter()
                .map(|slot| adjacency.ids[slot].clone())
                .collect();
            members.sort();
            members
        })
        .collect();
    result.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    result
}

/// Merge community `b` into `a` and fold the pairwise weights over
fn merge(
    communities: &mut [Option<Community>],
    between: &mut BTreeMap<(usize, usize), f64>,
    a: usize,
    b: usize,
) {
    let bridge = between.remove(&key(a, b)).unwrap_or(0.0);
    let absorbed = communities[b].take();
    let (Some(target), Some(absorbed)) = (communities[a].as_mut(), absorbed) else {
        return;
    };

    target.members.extend(absorbed.members);
    target.internal += absorbed.internal + bridge;
    target.total_degree += absorbed.total_degree;

    // Re-route b's remaining connections to a
    let stale: Vec<(usize, usize)> = between
        .keys()
        .filter(|(x, y)| *x == b || *y == b)
        .copied()
        .collect();
    for old_key in stale {
        let weight = between.remove(&old_key).unwrap_or(0.0);
        let other = if old_key.0 == b { old_key.1 } else { old_key.0 };
        if other != a {
            *between.entry(key(a, other)).or_insert(0.0) += weight;
        }
    }
}

fn key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> RelationshipGraph {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("b1", "b2", "shared_email", 0.8, serde_json::json!({}));
        graph.add_relationship("b2", "b3", "shared_email", 0.8, serde_json::json!({}));
        graph.add_relationship("b1", "b3", "shared_email", 0.8, serde_json::json!({}));
        graph
    }

    #[test]
    fn test_triangle_collapses_into_one_community() {
        let communities = greedy_modularity_communities(&triangle());
        assert_eq!(communities, vec![vec!["b1", "b2", "b3"]]);
    }

    #[test]
    fn test_two_separate_clusters() {
        let mut graph = RelationshipGraph::new();
        graph.add_relationship("a1", "a2", "shared_email", 0.8, serde_json::json!({}));
        graph.add_relationship("a2", "a3", "shared_email", 0.8, serde_json::json!({}));
        graph.add_relationship("a1", "a3", "shared_email", 0.8, serde_json::json!({}));
        graph.add_relationship("z1", "z2", "shared_phone", 0.8, serde_json::json!({}));

        let communities = greedy_modularity_communities(&graph);
        assert!(communities.contains(&vec![
            "a1".to_string(),
            "a2".to_string(),
            "a3".to_string()
        ]));
        assert!(communities.contains(&vec!["z1".to_string(), "z2".to_string()]));
    }

    #[test]
    fn test_isolated_nodes_stay_singletons() {
        let mut graph = RelationshipGraph::new();
        graph.add_bidder("alone1");
        graph.add_bidder("alone2");

        let communities = greedy_modularity_communities(&graph);
        assert_eq!(communities.len(), 2);
        assert!(communities.iter().all(|c| c.len() == 1));
    }

    #[test]
    fn test_empty_graph() {
        let graph = RelationshipGraph::new();
        assert!(greedy_modularity_communities(&graph).is_empty());
    }

    #[test]
    fn test_deterministic_across_runs() {
        let first = greedy_modularity_communities(&triangle());
        let second = greedy_modularity_communities(&triangle());
        assert_eq!(first, second);
    }
}
