//! Maximal clique enumeration (Bron-Kerbosch with pivoting)
//!
//! Edge weights are ignored; any edge counts as adjacency. Candidate sets
//! are ordered, so enumeration order is deterministic for a given graph.

use std::collections::BTreeSet;

use super::RelationshipGraph;

/// All maximal cliques with at least `min_size` members, each as a sorted
/// list of bidder IDs. Cliques are ordered by size descending, then
/// lexicographically.
pub fn maximal_cliques(graph: &RelationshipGraph, min_size: usize) -> Vec<Vec<String>> {
    let adjacency = graph.adjacency();
    let neighbor_sets: Vec<BTreeSet<usize>> = adjacency
        .neighbors
        .iter()
        .map(|nbrs| nbrs.keys().copied().collect())
        .collect();

    let mut cliques = Vec::new();
    let mut r = Vec::new();
    let p: BTreeSet<usize> = (0..neighbor_sets.len()).collect();
    let x = BTreeSet::new();
    expand(&neighbor_sets, &mut r, p, x, &mut cliques);

    let mut result: Vec<Vec<String>> = cliques
        .into_iter()
        .filter(|clique| clique.len() >= min_size)
        .map(|clique| {
            let mut members: Vec<String> = clique
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

fn expand(
    neighbors: &[BTreeSet<usize>],
    r: &mut Vec<usize>,
    mut p: BTreeSet<usize>,
    mut x: BTreeSet<usize>,
    cliques: &mut Vec<Vec<usize>>,
) {
    if p.is_empty() && x.is_empty() {
        cliques.push(r.clone());
        return;
    }

    // Pivot on the candidate with the most neighbors in P
    let pivot = p
        .iter()
        .chain(x.iter())
        .copied()
        .max_by_key(|u| (p.intersection(&neighbors[*u]).count(), usize::MAX - *u));

    let candidates: Vec<usize> = match pivot {
        Some(u) => p.difference(&neighbors[u]).copied().collect(),
        None => p.iter().copied().collect(),
    };

    for v in candidates {
        r.push(v);
        let p_next: BTreeSet<usize> = p.intersection(&neighbors[v]).copied().collect();
        let x_next: BTreeSet<usize> = x.intersection(&neighbors[v]).copied().collect();
        expand(neighbors, r, p_next, x_next, cliques);
        r.pop();
        p.remove(&v);
        x.insert(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(graph: &mut RelationshipGraph, a: &str, b: &str) {
        graph.add_relationship(a, b, "shared_email", 0.8, serde_json::json!({}));
    }

    #[test]
    fn test_triangle_is_one_clique() {
        let mut graph = RelationshipGraph::new();
        edge(&mut graph, "b1", "b2");
        edge(&mut graph, "b2", "b3");
        edge(&mut graph, "b1", "b3");

        let cliques = maximal_cliques(&graph, 3);
        assert_eq!(cliques, vec![vec!["b1", "b2", "b3"]]);
    }

    #[test]
    fn test_min_size_filters_pairs() {
        let mut graph = RelationshipGraph::new();
        edge(&mut graph, "b1", "b2");
        assert!(maximal_cliques(&graph, 3).is_empty());
        assert_eq!(maximal_cliques(&graph, 2), vec![vec!["b1", "b2"]]);
    }

    #[test]
    fn test_two_triangles_sharing_a_node() {
        let mut graph = RelationshipGraph::new();
        edge(&mut graph, "a", "b");
        edge(&mut graph, "b", "c");
        edge(&mut graph, "a", "c");
        edge(&mut graph, "c", "d");
        edge(&mut graph, "d", "e");
        edge(&mut graph, "c", "e");

        let cliques = maximal_cliques(&graph, 3);
        assert_eq!(cliques.len(), 2);
        assert!(cliques.contains(&vec!["a".to_string(), "b".to_string(), "c".to_string()]));
        assert!(cliques.contains(&vec!["c".to_string(), "d".to_string(), "e".to_string()]));
    }

    #[test]
    fn test_four_clique_is_maximal_not_its_triangles() {
        let mut graph = RelationshipGraph::new();
        let ids = ["a", "b", "c", "d"];
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                edge(&mut graph, ids[i], ids[j]);
            }
        }

        let cliques = maximal_cliques(&graph, 3);
        assert_eq!(cliques, vec![vec!["a", "b", "c", "d"]]);
    }

    #[test]
    fn test_empty_graph_has_no_cliques() {
        let graph = RelationshipGraph::new();
        assert!(maximal_cliques(&graph, 3).is_empty());
    }
}
