//! Full path consistency via Floyd–Warshall.
//!
//! Computes the minimal (all-pairs path-consistent) network: every edge
//! weight is tightened to the shortest-path distance between its endpoints.
//! A temporal network is consistent exactly when its distance graph has no
//! negative cycles, i.e. when every node's shortest distance to itself
//! stays at zero.
//!
//! # Reference
//! Dechter, Meiri, Pearl (1991), "Temporal Constraint Networks", §3

use tracing::debug;

use crate::models::TemporalNetwork;

/// Tolerance for the zero-diagonal consistency check.
const CONSISTENCY_EPS: f64 = 1e-9;

/// Computes the minimal network, or `None` if the network is inconsistent.
///
/// The returned copy has every existing edge tightened to its shortest-path
/// distance; no edges are created.
pub fn minimal_network(network: &TemporalNetwork) -> Option<TemporalNetwork> {
    let ids: Vec<usize> = network.nodes().collect();
    let distances = shortest_path_matrix(network, &ids);

    if !is_consistent(&distances) {
        debug!("minimal network is inconsistent, negative cycle found");
        return None;
    }

    let mut minimal = network.clone();
    for (a, &i) in ids.iter().enumerate() {
        for (b, &j) in ids.iter().enumerate() {
            minimal.update_edge_weight(i, j, distances[a][b], false);
        }
    }
    Some(minimal)
}

/// Floyd–Warshall all-pairs shortest paths over the distance graph.
fn shortest_path_matrix(network: &TemporalNetwork, ids: &[usize]) -> Vec<Vec<f64>> {
    let n = ids.len();
    let mut dist = vec![vec![f64::INFINITY; n]; n];

    for (a, &i) in ids.iter().enumerate() {
        for (b, &j) in ids.iter().enumerate() {
            dist[a][b] = if a == b {
                0.0
            } else {
                network.get_edge_weight(i, j)
            };
        }
    }

    for k in 0..n {
        for a in 0..n {
            for b in 0..n {
                let through_k = dist[a][k] + dist[k][b];
                if through_k < dist[a][b] {
                    dist[a][b] = through_k;
                }
            }
        }
    }

    dist
}

/// A network is consistent when no node can reach itself negatively.
fn is_consistent(distances: &[Vec<f64>]) -> bool {
    distances
        .iter()
        .enumerate()
        .all(|(a, row)| row[a].abs() <= CONSISTENCY_EPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consistent_chain_is_tightened() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 0.0, 10.0);
        network.add_constraint(1, 2, 0.0, 10.0);
        network.add_constraint(0, 2, 0.0, 5.0);

        let minimal = minimal_network(&network).unwrap();

        // w(0, 1) tightens through the path 0 -> 2 -> 1
        assert_eq!(minimal.get_edge_weight(0, 1), 5.0);
        // Already-minimal edges are untouched
        assert_eq!(minimal.get_edge_weight(0, 2), 5.0);
    }

    #[test]
    fn test_no_edges_created() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 0.0, 10.0);
        network.add_constraint(1, 2, 0.0, 10.0);

        let minimal = minimal_network(&network).unwrap();

        // 0 -> 2 is reachable but had no edge, so none is added
        assert!(!minimal.has_edge(0, 2));
        assert_eq!(minimal.number_of_edges(), network.number_of_edges());
    }

    #[test]
    fn test_inconsistent_network_detected() {
        let mut network = TemporalNetwork::new();
        // Window [6, 5]: must happen after 6 but before 5
        network.add_constraint(0, 1, 6.0, 5.0);

        assert!(minimal_network(&network).is_none());
    }

    #[test]
    fn test_inconsistent_through_cycle() {
        let mut network = TemporalNetwork::new();
        // 1 precedes 2 by at least 4, but 2 must end within 3 of 1's window
        network.add_constraint(0, 1, 0.0, 10.0);
        network.add_constraint(0, 2, 0.0, 3.0);
        network.add_constraint(1, 2, 4.0, 10.0);

        assert!(minimal_network(&network).is_none());
    }

    #[test]
    fn test_infinite_bounds_are_harmless() {
        let mut network = TemporalNetwork::new();
        network.add_constraint(0, 1, 0.0, f64::INFINITY);
        network.add_constraint(1, 2, 2.0, 4.0);

        let minimal = minimal_network(&network).unwrap();
        assert!(minimal.get_edge_weight(0, 1).is_infinite());
    }
}
