use crate::shortest_path::EdgeWeightedGraph;
use crate::{DistMatrix, RazorError, UndirectedGraph};
use num_traits::Float;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::Undirected;
use std::collections::BTreeMap;

/// The rich network representation handed to downstream consumers: a
/// petgraph stable graph whose node weights are matrix vertex indices and
/// whose edge weights are distances. Stable indices survive the removals
/// made by the pruning passes.
pub type NetworkGraph<T> = StableGraph<usize, T, Undirected>;

/// Builds a network from an `UndirectedGraph` and the matrix weighing its
/// edges. Node weights carry the originating matrix indices.
///
/// # Parameters
/// * `graph` - the topology
/// * `matrix` - the distances; every graph vertex must be a valid index
///
/// # Returns
/// * A result containing the network, or an error if the graph references a
///   vertex outside the matrix.
pub fn network_from_parts<T: Float>(
    graph: &UndirectedGraph,
    matrix: &DistMatrix<T>,
) -> Result<NetworkGraph<T>, RazorError> {
    if let Some(max) = graph.max_vertex() {
        if max >= matrix.size() {
            return Err(RazorError::WrongShape(format!(
                "graph vertex {max} is outside the matrix of size {}",
                matrix.size()
            )));
        }
    }
    let mut network: NetworkGraph<T> = StableGraph::default();
    let mut nodes: BTreeMap<usize, NodeIndex> = BTreeMap::new();
    for v in graph.vertices() {
        nodes.insert(v, network.add_node(v));
    }
    for (u, v) in graph.edges() {
        network.add_edge(nodes[&u], nodes[&v], matrix.get(u, v));
    }
    Ok(network)
}

impl<T: Float> EdgeWeightedGraph for NetworkGraph<T> {
    type Node = NodeIndex;
    type Edge = EdgeIndex;
    type Weight = T;

    fn incident_edges(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.edges(node).map(|edge| edge.id()).collect()
    }

    fn opposite(&self, node: NodeIndex, edge: EdgeIndex) -> NodeIndex {
        match self.edge_endpoints(edge) {
            Some((a, b)) if a == node => b,
            Some((a, _)) => a,
            None => node,
        }
    }

    fn weight(&self, edge: EdgeIndex) -> T {
        self.edge_weight(edge).copied().unwrap_or_else(T::infinity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortest_path::{all_shortest_paths, EdgeWeightedGraph};
    use std::collections::HashSet;

    fn tiny_network() -> NetworkGraph<f64> {
        let mut graph = UndirectedGraph::new();
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        let mut matrix = DistMatrix::zeros(3);
        matrix.set(0, 1, 1.5);
        matrix.set(1, 2, 2.5);
        network_from_parts(&graph, &matrix).unwrap()
    }

    #[test]
    fn nodes_carry_matrix_indices() {
        let network = tiny_network();
        assert_eq!(3, network.node_count());
        assert_eq!(2, network.edge_count());
        let indices: HashSet<usize> = network
            .node_indices()
            .map(|n| *network.node_weight(n).unwrap())
            .collect();
        assert_eq!(HashSet::from([0, 1, 2]), indices);
    }

    #[test]
    fn out_of_range_vertices_are_rejected() {
        let mut graph = UndirectedGraph::new();
        graph.add_edge(0, 5);
        let matrix: DistMatrix<f64> = DistMatrix::zeros(3);
        let result = network_from_parts(&graph, &matrix);
        assert!(matches!(result, Err(RazorError::WrongShape(_))));
    }

    #[test]
    fn shortest_paths_run_over_the_network_substrate() {
        let network = tiny_network();
        let nodes: HashSet<NodeIndex> = network.node_indices().collect();
        let edges: HashSet<EdgeIndex> = network.edge_indices().collect();
        let endpoints: Vec<NodeIndex> = network
            .node_indices()
            .filter(|&n| {
                let w = *network.node_weight(n).unwrap();
                w == 0 || w == 2
            })
            .collect();
        let results =
            all_shortest_paths(&network, &endpoints, &endpoints, &nodes, &edges).unwrap();
        let across = results
            .iter()
            .find(|((s, t), _)| s != t)
            .map(|(_, result)| result.distance)
            .unwrap();
        assert_eq!(4.0, across);
    }

    #[test]
    fn opposite_walks_an_edge() {
        let network = tiny_network();
        let edge = network.edge_indices().next().unwrap();
        let (a, b) = network.edge_endpoints(edge).unwrap();
        assert_eq!(b, network.opposite(a, edge));
        assert_eq!(a, network.opposite(b, edge));
    }
}
