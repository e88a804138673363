use crate::graph::ordered_pair;
use crate::network::NetworkGraph;
use crate::shortest_path::{shortest_distance, EdgeWeightedGraph};
use crate::{DistMatrix, RazorError, UndirectedGraph};
use log::{debug, trace};
use num_traits::Float;
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::collections::{HashMap, HashSet};

/// The capabilities the neighbourhood pruner needs on top of shortest path
/// searches: telling labeled vertices apart, enumerating and removing edges,
/// and a total order on nodes for deterministic tie-breaking. The removal
/// policy is the substrate's own; the matrix-backed substrate just deletes
/// the edge, while the network-backed substrate also cascades a local
/// cleanup of the stranded endpoints.
pub trait PruneSubstrate: EdgeWeightedGraph {
    fn all_edges(&self) -> Vec<Self::Edge>;

    fn endpoints(&self, edge: Self::Edge) -> (Self::Node, Self::Node);

    fn is_labeled(&self, node: Self::Node) -> bool;

    fn neighbours(&self, node: Self::Node) -> Vec<Self::Node>;

    fn edge_between(&self, u: Self::Node, v: Self::Node) -> Option<Self::Edge>;

    fn contains_edge(&self, edge: Self::Edge) -> bool;

    fn remove_edge(&mut self, edge: Self::Edge);

    fn node_order(&self, node: Self::Node) -> usize;
}

/// Prunes provably redundant edges from a graph weighted by a distance
/// matrix. An edge qualifies for the test when both endpoints are unlabeled;
/// it is removed when every neighbour-to-neighbour route through it can be
/// rerouted through the local subgraph at no extra cost beyond the
/// tolerance. The input graph is not modified; the pruned copy is returned.
///
/// # Parameters
/// * `graph` - the topology to prune
/// * `matrix` - the distances weighing the edges; every graph vertex must be
///              a valid index
/// * `is_labeled` - the predicate marking untouchable vertices
/// * `tolerance` - the comparison tolerance
///
/// # Returns
/// * A result containing the pruned graph, or an error if the graph
///   references a vertex outside the matrix or an edge weighs NaN.
pub fn prune_redundant_edges<T, F>(
    graph: &UndirectedGraph,
    matrix: &DistMatrix<T>,
    is_labeled: F,
    tolerance: T,
) -> Result<UndirectedGraph, RazorError>
where
    T: Float,
    F: Fn(usize) -> bool,
{
    if let Some(max) = graph.max_vertex() {
        if max >= matrix.size() {
            return Err(RazorError::WrongShape(format!(
                "graph vertex {max} is outside the matrix of size {}",
                matrix.size()
            )));
        }
    }
    let mut substrate = MatrixSubstrate {
        graph: graph.clone(),
        matrix,
        is_labeled,
    };
    let removed = prune_substrate(&mut substrate, tolerance)?;
    debug!("neighbourhood pruning removed {removed} edge(s)");
    Ok(substrate.graph)
}

/// Prunes provably redundant edges from a petgraph-backed network in place,
/// with the same acceptance test as `prune_redundant_edges`. After each
/// removal the substrate cascades a local cleanup: an unlabeled endpoint
/// left with degree one is deleted with its remnant edge, and an unlabeled
/// endpoint left with degree two is spliced out, its two edges replaced by
/// one of summed weight (keeping the smaller weight if the direct edge
/// already exists). The labeled predicate receives node weights, i.e.
/// matrix vertex indices.
///
/// # Returns
/// * A result containing the number of edges removed by the redundancy
///   test itself, not counting cascade cleanups, or an error if an edge
///   weighs NaN.
pub fn prune_network<T, F>(
    network: &mut NetworkGraph<T>,
    is_labeled: F,
    tolerance: T,
) -> Result<usize, RazorError>
where
    T: Float,
    F: Fn(usize) -> bool,
{
    let mut substrate = NetworkSubstrate {
        graph: network,
        is_labeled,
    };
    let removed = prune_substrate(&mut substrate, tolerance)?;
    debug!("network pruning removed {removed} edge(s)");
    Ok(removed)
}

/// The shared pruning pass: candidate edges in descending weight order, each
/// re-examined against the current graph state, removed when the local
/// reroute test accepts it. NaN edge weights are rejected up front; the
/// descending sort needs a total order.
fn prune_substrate<S>(substrate: &mut S, tolerance: S::Weight) -> Result<usize, RazorError>
where
    S: PruneSubstrate,
    S::Weight: Float,
{
    let mut candidates = Vec::new();
    for edge in substrate.all_edges() {
        let (s, t) = substrate.endpoints(edge);
        let weight = substrate.weight(edge);
        if weight.is_nan() {
            return Err(RazorError::NonFiniteDistance(format!(
                "edge ({}, {}) weighs NaN",
                substrate.node_order(s),
                substrate.node_order(t)
            )));
        }
        if substrate.is_labeled(s) || substrate.is_labeled(t) {
            continue;
        }
        let key = ordered_pair(substrate.node_order(s), substrate.node_order(t));
        candidates.push((edge, weight, key));
    }
    candidates.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .expect("Invalid floats")
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut removed = 0;
    for (edge, _, _) in candidates {
        if !substrate.contains_edge(edge) {
            continue;
        }
        let (s, t) = substrate.endpoints(edge);
        // Splices may have rewritten what this index points at
        if substrate.is_labeled(s) || substrate.is_labeled(t) {
            continue;
        }
        if reroutes_locally(substrate, edge, s, t, tolerance)? {
            trace!(
                "removing redundant edge between vertices {} and {}",
                substrate.node_order(s),
                substrate.node_order(t)
            );
            substrate.remove_edge(edge);
            removed += 1;
        }
    }
    Ok(removed)
}

/// The acceptance test for one candidate edge `e = (s, t)`: every pair of a
/// neighbour of `s` and a neighbour of `t` must reach each other inside the
/// local subgraph, without `e`, at a cost no worse than the route through
/// `e` plus the tolerance.
fn reroutes_locally<S>(
    substrate: &S,
    edge: S::Edge,
    s: S::Node,
    t: S::Node,
    tolerance: S::Weight,
) -> Result<bool, RazorError>
where
    S: PruneSubstrate,
    S::Weight: Float,
{
    let weight_e = substrate.weight(edge);
    let nbrs_s: Vec<S::Node> = substrate
        .neighbours(s)
        .into_iter()
        .filter(|&n| n != t)
        .collect();
    let nbrs_t: Vec<S::Node> = substrate
        .neighbours(t)
        .into_iter()
        .filter(|&n| n != s)
        .collect();
    let mut neighbourhood: HashSet<S::Node> = nbrs_s.iter().copied().collect();
    neighbourhood.extend(nbrs_t.iter().copied());
    if neighbourhood.len() < 2 {
        return Ok(false);
    }

    // The local subgraph: the neighbourhood plus every vertex adjacent to at
    // least two distinct members of it. This re-admits s and t themselves
    // whenever they qualify.
    let mut adjacent_counts: HashMap<S::Node, usize> = HashMap::new();
    for &n in &neighbourhood {
        for v in substrate.neighbours(n) {
            if !neighbourhood.contains(&v) {
                *adjacent_counts.entry(v).or_insert(0) += 1;
            }
        }
    }
    let mut local: HashSet<S::Node> = neighbourhood.clone();
    local.extend(
        adjacent_counts
            .iter()
            .filter(|&(_, &count)| count >= 2)
            .map(|(&v, _)| v),
    );

    let mut allowed_edges: HashSet<S::Edge> = HashSet::new();
    for &v in &local {
        for e in substrate.incident_edges(v) {
            if e == edge {
                continue;
            }
            if local.contains(&substrate.opposite(v, e)) {
                allowed_edges.insert(e);
            }
        }
    }

    for &u in &nbrs_s {
        for &v in &nbrs_t {
            if u == v {
                continue;
            }
            let eu = match substrate.edge_between(u, s) {
                Some(e) => e,
                None => continue,
            };
            let ev = match substrate.edge_between(t, v) {
                Some(e) => e,
                None => continue,
            };
            let via = substrate.weight(eu) + weight_e + substrate.weight(ev);
            let alternate = shortest_distance(substrate, u, v, &local, &allowed_edges)?;
            if alternate > via + tolerance {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

struct MatrixSubstrate<'a, T, F> {
    graph: UndirectedGraph,
    matrix: &'a DistMatrix<T>,
    is_labeled: F,
}

impl<'a, T, F> EdgeWeightedGraph for MatrixSubstrate<'a, T, F>
where
    T: Float,
    F: Fn(usize) -> bool,
{
    type Node = usize;
    type Edge = (usize, usize);
    type Weight = T;

    fn incident_edges(&self, node: usize) -> Vec<(usize, usize)> {
        self.graph
            .neighbours(node)
            .map(|n| ordered_pair(node, n))
            .collect()
    }

    fn opposite(&self, node: usize, edge: (usize, usize)) -> usize {
        if edge.0 == node {
            edge.1
        } else {
            edge.0
        }
    }

    fn weight(&self, edge: (usize, usize)) -> T {
        self.matrix.get(edge.0, edge.1)
    }
}

impl<'a, T, F> PruneSubstrate for MatrixSubstrate<'a, T, F>
where
    T: Float,
    F: Fn(usize) -> bool,
{
    fn all_edges(&self) -> Vec<(usize, usize)> {
        self.graph.edges()
    }

    fn endpoints(&self, edge: (usize, usize)) -> (usize, usize) {
        edge
    }

    fn is_labeled(&self, node: usize) -> bool {
        (self.is_labeled)(node)
    }

    fn neighbours(&self, node: usize) -> Vec<usize> {
        self.graph.neighbours(node).collect()
    }

    fn edge_between(&self, u: usize, v: usize) -> Option<(usize, usize)> {
        if self.graph.has_edge(u, v) {
            Some(ordered_pair(u, v))
        } else {
            None
        }
    }

    fn contains_edge(&self, edge: (usize, usize)) -> bool {
        self.graph.has_edge(edge.0, edge.1)
    }

    fn remove_edge(&mut self, edge: (usize, usize)) {
        self.graph.remove_edge(edge.0, edge.1);
    }

    fn node_order(&self, node: usize) -> usize {
        node
    }
}

struct NetworkSubstrate<'a, T, F> {
    graph: &'a mut NetworkGraph<T>,
    is_labeled: F,
}

impl<'a, T, F> NetworkSubstrate<'a, T, F>
where
    T: Float,
    F: Fn(usize) -> bool,
{
    fn labeled_node(&self, node: NodeIndex) -> bool {
        self.graph
            .node_weight(node)
            .map(|&index| (self.is_labeled)(index))
            .unwrap_or(true)
    }

    /// Cleans up around a vertex an edge removal may have stranded, and
    /// keeps going while deletions and splices expose more work.
    fn cascade(&mut self, start: NodeIndex) {
        let mut queue = vec![start];
        while let Some(v) = queue.pop() {
            if !self.graph.contains_node(v) || self.labeled_node(v) {
                continue;
            }
            let nbrs: Vec<NodeIndex> = self.graph.neighbors(v).collect();
            match nbrs.len() {
                0 => {
                    self.graph.remove_node(v);
                }
                1 => {
                    self.graph.remove_node(v);
                    queue.push(nbrs[0]);
                }
                2 => {
                    let (a, b) = (nbrs[0], nbrs[1]);
                    let ea = match self.graph.find_edge(v, a) {
                        Some(e) => e,
                        None => continue,
                    };
                    let eb = match self.graph.find_edge(v, b) {
                        Some(e) => e,
                        None => continue,
                    };
                    let wa = match self.graph.edge_weight(ea) {
                        Some(&w) => w,
                        None => continue,
                    };
                    let wb = match self.graph.edge_weight(eb) {
                        Some(&w) => w,
                        None => continue,
                    };
                    self.graph.remove_node(v);
                    if a != b {
                        let spliced = wa + wb;
                        match self.graph.find_edge(a, b) {
                            Some(direct) => {
                                if let Some(current) = self.graph.edge_weight_mut(direct) {
                                    if spliced < *current {
                                        *current = spliced;
                                    }
                                }
                            }
                            None => {
                                self.graph.add_edge(a, b, spliced);
                            }
                        }
                    }
                    queue.push(a);
                    if b != a {
                        queue.push(b);
                    }
                }
                _ => {}
            }
        }
    }
}

impl<'a, T, F> EdgeWeightedGraph for NetworkSubstrate<'a, T, F>
where
    T: Float,
    F: Fn(usize) -> bool,
{
    type Node = NodeIndex;
    type Edge = EdgeIndex;
    type Weight = T;

    fn incident_edges(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        self.graph.incident_edges(node)
    }

    fn opposite(&self, node: NodeIndex, edge: EdgeIndex) -> NodeIndex {
        self.graph.opposite(node, edge)
    }

    fn weight(&self, edge: EdgeIndex) -> T {
        EdgeWeightedGraph::weight(&*self.graph, edge)
    }
}

impl<'a, T, F> PruneSubstrate for NetworkSubstrate<'a, T, F>
where
    T: Float,
    F: Fn(usize) -> bool,
{
    fn all_edges(&self) -> Vec<EdgeIndex> {
        self.graph.edge_indices().collect()
    }

    fn endpoints(&self, edge: EdgeIndex) -> (NodeIndex, NodeIndex) {
        self.graph
            .edge_endpoints(edge)
            .unwrap_or((NodeIndex::end(), NodeIndex::end()))
    }

    fn is_labeled(&self, node: NodeIndex) -> bool {
        self.labeled_node(node)
    }

    fn neighbours(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.graph.neighbors(node).collect()
    }

    fn edge_between(&self, u: NodeIndex, v: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(u, v)
    }

    fn contains_edge(&self, edge: EdgeIndex) -> bool {
        self.graph.edge_weight(edge).is_some()
    }

    fn remove_edge(&mut self, edge: EdgeIndex) {
        let endpoints = self.graph.edge_endpoints(edge);
        self.graph.remove_edge(edge);
        if let Some((a, b)) = endpoints {
            self.cascade(a);
            self.cascade(b);
        }
    }

    fn node_order(&self, node: NodeIndex) -> usize {
        node.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortest_path::MatrixWeighted;
    use petgraph::stable_graph::StableGraph;

    const TOL: f64 = 1e-12;

    /// A chain 0 - 1 - 2 - 3 with a parallel route 0 - 4 - 3. Vertices 1 and
    /// 2 are the only unlabeled ones, so (1, 2) is the only candidate edge.
    fn chain_with_detour(detour_leg: f64) -> (UndirectedGraph, DistMatrix<f64>) {
        let mut graph = UndirectedGraph::new();
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(0, 4);
        graph.add_edge(4, 3);
        let mut matrix = DistMatrix::zeros(5);
        matrix.set(0, 1, 1.0);
        matrix.set(1, 2, 2.0);
        matrix.set(2, 3, 1.0);
        matrix.set(0, 4, detour_leg);
        matrix.set(4, 3, 2.0);
        (graph, matrix)
    }

    fn labeled(v: usize) -> bool {
        v != 1 && v != 2
    }

    #[test]
    fn covered_edges_are_removed() {
        // Route through (1, 2) costs 1 + 2 + 1 = 4; the detour 0 - 4 - 3 also
        // costs 4, so the edge is redundant
        let (graph, matrix) = chain_with_detour(2.0);
        let pruned = prune_redundant_edges(&graph, &matrix, labeled, TOL).unwrap();
        assert!(!pruned.has_edge(1, 2));
        assert!(pruned.has_edge(0, 1));
        assert!(pruned.has_edge(2, 3));
        assert!(pruned.has_edge(0, 4));
    }

    #[test]
    fn uncovered_edges_stay() {
        // Now the detour costs 5 + 2 = 7 > 4
        let (graph, matrix) = chain_with_detour(5.0);
        let pruned = prune_redundant_edges(&graph, &matrix, labeled, TOL).unwrap();
        assert!(pruned.has_edge(1, 2));
        assert_eq!(graph.edges(), pruned.edges());
    }

    #[test]
    fn labeled_endpoints_are_never_candidates() {
        let (graph, matrix) = chain_with_detour(2.0);
        let pruned =
            prune_redundant_edges(&graph, &matrix, |_| true, TOL).unwrap();
        assert_eq!(graph.edges(), pruned.edges());
    }

    #[test]
    fn labeled_pair_distances_are_preserved() {
        let (graph, matrix) = chain_with_detour(2.0);
        let pruned = prune_redundant_edges(&graph, &matrix, labeled, TOL).unwrap();

        let before = MatrixWeighted::new(&graph, &matrix);
        let after = MatrixWeighted::new(&pruned, &matrix);
        let nodes_before = graph.vertices().collect();
        let edges_before = graph.edges().into_iter().collect();
        let nodes_after = pruned.vertices().collect();
        let edges_after = pruned.edges().into_iter().collect();
        for &s in &[0, 3, 4] {
            for &t in &[0, 3, 4] {
                let d_before =
                    shortest_distance(&before, s, t, &nodes_before, &edges_before).unwrap();
                let d_after =
                    shortest_distance(&after, s, t, &nodes_after, &edges_after).unwrap();
                assert!((d_before - d_after).abs() <= TOL);
            }
        }
    }

    #[test]
    fn nan_weighted_edges_are_rejected() {
        let mut graph = UndirectedGraph::new();
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        let mut matrix = DistMatrix::zeros(3);
        matrix.set(0, 1, f64::NAN);
        matrix.set(1, 2, 1.0);
        let result = prune_redundant_edges(&graph, &matrix, |_| false, TOL);
        assert!(matches!(result, Err(RazorError::NonFiniteDistance(_))));
    }

    fn network_fixture() -> NetworkGraph<f64> {
        // Same shape as chain_with_detour(1.0) plus a pendant route 2 - 5,
        // with weights chosen so (1, 2) reroutes everywhere
        let mut network: NetworkGraph<f64> = StableGraph::default();
        let nodes: Vec<NodeIndex> = (0..6).map(|v| network.add_node(v)).collect();
        network.add_edge(nodes[0], nodes[1], 1.0);
        network.add_edge(nodes[1], nodes[2], 2.0);
        network.add_edge(nodes[2], nodes[3], 1.0);
        network.add_edge(nodes[0], nodes[4], 1.0);
        network.add_edge(nodes[4], nodes[3], 1.0);
        network.add_edge(nodes[2], nodes[5], 1.0);
        network
    }

    fn node_of(network: &NetworkGraph<f64>, index: usize) -> Option<NodeIndex> {
        network
            .node_indices()
            .find(|&n| network.node_weight(n) == Some(&index))
    }

    #[test]
    fn network_pruning_cascades_deletions_and_splices() {
        let mut network = network_fixture();
        let removed =
            prune_network(&mut network, |v| v != 1 && v != 2, TOL).unwrap();
        assert_eq!(1, removed);
        // Vertex 1 was left dangling and deleted; vertex 2 was left with
        // degree two and spliced into a direct 3 - 5 edge of summed weight
        assert!(node_of(&network, 1).is_none());
        assert!(node_of(&network, 2).is_none());
        let n3 = node_of(&network, 3).unwrap();
        let n5 = node_of(&network, 5).unwrap();
        let spliced = network.find_edge(n3, n5).unwrap();
        assert_eq!(Some(&2.0), network.edge_weight(spliced));
        assert_eq!(4, network.node_count());
        assert_eq!(3, network.edge_count());
    }

    #[test]
    fn network_pruning_leaves_covered_structure_alone_when_labeled() {
        let mut network = network_fixture();
        let removed = prune_network(&mut network, |_| true, TOL).unwrap();
        assert_eq!(0, removed);
        assert_eq!(6, network.node_count());
        assert_eq!(6, network.edge_count());
    }
}
