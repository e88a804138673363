use crate::graph::ordered_pair;
use crate::{DistMatrix, RazorError, UndirectedGraph};
use num_traits::{Float, PrimInt, Zero};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::ops::Add;

/// The capabilities a graph substrate must expose for shortest path
/// computations: enumerating the edges incident to a node, finding the other
/// endpoint of an edge, and weighing an edge. Implementations exist for an
/// `UndirectedGraph` weighted by a distance matrix, for an `UndirectedGraph`
/// weighted by an explicit overlay map, and for the petgraph-backed network
/// type, so the same search routines run over all of them.
pub trait EdgeWeightedGraph {
    type Node: Copy + Eq + Hash + Ord;
    type Edge: Copy + Eq + Hash;
    type Weight: Copy + PartialOrd + Zero + Add<Output = Self::Weight>;

    fn incident_edges(&self, node: Self::Node) -> Vec<Self::Edge>;

    /// The endpoint of `edge` other than `node`. Only defined for edges
    /// incident to `node`.
    fn opposite(&self, node: Self::Node, edge: Self::Edge) -> Self::Node;

    fn weight(&self, edge: Self::Edge) -> Self::Weight;
}

/// The outcome of a single shortest path query. An unreachable target has an
/// infinite distance and no path; a target equal to its source has distance
/// zero and an empty path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult<E, W> {
    pub distance: W,
    pub edges: Option<Vec<E>>,
}

/// An `UndirectedGraph` whose edge `(u, v)` weighs the matrix entry
/// `D[u][v]`.
#[derive(Debug, Clone)]
pub struct MatrixWeighted<'a, T> {
    graph: &'a UndirectedGraph,
    matrix: &'a DistMatrix<T>,
}

impl<'a, T: Float> MatrixWeighted<'a, T> {
    pub fn new(graph: &'a UndirectedGraph, matrix: &'a DistMatrix<T>) -> Self {
        Self { graph, matrix }
    }
}

impl<'a, T: Float> EdgeWeightedGraph for MatrixWeighted<'a, T> {
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

/// An `UndirectedGraph` weighted by an explicit map from canonical edge
/// pairs to weights. Every edge of the graph must have an entry in the map.
#[derive(Debug, Clone)]
pub struct OverlayWeighted<'a, W> {
    graph: &'a UndirectedGraph,
    weights: &'a HashMap<(usize, usize), W>,
}

impl<'a, W> OverlayWeighted<'a, W> {
    pub fn new(graph: &'a UndirectedGraph, weights: &'a HashMap<(usize, usize), W>) -> Self {
        Self { graph, weights }
    }
}

impl<'a, W> EdgeWeightedGraph for OverlayWeighted<'a, W>
where
    W: Copy + PartialOrd + Zero + Add<Output = W>,
{
    type Node = usize;
    type Edge = (usize, usize);
    type Weight = W;

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

    fn weight(&self, edge: (usize, usize)) -> W {
        self.weights[&edge]
    }
}

/// Runs Dijkstra searches from every requested source, restricted to the
/// allowed nodes and edges, and collects the outcome for every requested
/// `(source, target)` pair. Sources outside the allowed node set yield no
/// entries. Unreachable targets are reported with an infinite distance and
/// no path, never as errors.
///
/// # Parameters
/// * `graph` - the substrate to search
/// * `sources` - the nodes to search from
/// * `targets` - the nodes to report distances and paths to
/// * `allowed_nodes` - the nodes the searches may visit
/// * `allowed_edges` - the edges the searches may traverse
///
/// # Returns
/// * A result mapping each `(source, target)` pair to its `PathResult`, or
///   an error if a negative edge weight is encountered.
pub fn all_shortest_paths<G>(
    graph: &G,
    sources: &[G::Node],
    targets: &[G::Node],
    allowed_nodes: &HashSet<G::Node>,
    allowed_edges: &HashSet<G::Edge>,
) -> Result<HashMap<(G::Node, G::Node), PathResult<G::Edge, G::Weight>>, RazorError>
where
    G: EdgeWeightedGraph,
    G::Weight: Float,
{
    let mut results = HashMap::new();
    for &source in sources {
        if !allowed_nodes.contains(&source) {
            continue;
        }
        let (distances, previous) = single_source(graph, source, allowed_nodes, allowed_edges)?;
        for &target in targets {
            let result = match distances.get(&target) {
                Some(&distance) => PathResult {
                    distance,
                    edges: Some(walk_back(graph, source, target, &previous)),
                },
                None => PathResult {
                    distance: G::Weight::infinity(),
                    edges: None,
                },
            };
            results.insert((source, target), result);
        }
    }
    Ok(results)
}

/// The shortest distance from `source` to `target` inside the allowed
/// nodes and edges, or infinity when `target` is unreachable.
pub fn shortest_distance<G>(
    graph: &G,
    source: G::Node,
    target: G::Node,
    allowed_nodes: &HashSet<G::Node>,
    allowed_edges: &HashSet<G::Edge>,
) -> Result<G::Weight, RazorError>
where
    G: EdgeWeightedGraph,
    G::Weight: Float,
{
    if !allowed_nodes.contains(&source) {
        return Ok(G::Weight::infinity());
    }
    let (distances, _) = single_source(graph, source, allowed_nodes, allowed_edges)?;
    Ok(distances
        .get(&target)
        .copied()
        .unwrap_or_else(G::Weight::infinity))
}

/// Decides whether the edge `e = (s, t)` is exactly duplicated by an
/// alternate path: a bounded Dijkstra from `s` avoids `e` and discards any
/// partial distance exceeding `weight(e)`, and the edge is superfluous iff
/// `t` is settled at exactly `weight(e)`. Weights are integers and the final
/// comparison is exact integer equality.
///
/// # Parameters
/// * `graph` - the integer-weighted substrate
/// * `s`, `t` - the endpoints of the edge under test
/// * `edge` - the edge under test, which must join `s` and `t`
///
/// # Returns
/// * A result containing the decision, or an error if `edge` does not join
///   `s` and `t` or a negative weight is encountered.
pub fn is_superfluous<G>(
    graph: &G,
    s: G::Node,
    t: G::Node,
    edge: G::Edge,
) -> Result<bool, RazorError>
where
    G: EdgeWeightedGraph,
    G::Weight: PrimInt,
{
    if !graph.incident_edges(s).contains(&edge) || graph.opposite(s, edge) != t {
        return Err(RazorError::InvalidEdge(String::from(
            "the edge under test does not join the two endpoints given",
        )));
    }
    let limit = graph.weight(edge);
    if limit < G::Weight::zero() {
        return Err(RazorError::NegativeWeight(String::from(
            "the edge under test has a negative weight",
        )));
    }

    let mut distances: HashMap<G::Node, G::Weight> = HashMap::new();
    let mut settled: HashSet<G::Node> = HashSet::new();
    distances.insert(s, G::Weight::zero());
    loop {
        let node = match select_min_node(&distances, &settled) {
            Some(node) => node,
            None => return Ok(false),
        };
        let node_distance = distances[&node];
        if node == t {
            return Ok(node_distance == limit);
        }
        settled.insert(node);
        for e in graph.incident_edges(node) {
            if e == edge {
                continue;
            }
            let other = graph.opposite(node, e);
            if settled.contains(&other) {
                continue;
            }
            let w = graph.weight(e);
            if w < G::Weight::zero() {
                return Err(RazorError::NegativeWeight(String::from(
                    "an edge with negative weight was encountered during the search",
                )));
            }
            let candidate = node_distance + w;
            if candidate > limit {
                continue;
            }
            let improves = distances
                .get(&other)
                .map(|&current| candidate < current)
                .unwrap_or(true);
            if improves {
                distances.insert(other, candidate);
            }
        }
    }
}

/// One Dijkstra search by repeated linear scan for the nearest unsettled
/// node. The graphs searched here are small and dense, so the scan beats a
/// heap in both simplicity and constant factors.
fn single_source<G>(
    graph: &G,
    source: G::Node,
    allowed_nodes: &HashSet<G::Node>,
    allowed_edges: &HashSet<G::Edge>,
) -> Result<
    (
        HashMap<G::Node, G::Weight>,
        HashMap<G::Node, G::Edge>,
    ),
    RazorError,
>
where
    G: EdgeWeightedGraph,
{
    let mut distances: HashMap<G::Node, G::Weight> = HashMap::new();
    let mut previous: HashMap<G::Node, G::Edge> = HashMap::new();
    let mut settled: HashSet<G::Node> = HashSet::new();
    distances.insert(source, G::Weight::zero());

    while let Some(node) = select_min_node(&distances, &settled) {
        let node_distance = distances[&node];
        settled.insert(node);
        for e in graph.incident_edges(node) {
            if !allowed_edges.contains(&e) {
                continue;
            }
            let other = graph.opposite(node, e);
            if !allowed_nodes.contains(&other) || settled.contains(&other) {
                continue;
            }
            let w = graph.weight(e);
            if w < G::Weight::zero() {
                return Err(RazorError::NegativeWeight(String::from(
                    "an edge with negative weight was encountered during the search",
                )));
            }
            let candidate = node_distance + w;
            let improves = distances
                .get(&other)
                .map(|&current| candidate < current)
                .unwrap_or(true);
            if improves {
                distances.insert(other, candidate);
                previous.insert(other, e);
            }
        }
    }
    Ok((distances, previous))
}

fn select_min_node<N, W>(distances: &HashMap<N, W>, settled: &HashSet<N>) -> Option<N>
where
    N: Copy + Eq + Hash + Ord,
    W: Copy + PartialOrd,
{
    let mut current: Option<(N, W)> = None;
    for (&node, &distance) in distances {
        if settled.contains(&node) {
            continue;
        }
        let closer = match current {
            Some((best_node, best_distance)) => {
                distance < best_distance || (distance == best_distance && node < best_node)
            }
            None => true,
        };
        if closer {
            current = Some((node, distance));
        }
    }
    current.map(|(node, _)| node)
}

fn walk_back<G>(
    graph: &G,
    source: G::Node,
    target: G::Node,
    previous: &HashMap<G::Node, G::Edge>,
) -> Vec<G::Edge>
where
    G: EdgeWeightedGraph,
{
    let mut edges = Vec::new();
    let mut node = target;
    while node != source {
        match previous.get(&node) {
            Some(&e) => {
                edges.push(e);
                node = graph.opposite(node, e);
            }
            None => break,
        }
    }
    edges.reverse();
    edges
}
