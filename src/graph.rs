use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Returns the canonical ordering of an unordered vertex pair.
pub(crate) fn ordered_pair(u: usize, v: usize) -> (usize, usize) {
    if u < v {
        (u, v)
    } else {
        (v, u)
    }
}

/// A simple undirected graph over dense `usize` vertex indices: no loops, no
/// parallel edges. A vertex becomes known by being registered explicitly or
/// by appearing as an edge endpoint, and is never forgotten, so isolated
/// vertices are representable. Edges are reported in the canonical `(u, v)`
/// form with `u < v`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndirectedGraph {
    adjacency: BTreeMap<usize, BTreeSet<usize>>,
}

impl UndirectedGraph {
    pub fn new() -> Self {
        UndirectedGraph {
            adjacency: BTreeMap::new(),
        }
    }

    /// Creates the complete graph on the given vertices. A single vertex
    /// yields a graph with one isolated vertex and no edges.
    pub fn complete(vertices: &[usize]) -> Self {
        let mut graph = UndirectedGraph::new();
        for &v in vertices {
            graph.add_vertex(v);
        }
        for (i, &u) in vertices.iter().enumerate() {
            for &v in &vertices[i + 1..] {
                graph.add_edge(u, v);
            }
        }
        graph
    }

    /// Registers a vertex without any edges. Idempotent.
    pub fn add_vertex(&mut self, v: usize) {
        self.adjacency.entry(v).or_default();
    }

    /// Adds the edge between `u` and `v`, registering both endpoints.
    /// Self loops are ignored, and adding an existing edge is a no-op.
    pub fn add_edge(&mut self, u: usize, v: usize) {
        if u == v {
            return;
        }
        self.adjacency.entry(u).or_default().insert(v);
        self.adjacency.entry(v).or_default().insert(u);
    }

    /// Removes the edge between `u` and `v` if present. The endpoints stay
    /// known; vertices are never removed.
    pub fn remove_edge(&mut self, u: usize, v: usize) {
        if let Some(neighbours) = self.adjacency.get_mut(&u) {
            neighbours.remove(&v);
        }
        if let Some(neighbours) = self.adjacency.get_mut(&v) {
            neighbours.remove(&u);
        }
    }

    pub fn has_vertex(&self, v: usize) -> bool {
        self.adjacency.contains_key(&v)
    }

    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.adjacency
            .get(&u)
            .map(|neighbours| neighbours.contains(&v))
            .unwrap_or(false)
    }

    /// The degree of `v`; zero for unknown vertices.
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency.get(&v).map(BTreeSet::len).unwrap_or(0)
    }

    /// The neighbours of `v` in ascending order; empty for unknown vertices.
    pub fn neighbours(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency
            .get(&v)
            .into_iter()
            .flat_map(|neighbours| neighbours.iter().copied())
    }

    /// All known vertices in ascending order.
    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn n_vertices(&self) -> usize {
        self.adjacency.len()
    }

    pub fn n_edges(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// The largest known vertex index, if any vertex is known.
    pub fn max_vertex(&self) -> Option<usize> {
        self.adjacency.keys().next_back().copied()
    }

    /// All edges in canonical `(u, v)` form with `u < v`, ascending.
    pub fn edges(&self) -> Vec<(usize, usize)> {
        let mut edges = Vec::with_capacity(self.n_edges());
        for (&u, neighbours) in &self.adjacency {
            for &v in neighbours {
                if u < v {
                    edges.push((u, v));
                }
            }
        }
        edges
    }

    /// Builds a new graph containing exactly the given edges; its vertex set
    /// is exactly the endpoints of those edges.
    pub fn induced_by_edges(&self, edges: &[(usize, usize)]) -> UndirectedGraph {
        let mut induced = UndirectedGraph::new();
        for &(u, v) in edges {
            induced.add_edge(u, v);
        }
        induced
    }

    /// The connected components over all known vertices, including isolated
    /// ones. Each component is sorted ascending, and components are ordered
    /// by their smallest member.
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut components = Vec::new();
        let mut visited = BTreeSet::new();
        for &start in self.adjacency.keys() {
            if visited.contains(&start) {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(start);
            visited.insert(start);
            while let Some(v) = queue.pop_front() {
                component.push(v);
                for n in self.neighbours(v) {
                    if visited.insert(n) {
                        queue.push_back(n);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }
}
