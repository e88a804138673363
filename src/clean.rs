use crate::graph::ordered_pair;
use crate::shortest_path::{all_shortest_paths, OverlayWeighted};
use crate::{DistMatrix, RazorError, UndirectedGraph};
use log::debug;
use num_traits::Float;
use std::collections::{BTreeSet, HashMap, HashSet};

/// The result of cleaning a network: the compacted matrix and graph over the
/// surviving vertices, plus the index mappings between the old and new
/// worlds. `old_to_new[v]` is `None` for vertices the cleanup deleted.
#[derive(Debug, Clone)]
pub struct CleanOutcome<T> {
    pub matrix: DistMatrix<T>,
    pub graph: UndirectedGraph,
    pub old_to_new: Vec<Option<usize>>,
    pub new_to_old: Vec<usize>,
}

/// Cleans a network down to its load-bearing structure. To a fixed point,
/// unlabeled vertices of degree at most one are deleted together with their
/// remnant edge, and unlabeled vertices of degree exactly two are spliced
/// out, their two edges replaced by a direct edge of summed weight (keeping
/// the smaller weight if the direct edge already exists). The survivors are
/// re-indexed compactly and their all-pairs shortest path distances become
/// the new matrix, with infinity for disconnected pairs.
///
/// # Parameters
/// * `matrix` - the distances weighing the edges of `graph`
/// * `graph` - the network topology; every vertex must be a valid matrix
///             index
/// * `is_labeled` - the predicate marking untouchable vertices
///
/// # Returns
/// * A result containing the cleaned matrix, graph and index mappings, or
///   an error if the graph references a vertex outside the matrix.
pub fn clean_and_smooth<T, F>(
    matrix: &DistMatrix<T>,
    graph: &UndirectedGraph,
    is_labeled: F,
) -> Result<CleanOutcome<T>, RazorError>
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

    let mut work = graph.clone();
    let mut weights: HashMap<(usize, usize), T> = work
        .edges()
        .into_iter()
        .map(|(u, v)| ((u, v), matrix.get(u, v)))
        .collect();
    let mut alive: BTreeSet<usize> = work.vertices().collect();
    let before = alive.len();

    loop {
        let mut changed = false;
        let snapshot: Vec<usize> = alive.iter().copied().collect();
        for v in snapshot {
            if !alive.contains(&v) || is_labeled(v) {
                continue;
            }
            let degree = work.degree(v);
            if degree <= 1 {
                let nbrs: Vec<usize> = work.neighbours(v).collect();
                for n in nbrs {
                    work.remove_edge(v, n);
                    weights.remove(&ordered_pair(v, n));
                }
                alive.remove(&v);
                changed = true;
            } else if degree == 2 {
                let nbrs: Vec<usize> = work.neighbours(v).collect();
                let (a, b) = (nbrs[0], nbrs[1]);
                let spliced =
                    weights[&ordered_pair(a, v)] + weights[&ordered_pair(v, b)];
                work.remove_edge(a, v);
                weights.remove(&ordered_pair(a, v));
                work.remove_edge(v, b);
                weights.remove(&ordered_pair(v, b));
                alive.remove(&v);
                let key = ordered_pair(a, b);
                if work.has_edge(a, b) {
                    if spliced < weights[&key] {
                        weights.insert(key, spliced);
                    }
                } else {
                    work.add_edge(a, b);
                    weights.insert(key, spliced);
                }
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    debug!("cleanup removed {} of {before} vertices", before - alive.len());

    let new_to_old: Vec<usize> = alive.iter().copied().collect();
    let mut old_to_new: Vec<Option<usize>> = vec![None; matrix.size()];
    for (new, &old) in new_to_old.iter().enumerate() {
        old_to_new[old] = Some(new);
    }

    let overlay = OverlayWeighted::new(&work, &weights);
    let allowed_nodes: HashSet<usize> = alive.iter().copied().collect();
    let allowed_edges: HashSet<(usize, usize)> = work.edges().into_iter().collect();
    let results = all_shortest_paths(
        &overlay,
        &new_to_old,
        &new_to_old,
        &allowed_nodes,
        &allowed_edges,
    )?;

    let mut cleaned = DistMatrix::zeros(new_to_old.len());
    for (i, &old_i) in new_to_old.iter().enumerate() {
        for (j, &old_j) in new_to_old.iter().enumerate() {
            if i < j {
                let distance = results
                    .get(&(old_i, old_j))
                    .map(|r| r.distance)
                    .unwrap_or_else(T::infinity);
                cleaned.set(i, j, distance);
            }
        }
    }

    let mut cleaned_graph = UndirectedGraph::new();
    for new in 0..new_to_old.len() {
        cleaned_graph.add_vertex(new);
    }
    for (u, v) in work.edges() {
        if let (Some(nu), Some(nv)) = (old_to_new[u], old_to_new[v]) {
            cleaned_graph.add_edge(nu, nv);
        }
    }

    Ok(CleanOutcome {
        matrix: cleaned,
        graph: cleaned_graph,
        old_to_new,
        new_to_old,
    })
}
