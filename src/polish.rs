use crate::slack::{aux_row, find_coincident, slack_with_argmin};
use crate::{DistMatrix, RazorError, UndirectedGraph};
use log::debug;
use num_traits::Float;

/// Runs one hub-centred polishing pass over a reconstructed network. Hubs
/// are visited in order of decreasing degree; for each vertex of degree at
/// least three, the hub and its neighbours form a local subset whose
/// members are tested for positive four-point slack. The first member
/// whose slack exceeds the tolerance, and whose auxiliary column does not
/// coincide with a vertex already present, has a single auxiliary vertex
/// appended to the matrix, after which the pass stops so the caller can
/// rebuild the network around the new vertex before polishing again.
///
/// # Parameters
/// * `matrix` - the distance matrix, grown in place on insertion
/// * `graph` - the current network topology over the matrix indices
/// * `tolerance` - the slack below which a vertex counts as tree-consistent
///
/// # Returns
/// * A result containing the index of the inserted vertex, `None` if every
///   hub neighbourhood was already consistent, or an error if the graph
///   references a vertex outside the matrix.
pub fn polish_hubs<T: Float>(
    matrix: &mut DistMatrix<T>,
    graph: &UndirectedGraph,
    tolerance: T,
) -> Result<Option<usize>, RazorError> {
    if let Some(max) = graph.max_vertex() {
        if max >= matrix.size() {
            return Err(RazorError::WrongShape(format!(
                "graph vertex {max} is outside the matrix of size {}",
                matrix.size()
            )));
        }
    }

    let mut hubs: Vec<(usize, usize)> = graph
        .vertices()
        .map(|v| (v, graph.degree(v)))
        .filter(|&(_, degree)| degree >= 3)
        .collect();
    hubs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    for (hub, _) in hubs {
        let mut subset: Vec<usize> = vec![hub];
        subset.extend(graph.neighbours(hub));
        for &member in &subset {
            let slack = slack_with_argmin(matrix, &subset, member);
            if slack.value > tolerance {
                if let Some((y, z)) = slack.witness {
                    let column = aux_row(matrix, member, slack.value, y, z);
                    if find_coincident(matrix, &column, tolerance).is_none() {
                        let appended = matrix.append_vertex(&column)?;
                        debug!(
                            "polish around hub {hub}: vertex {member} left slack, appended vertex {appended}"
                        );
                        return Ok(Some(appended));
                    }
                }
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    fn star_graph() -> UndirectedGraph {
        let mut graph = UndirectedGraph::new();
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(0, 3);
        graph
    }

    #[test]
    fn a_hub_with_slack_gains_a_steiner_centre() {
        // Four taxa pairwise at distance 2 sit around an unseen centre at
        // distance 1 from each of them
        let mut matrix = DistMatrix::zeros(4);
        for i in 0..4 {
            for j in (i + 1)..4 {
                matrix.set(i, j, 2.0);
            }
        }
        let inserted = polish_hubs(&mut matrix, &star_graph(), TOLERANCE).unwrap();
        assert_eq!(Some(4), inserted);
        assert_eq!(5, matrix.size());
        for i in 0..4 {
            assert_eq!(1.0, matrix.get(4, i));
        }
    }

    #[test]
    fn a_consistent_hub_inserts_nothing() {
        // The star centre is already a vertex, so every candidate column
        // coincides with it
        let mut matrix = DistMatrix::zeros(4);
        for i in 1..4 {
            matrix.set(0, i, 1.0);
            for j in (i + 1)..4 {
                matrix.set(i, j, 2.0);
            }
        }
        let inserted = polish_hubs(&mut matrix, &star_graph(), TOLERANCE).unwrap();
        assert_eq!(None, inserted);
        assert_eq!(4, matrix.size());
    }

    #[test]
    fn low_degree_vertices_are_not_polished() {
        let mut graph = UndirectedGraph::new();
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        let mut matrix = DistMatrix::zeros(3);
        matrix.set(0, 1, 1.0);
        matrix.set(1, 2, 1.0);
        matrix.set(0, 2, 2.0);
        let inserted = polish_hubs(&mut matrix, &graph, TOLERANCE).unwrap();
        assert_eq!(None, inserted);
    }

    #[test]
    fn out_of_range_graphs_are_rejected() {
        let mut matrix = DistMatrix::zeros(2);
        matrix.set(0, 1, 1.0);
        let mut graph = UndirectedGraph::new();
        graph.add_edge(0, 5);
        let result = polish_hubs(&mut matrix, &graph, TOLERANCE);
        assert!(matches!(result, Err(RazorError::WrongShape(_))));
    }
}
