use crate::{DistMatrix, UndirectedGraph};
use num_traits::Float;

/// The result of a four-point slack computation: how far a vertex can be
/// split away from a subset, and the pair of subset members that limits it.
/// The witness is `None` when the subset holds fewer than two other members,
/// in which case the slack is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Slack<T> {
    pub value: T,
    pub witness: Option<(usize, usize)>,
}

/// Computes the slack of `x` against `subset`: the minimum over all
/// unordered pairs `{y, z}` of other subset members of
/// `(D[x][y] + D[x][z] - D[y][z]) / 2`, clamped to zero, together with the
/// arg-min pair. The first pair achieving the minimum, in subset order, is
/// the witness.
pub fn slack_with_argmin<T: Float>(
    matrix: &DistMatrix<T>,
    subset: &[usize],
    x: usize,
) -> Slack<T> {
    let two = T::from(2.0).unwrap();
    let mut minimum: Option<(T, (usize, usize))> = None;
    for (i, &y) in subset.iter().enumerate() {
        if y == x {
            continue;
        }
        for &z in &subset[i + 1..] {
            if z == x {
                continue;
            }
            let raw = (matrix.get(x, y) + matrix.get(x, z) - matrix.get(y, z)) / two;
            let smaller = match minimum {
                Some((current, _)) => raw < current,
                None => true,
            };
            if smaller {
                minimum = Some((raw, (y, z)));
            }
        }
    }
    match minimum {
        Some((raw, witness)) => Slack {
            value: raw.max(T::zero()),
            witness: Some(witness),
        },
        None => Slack {
            value: T::zero(),
            witness: None,
        },
    }
}

/// Builds the candidate distance column of an auxiliary vertex that splits
/// `x` off by `slack` towards the witness pair `(y, z)`. For the witnesses
/// the new vertex sits at their distance to `x` less the slack; every other
/// vertex keeps whichever of the three anchor distances is the most binding.
/// The column has one entry per current matrix vertex.
pub fn aux_row<T: Float>(
    matrix: &DistMatrix<T>,
    x: usize,
    slack: T,
    y: usize,
    z: usize,
) -> Vec<T> {
    let dy = (matrix.get(y, x) - slack).max(T::zero());
    let dz = (matrix.get(z, x) - slack).max(T::zero());
    let mut column = Vec::with_capacity(matrix.size());
    for a in 0..matrix.size() {
        let entry = if a == x {
            slack
        } else if a == y {
            dy
        } else if a == z {
            dz
        } else {
            (matrix.get(a, x) - slack)
                .max(matrix.get(a, y) - dy)
                .max(matrix.get(a, z) - dz)
                .max(T::zero())
        };
        column.push(entry);
    }
    column
}

/// Finds an existing vertex the candidate column coincides with: a vertex
/// `a` at distance at most `tolerance` from the candidate whose whole row
/// matches the column within `tolerance`. Appending such a column would
/// duplicate vertex `a`.
pub fn find_coincident<T: Float>(
    matrix: &DistMatrix<T>,
    column: &[T],
    tolerance: T,
) -> Option<usize> {
    for a in 0..matrix.size() {
        if column[a] > tolerance {
            continue;
        }
        let matches = (0..matrix.size())
            .all(|b| (column[b] - matrix.get(a, b)).abs() <= tolerance);
        if matches {
            return Some(a);
        }
    }
    None
}

/// True iff some third vertex `z` witnesses the edge `(x, y)` as redundant,
/// i.e. `D[x][z] + D[z][y] <= D[x][y] + tolerance`.
pub fn is_redundant_edge<T: Float>(
    matrix: &DistMatrix<T>,
    x: usize,
    y: usize,
    tolerance: T,
) -> bool {
    let direct = matrix.get(x, y);
    for z in 0..matrix.size() {
        if z == x || z == y {
            continue;
        }
        if matrix.get(x, z) + matrix.get(z, y) <= direct + tolerance {
            return true;
        }
    }
    false
}

/// True iff no third vertex lies on a shortest route between `x` and `y`.
/// Essential edges are the ones a network realising the matrix must contain.
pub fn is_essential_edge<T: Float>(
    matrix: &DistMatrix<T>,
    x: usize,
    y: usize,
    tolerance: T,
) -> bool {
    !is_redundant_edge(matrix, x, y, tolerance)
}

/// Builds the pre-graph of the matrix: every vertex, with an edge for every
/// essential pair.
pub fn pre_graph<T: Float>(matrix: &DistMatrix<T>, tolerance: T) -> UndirectedGraph {
    let mut graph = UndirectedGraph::new();
    for v in 0..matrix.size() {
        graph.add_vertex(v);
    }
    for x in 0..matrix.size() {
        for y in (x + 1)..matrix.size() {
            if is_essential_edge(matrix, x, y, tolerance) {
                graph.add_edge(x, y);
            }
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    fn path_metric() -> DistMatrix<f64> {
        // Vertices on a line: 0 - 1 - 2 with unit steps
        DistMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    fn quartet_metric() -> DistMatrix<f64> {
        // Tree ((a, b), (c, d)) with pendant edges 1 and internal edge 1
        DistMatrix::from_rows(vec![
            vec![0.0, 2.0, 3.0, 3.0],
            vec![2.0, 0.0, 3.0, 3.0],
            vec![3.0, 3.0, 0.0, 2.0],
            vec![3.0, 3.0, 2.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn interior_vertex_has_zero_slack() {
        let matrix = path_metric();
        let slack = slack_with_argmin(&matrix, &[0, 1, 2], 1);
        assert_eq!(0.0, slack.value);
        assert_eq!(Some((0, 2)), slack.witness);
    }

    #[test]
    fn leaf_slack_is_the_pendant_length() {
        let matrix = path_metric();
        let slack = slack_with_argmin(&matrix, &[0, 1, 2], 0);
        assert_eq!(1.0, slack.value);
        assert_eq!(Some((1, 2)), slack.witness);
    }

    #[test]
    fn too_small_subsets_have_no_witness() {
        let matrix = path_metric();
        let slack = slack_with_argmin(&matrix, &[0, 1], 0);
        assert_eq!(0.0, slack.value);
        assert_eq!(None, slack.witness);
    }

    #[test]
    fn quartet_taxa_have_unit_slack() {
        let matrix = quartet_metric();
        let slack = slack_with_argmin(&matrix, &[0, 1, 2, 3], 0);
        assert_eq!(1.0, slack.value);
        assert_eq!(Some((1, 2)), slack.witness);
    }

    #[test]
    fn aux_row_places_the_branch_point() {
        let matrix = quartet_metric();
        let slack = slack_with_argmin(&matrix, &[0, 1, 2, 3], 0);
        let (y, z) = slack.witness.unwrap();
        let column = aux_row(&matrix, 0, slack.value, y, z);
        // The branch point above {a, b}: distance 1 to both, 2 to c and d
        assert_eq!(vec![1.0, 1.0, 2.0, 2.0], column);
    }

    #[test]
    fn coincident_columns_are_detected() {
        let matrix = path_metric();
        // The branch point of leaf 0 towards {1, 2} is vertex 1 itself
        let column = aux_row(&matrix, 0, 1.0, 1, 2);
        assert_eq!(Some(1), find_coincident(&matrix, &column, TOL));
    }

    #[test]
    fn fresh_columns_are_not_coincident() {
        let matrix = quartet_metric();
        let column = aux_row(&matrix, 0, 1.0, 1, 2);
        assert_eq!(None, find_coincident(&matrix, &column, TOL));
    }

    #[test]
    fn midpoint_witnesses_redundancy() {
        let matrix = path_metric();
        assert!(is_redundant_edge(&matrix, 0, 2, TOL));
        assert!(is_essential_edge(&matrix, 0, 1, TOL));
        assert!(is_essential_edge(&matrix, 1, 2, TOL));
    }

    #[test]
    fn pre_graph_of_a_path_is_the_chain() {
        let matrix = path_metric();
        let graph = pre_graph(&matrix, TOL);
        assert_eq!(vec![(0, 1), (1, 2)], graph.edges());
        assert_eq!(3, graph.n_vertices());
    }

    #[test]
    fn pre_graph_is_stable_under_rederivation() {
        let matrix = quartet_metric();
        let first = pre_graph(&matrix, TOL);
        let second = pre_graph(&matrix, TOL);
        assert_eq!(first, second);
    }
}
