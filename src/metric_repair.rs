use crate::{DistMatrix, RazorError};
use num_traits::Float;

/// Repairs a distance matrix into a true metric. The input is first
/// sanitised (zero diagonal, negatives clamped to zero, the two directions
/// symmetrised by their minimum), then closed under triple relaxation so
/// every entry becomes the shortest path distance through the complete
/// graph, then re-symmetrised by averaging with sub-tolerance negative
/// noise clipped to zero.
///
/// The output is element-wise less than or equal to the input, exactly
/// symmetric, zero on the diagonal and satisfies every triangle inequality.
///
/// # Parameters
/// * `rows` - the raw matrix rows, which need not be symmetric
/// * `tolerance` - the width of the numerical noise band around zero
///
/// # Returns
/// * A result containing the repaired matrix, or an error if the rows are
///   not square or contain NaN.
pub fn enforce_triangle_inequalities<T: Float>(
    rows: &[Vec<T>],
    tolerance: T,
) -> Result<DistMatrix<T>, RazorError> {
    let n = rows.len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n {
            return Err(RazorError::WrongShape(format!(
                "row {i} has {} entries in a matrix of {n} rows",
                row.len()
            )));
        }
        for (j, value) in row.iter().enumerate() {
            if value.is_nan() {
                return Err(RazorError::NonFiniteDistance(format!(
                    "entry ({i}, {j}) is NaN"
                )));
            }
        }
    }

    let mut repaired: Vec<Vec<T>> = rows.to_vec();
    for i in 0..n {
        repaired[i][i] = T::zero();
        for j in (i + 1)..n {
            let one_way = repaired[i][j].max(T::zero());
            let other_way = repaired[j][i].max(T::zero());
            let value = one_way.min(other_way);
            repaired[i][j] = value;
            repaired[j][i] = value;
        }
    }

    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                let via = repaired[i][k] + repaired[k][j];
                if via < repaired[i][j] {
                    repaired[i][j] = via;
                }
            }
        }
    }

    let two = T::from(2.0).unwrap();
    for i in 0..n {
        for j in (i + 1)..n {
            let mut value = (repaired[i][j] + repaired[j][i]) / two;
            if value < T::zero() && -value <= tolerance {
                value = T::zero();
            }
            repaired[i][j] = value;
            repaired[j][i] = value;
        }
    }

    DistMatrix::from_rows(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn shortcuts_replace_violating_entries() {
        let rows = vec![
            vec![0.0, 5.0, 1.0],
            vec![5.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ];
        let repaired = enforce_triangle_inequalities(&rows, TOLERANCE).unwrap();
        assert_eq!(2.0, repaired.get(0, 1));
        assert_eq!(1.0, repaired.get(0, 2));
        assert_eq!(1.0, repaired.get(1, 2));
    }

    #[test]
    fn a_metric_passes_through_unchanged() {
        let rows = vec![
            vec![0.0, 2.0, 3.0, 3.0],
            vec![2.0, 0.0, 3.0, 3.0],
            vec![3.0, 3.0, 0.0, 2.0],
            vec![3.0, 3.0, 2.0, 0.0],
        ];
        let repaired = enforce_triangle_inequalities(&rows, TOLERANCE).unwrap();
        assert_eq!(DistMatrix::from_rows(rows).unwrap(), repaired);
    }

    #[test]
    fn asymmetry_and_negatives_are_sanitised() {
        let rows = vec![
            vec![0.0, 3.0, -1.0],
            vec![2.0, 0.0, 4.0],
            vec![5.0, 4.0, 0.0],
        ];
        let repaired = enforce_triangle_inequalities(&rows, TOLERANCE).unwrap();
        assert_eq!(2.0, repaired.get(0, 1));
        assert_eq!(0.0, repaired.get(0, 2));
        assert_eq!(2.0, repaired.get(1, 2));
    }

    #[test]
    fn repair_is_idempotent() {
        let rows = vec![
            vec![0.0, 5.0, 1.0],
            vec![5.0, 0.0, 1.0],
            vec![1.0, 1.0, 0.0],
        ];
        let once = enforce_triangle_inequalities(&rows, TOLERANCE).unwrap();
        let twice = enforce_triangle_inequalities(&once.to_rows(), TOLERANCE).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn output_is_metric_and_no_larger_than_input() {
        let rows = vec![
            vec![0.0, 9.0, 2.0, 7.0],
            vec![9.0, 0.0, 3.0, 1.0],
            vec![2.0, 3.0, 0.0, 8.0],
            vec![7.0, 1.0, 8.0, 0.0],
        ];
        let repaired = enforce_triangle_inequalities(&rows, TOLERANCE).unwrap();
        for i in 0..4 {
            assert_eq!(0.0, repaired.get(i, i));
            for j in 0..4 {
                assert!(repaired.get(i, j) <= rows[i][j]);
                assert_eq!(repaired.get(i, j), repaired.get(j, i));
                for k in 0..4 {
                    assert!(
                        repaired.get(i, j)
                            <= repaired.get(i, k) + repaired.get(k, j) + TOLERANCE
                    );
                }
            }
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![vec![0.0, 1.0], vec![1.0]];
        let result = enforce_triangle_inequalities(&rows, TOLERANCE);
        assert!(matches!(result, Err(RazorError::WrongShape(_))));
    }

    #[test]
    fn nan_entries_are_rejected() {
        let rows = vec![vec![0.0, f64::NAN], vec![f64::NAN, 0.0]];
        let result = enforce_triangle_inequalities(&rows, TOLERANCE);
        assert!(matches!(result, Err(RazorError::NonFiniteDistance(_))));
    }
}
