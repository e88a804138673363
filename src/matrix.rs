use crate::RazorError;
use num_traits::Float;

/// A square symmetric distance matrix with a zero diagonal, growable by
/// appending one vertex at a time. Row and column `i` both belong to vertex
/// `i`; indices are dense and never reused. Generic over floating point
/// numeric types.
#[derive(Debug, Clone, PartialEq)]
pub struct DistMatrix<T> {
    entries: Vec<Vec<T>>,
}

impl<T: Float> DistMatrix<T> {
    /// Creates an all-zero matrix over `n` vertices.
    pub fn zeros(n: usize) -> Self {
        DistMatrix {
            entries: vec![vec![T::zero(); n]; n],
        }
    }

    /// Creates a matrix from raw rows. Only structural checks are performed
    /// here (the rows must form a square); metric properties such as symmetry
    /// and finiteness are validated by the engine entry points.
    ///
    /// # Parameters
    /// * `rows` - the matrix rows, all of length `rows.len()`
    ///
    /// # Returns
    /// * A result containing the matrix, or an error if the rows are not
    ///   square.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, RazorError> {
        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(RazorError::WrongShape(format!(
                    "matrix has {n} rows but row {i} has {} entries",
                    row.len()
                )));
            }
        }
        Ok(DistMatrix { entries: rows })
    }

    /// The number of vertices (rows) currently in the matrix.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The distance between vertices `i` and `j`. Panics if either index is
    /// out of range.
    pub fn get(&self, i: usize, j: usize) -> T {
        self.entries[i][j]
    }

    /// Sets the distance between vertices `i` and `j`, writing both
    /// symmetric entries. Writes to the diagonal are ignored.
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        if i == j {
            return;
        }
        self.entries[i][j] = value;
        self.entries[j][i] = value;
    }

    pub fn row(&self, i: usize) -> &[T] {
        &self.entries[i]
    }

    /// Appends a new vertex whose distances to every existing vertex are
    /// given by `column`. The matrix grows by one row and one column; the new
    /// diagonal entry is zero.
    ///
    /// # Parameters
    /// * `column` - distances from the new vertex to vertices `0..size()`,
    ///              so its length must equal `size()`
    ///
    /// # Returns
    /// * A result containing the index of the new vertex, or an error if the
    ///   column length does not match the current size.
    pub fn append_vertex(&mut self, column: &[T]) -> Result<usize, RazorError> {
        let n = self.size();
        if column.len() != n {
            return Err(RazorError::WrongShape(format!(
                "candidate column has {} entries but the matrix has {n} vertices",
                column.len()
            )));
        }
        for (row, &value) in self.entries.iter_mut().zip(column) {
            row.push(value);
        }
        let mut new_row = column.to_vec();
        new_row.push(T::zero());
        self.entries.push(new_row);
        Ok(n)
    }

    /// Copies the matrix out as plain rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.entries.clone()
    }
}
