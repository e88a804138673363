use crate::clean::clean_and_smooth;
use crate::metric_repair::enforce_triangle_inequalities;
use crate::network::{network_from_parts, NetworkGraph};
use crate::params::RazorParams;
use crate::progress::ProgressListener;
use crate::prune::prune_redundant_edges;
use crate::slack::{aux_row, find_coincident, is_redundant_edge, pre_graph, slack_with_argmin, Slack};
use crate::validation::MatrixValidator;
use crate::{DistMatrix, RazorError, UndirectedGraph};
use log::{debug, info};
use num_traits::Float;

const EXPAND_STAGES: usize = 5;

/// The reconstruction engine. Wraps a borrowed taxon-to-taxon distance
/// matrix and grows it into a phylogenetic network by recursively
/// detecting four-point slack, splitting off auxiliary Steiner-like
/// vertices and pruning away the edges the auxiliary structure explains.
///
/// The matrix is borrowed for the lifetime of the engine, so it can be
/// reused once reconstruction is complete.
pub struct Razor<'a, T> {
    matrix: &'a DistMatrix<T>,
    n_taxa: usize,
    params: RazorParams,
}

/// The finished product of a reconstruction run: the cleaned network with
/// its distance matrix, and the mapping from input taxa to network
/// vertices.
#[derive(Debug, Clone)]
pub struct Reconstruction<T> {
    /// Repaired metric over the surviving vertices.
    pub matrix: DistMatrix<T>,
    /// Network topology over the same compact indices as `matrix`.
    pub graph: UndirectedGraph,
    /// For each input taxon, its vertex index in `graph` and `matrix`.
    pub taxon_indices: Vec<usize>,
    /// The topology and the matrix weights combined into one graph value.
    pub network: NetworkGraph<T>,
}

impl<'a, T: Float> Razor<'a, T> {
    /// Creates an engine for the given distance matrix, using the
    /// parameters provided.
    ///
    /// # Parameters
    /// * `matrix` - the symmetric taxon-to-taxon distances
    /// * `params` - the tuning parameters, from `RazorParams::builder()`
    ///
    /// # Returns
    /// * The engine, ready to expand or reconstruct
    pub fn new(matrix: &'a DistMatrix<T>, params: RazorParams) -> Self {
        let n_taxa = matrix.size();
        Razor {
            matrix,
            n_taxa,
            params,
        }
    }

    /// Creates an engine for the given distance matrix using the default
    /// parameters.
    ///
    /// # Parameters
    /// * `matrix` - the symmetric taxon-to-taxon distances
    ///
    /// # Returns
    /// * The engine, ready to expand or reconstruct
    pub fn default_params(matrix: &'a DistMatrix<T>) -> Self {
        Self::new(matrix, RazorParams::default())
    }

    /// Expands the distance matrix by appending auxiliary vertices until
    /// every local neighbourhood fits a tree metric or is structurally
    /// unambiguous. The input matrix is not modified; taxa keep their
    /// indices and auxiliary vertices take the indices above them.
    ///
    /// Expansion reports five progress ticks per recursive call and checks
    /// the listener for cancellation on entering each call, so a cancelled
    /// run returns promptly with `RazorError::Cancelled`. This method grows
    /// an internal copy it can only hand back on success; when the vertices
    /// appended before a cancellation matter, grow a working copy through
    /// [`Razor::expand_into`] instead.
    ///
    /// # Parameters
    /// * `progress` - the listener informed of progress and polled for
    ///                cancellation; use `NoProgress` to opt out
    ///
    /// # Returns
    /// * A result containing the expanded matrix, or the error that
    ///   stopped the run
    ///
    /// # Examples
    /// ```
    /// use razornet::{DistMatrix, NoProgress, Razor};
    ///
    /// let rows = vec![
    ///     vec![0.0, 2.0, 3.0, 3.0],
    ///     vec![2.0, 0.0, 3.0, 3.0],
    ///     vec![3.0, 3.0, 0.0, 2.0],
    ///     vec![3.0, 3.0, 2.0, 0.0],
    /// ];
    /// let matrix = DistMatrix::from_rows(rows).unwrap();
    /// let razor = Razor::default_params(&matrix);
    /// let expanded = razor.expand(&mut NoProgress).unwrap();
    ///
    /// // Two hidden internal vertices join the two cherries
    /// assert_eq!(6, expanded.size());
    /// assert_eq!(1.0, expanded.get(4, 5));
    /// ```
    pub fn expand<P: ProgressListener>(
        &self,
        progress: &mut P,
    ) -> Result<DistMatrix<T>, RazorError> {
        let mut expanded = self.matrix.clone();
        self.expand_into(&mut expanded, progress)?;
        Ok(expanded)
    }

    /// Expands a caller-owned working matrix in place, exactly as
    /// [`Razor::expand`] does with its internal copy. Because the caller
    /// keeps ownership, a cancelled run discards no partial results: every
    /// append is an atomic whole-vertex operation, so on
    /// `RazorError::Cancelled` the matrix is valid and reflects whatever
    /// vertices were appended before the poll that stopped the run.
    ///
    /// # Parameters
    /// * `matrix` - the working matrix to grow, typically a clone of the
    ///              engine's input
    /// * `progress` - the listener informed of progress and polled for
    ///                cancellation; use `NoProgress` to opt out
    ///
    /// # Returns
    /// * A result carrying the error that stopped the run, if any; the
    ///   matrix keeps its growth either way
    ///
    /// # Examples
    /// ```
    /// use razornet::{DistMatrix, NoProgress, Razor};
    ///
    /// let rows = vec![
    ///     vec![0.0, 2.0, 3.0, 3.0],
    ///     vec![2.0, 0.0, 3.0, 3.0],
    ///     vec![3.0, 3.0, 0.0, 2.0],
    ///     vec![3.0, 3.0, 2.0, 0.0],
    /// ];
    /// let matrix = DistMatrix::from_rows(rows).unwrap();
    /// let razor = Razor::default_params(&matrix);
    ///
    /// let mut working = matrix.clone();
    /// razor.expand_into(&mut working, &mut NoProgress).unwrap();
    /// assert_eq!(6, working.size());
    /// ```
    pub fn expand_into<P: ProgressListener>(
        &self,
        matrix: &mut DistMatrix<T>,
        progress: &mut P,
    ) -> Result<(), RazorError> {
        let tolerance = T::from(self.params.tolerance).unwrap();
        MatrixValidator::new(matrix, tolerance).validate()?;
        let before = matrix.size();
        let subset: Vec<usize> = (0..before).collect();
        self.expand_subset(matrix, &subset, progress, tolerance)?;
        info!(
            "expansion finished with {} vertices ({} appended)",
            matrix.size(),
            matrix.size() - before
        );
        Ok(())
    }

    fn expand_subset<P: ProgressListener>(
        &self,
        matrix: &mut DistMatrix<T>,
        subset: &[usize],
        progress: &mut P,
        tolerance: T,
    ) -> Result<(), RazorError> {
        if progress.is_cancelled() {
            return Err(RazorError::Cancelled);
        }
        progress.set_maximum(EXPAND_STAGES);
        progress.set_progress(0);

        let slacks: Vec<Slack<T>> = subset
            .iter()
            .map(|&x| slack_with_argmin(matrix, subset, x))
            .collect();
        progress.increment();
        if slacks.iter().all(|slack| slack.value <= tolerance) {
            progress.set_progress(EXPAND_STAGES);
            return Ok(());
        }

        let mut appended = Vec::new();
        for (&x, slack) in subset.iter().zip(&slacks) {
            if slack.value > tolerance {
                if let Some((y, z)) = slack.witness {
                    let column = aux_row(matrix, x, slack.value, y, z);
                    if find_coincident(matrix, &column, tolerance).is_none() {
                        appended.push(matrix.append_vertex(&column)?);
                    }
                }
            }
        }
        progress.increment();

        let mut candidates: Vec<usize> = subset
            .iter()
            .zip(&slacks)
            .filter(|(_, slack)| slack.value <= tolerance)
            .map(|(&x, _)| x)
            .collect();
        candidates.extend(&appended);
        candidates.sort_unstable();
        let mut candidate_graph = UndirectedGraph::complete(&candidates);
        progress.increment();

        for (u, v) in candidate_graph.edges() {
            if is_redundant_edge(matrix, u, v, tolerance) {
                candidate_graph.remove_edge(u, v);
            }
        }
        progress.increment();

        let unconfirmed: Vec<(usize, usize)> = candidate_graph
            .edges()
            .into_iter()
            .filter(|&(u, v)| candidate_graph.degree(u) > 2 && candidate_graph.degree(v) > 2)
            .collect();
        progress.increment();
        debug!(
            "subset of {}: appended {}, {} unconfirmed edges",
            subset.len(),
            appended.len(),
            unconfirmed.len()
        );
        if unconfirmed.is_empty() {
            return Ok(());
        }

        let induced = candidate_graph.induced_by_edges(&unconfirmed);
        for component in induced.components() {
            self.expand_subset(matrix, &component, progress, tolerance)?;
        }
        Ok(())
    }

    /// Runs the whole reconstruction pipeline: expand the matrix, build
    /// the pre-graph of essential edges, prune the redundant edges among
    /// auxiliary vertices, clean out low-degree artifacts and repair the
    /// resulting metric.
    ///
    /// # Parameters
    /// * `progress` - the listener informed of progress and polled for
    ///                cancellation; use `NoProgress` to opt out
    ///
    /// # Returns
    /// * A result containing the reconstructed network, or the error that
    ///   stopped the run
    ///
    /// # Examples
    /// ```
    /// use razornet::{DistMatrix, NoProgress, Razor};
    ///
    /// let rows = vec![
    ///     vec![0.0, 2.0, 3.0, 3.0],
    ///     vec![2.0, 0.0, 3.0, 3.0],
    ///     vec![3.0, 3.0, 0.0, 2.0],
    ///     vec![3.0, 3.0, 2.0, 0.0],
    /// ];
    /// let matrix = DistMatrix::from_rows(rows).unwrap();
    /// let razor = Razor::default_params(&matrix);
    /// let result = razor.reconstruct(&mut NoProgress).unwrap();
    ///
    /// // The classic quartet tree: two cherries on an internal edge
    /// assert_eq!(6, result.network.node_count());
    /// assert_eq!(5, result.network.edge_count());
    /// assert_eq!(vec![0, 1, 2, 3], result.taxon_indices);
    /// ```
    pub fn reconstruct<P: ProgressListener>(
        &self,
        progress: &mut P,
    ) -> Result<Reconstruction<T>, RazorError> {
        let tolerance = T::from(self.params.tolerance).unwrap();
        let mut expanded = self.matrix.clone();
        self.expand_into(&mut expanded, progress)?;
        let n_taxa = self.n_taxa;
        let is_labeled = move |v: usize| v < n_taxa;

        let pre = pre_graph(&expanded, tolerance);
        debug!("pre-graph has {} essential edges", pre.n_edges());
        let pruned = prune_redundant_edges(&pre, &expanded, is_labeled, tolerance)?;
        let outcome = clean_and_smooth(&expanded, &pruned, is_labeled)?;
        let repaired = enforce_triangle_inequalities(&outcome.matrix.to_rows(), tolerance)?;
        let network = network_from_parts(&outcome.graph, &repaired)?;

        let mut taxon_indices = Vec::with_capacity(n_taxa);
        for taxon in 0..n_taxa {
            let mapped = outcome.old_to_new[taxon].ok_or_else(|| {
                RazorError::WrongShape(format!("taxon {taxon} was lost during cleanup"))
            })?;
            taxon_indices.push(mapped);
        }
        info!(
            "reconstructed a network of {} vertices and {} edges from {n_taxa} taxa",
            outcome.graph.n_vertices(),
            outcome.graph.n_edges()
        );
        Ok(Reconstruction {
            matrix: repaired,
            graph: outcome.graph,
            taxon_indices,
            network,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;

    struct CancelImmediately;

    impl ProgressListener for CancelImmediately {
        fn set_maximum(&mut self, _maximum: usize) {}
        fn set_progress(&mut self, _progress: usize) {}
        fn increment(&mut self) {}
        fn is_cancelled(&self) -> bool {
            true
        }
    }

    fn quartet_metric() -> DistMatrix<f64> {
        DistMatrix::from_rows(vec![
            vec![0.0, 2.0, 3.0, 3.0],
            vec![2.0, 0.0, 3.0, 3.0],
            vec![3.0, 3.0, 0.0, 2.0],
            vec![3.0, 3.0, 2.0, 0.0],
        ])
        .unwrap()
    }

    #[test]
    fn the_quartet_gains_two_internal_vertices() {
        let matrix = quartet_metric();
        let razor = Razor::default_params(&matrix);
        let expanded = razor.expand(&mut NoProgress).unwrap();

        assert_eq!(6, expanded.size());
        assert_eq!(vec![1.0, 1.0, 2.0, 2.0, 0.0, 1.0], expanded.row(4).to_vec());
        assert_eq!(vec![2.0, 2.0, 1.0, 1.0, 1.0, 0.0], expanded.row(5).to_vec());
    }

    #[test]
    fn expansion_is_idempotent() {
        let matrix = quartet_metric();
        let expanded = Razor::default_params(&matrix)
            .expand(&mut NoProgress)
            .unwrap();
        let again = Razor::default_params(&expanded)
            .expand(&mut NoProgress)
            .unwrap();
        assert_eq!(expanded, again);
    }

    #[test]
    fn a_path_metric_needs_no_auxiliary_vertices() {
        let matrix = DistMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ])
        .unwrap();
        let expanded = Razor::default_params(&matrix)
            .expand(&mut NoProgress)
            .unwrap();
        assert_eq!(matrix, expanded);
    }

    #[test]
    fn cancellation_unwinds_without_output() {
        let matrix = quartet_metric();
        let result = Razor::default_params(&matrix).expand(&mut CancelImmediately);
        assert!(matches!(result, Err(RazorError::Cancelled)));
    }

    #[test]
    fn an_immediate_cancellation_appends_nothing() {
        let matrix = quartet_metric();
        let mut working = matrix.clone();
        let result =
            Razor::default_params(&matrix).expand_into(&mut working, &mut CancelImmediately);
        assert!(matches!(result, Err(RazorError::Cancelled)));
        assert_eq!(matrix, working);
    }

    #[test]
    fn invalid_matrices_are_rejected_before_expansion() {
        let matrix = DistMatrix::from_rows(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.5, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ])
        .unwrap();
        let result = Razor::default_params(&matrix).expand(&mut NoProgress);
        assert!(matches!(result, Err(RazorError::AsymmetricMatrix(_))));
    }

    #[test]
    fn reconstruction_recovers_the_quartet_tree() {
        let matrix = quartet_metric();
        let result = Razor::default_params(&matrix)
            .reconstruct(&mut NoProgress)
            .unwrap();

        assert_eq!(
            vec![(0, 4), (1, 4), (2, 5), (3, 5), (4, 5)],
            result.graph.edges()
        );
        assert_eq!(vec![0, 1, 2, 3], result.taxon_indices);
        assert_eq!(6, result.network.node_count());
        assert_eq!(5, result.network.edge_count());
        for &(u, v) in &[(0, 4), (1, 4), (2, 5), (3, 5), (4, 5)] {
            assert_eq!(1.0, result.matrix.get(u, v));
        }
    }
}
