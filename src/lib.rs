//! Distance-based phylogenetic network reconstruction ("Razor") in Rust. Generic over floating
//! point numeric types.
//!
//! Razor turns a matrix of pairwise distances between taxa into an undirected, weighted
//! phylogenetic network. The main benefits of Razor are that:
//!  1. It does not assume the distances fit a tree, as classical reconstruction algorithms
//!     do. Real world data carries noise, recombination and hybridisation signals; wherever
//!     the four-point condition fails locally, Razor splits off an auxiliary internal vertex
//!     instead of forcing the data onto the nearest tree;
//!  2. It works from distances alone. Any dissimilarity source will do, so the input can come
//!     from sequence alignments, gene frequencies or anything else that yields a symmetric
//!     matrix; and
//!  3. Every original taxon survives into the result. Auxiliary vertices are only ever added
//!     between taxa, and the post-processing passes that remove structure only ever remove
//!     what the remaining network already explains.
//!
//! The recursive expansion at the heart of this crate follows the split decomposition family
//! of methods; the references below give the wider context for reconstructing networks rather
//! than trees from distance data.
//!
//! # Examples
//! ```
//!use razornet::{DistMatrix, NoProgress, Razor};
//!
//!let rows = vec![
//!    vec![0.0, 2.0, 3.0, 3.0],
//!    vec![2.0, 0.0, 3.0, 3.0],
//!    vec![3.0, 3.0, 0.0, 2.0],
//!    vec![3.0, 3.0, 2.0, 0.0],
//!];
//!let matrix = DistMatrix::from_rows(rows).unwrap();
//!let razor = Razor::default_params(&matrix);
//!let result = razor.reconstruct(&mut NoProgress).unwrap();
//!assert_eq!(result.graph.edges(), vec![(0, 4), (1, 4), (2, 5), (3, 5), (4, 5)]);
//! ```
//!
//! # References
//! * [Bandelt, H.-J.; Dress, A.W.M. Split decomposition: a new and useful approach to phylogenetic analysis of distance data.](https://doi.org/10.1016/1055-7903(92)90021-8)
//! * [Bryant, D.; Moulton, V. Neighbor-Net: an agglomerative method for the construction of phylogenetic networks.](https://doi.org/10.1093/molbev/msh018)
//! * [Huson, D.H.; Bryant, D. Application of phylogenetic networks in evolutionary studies.](https://doi.org/10.1093/molbev/msj030)

pub use crate::clean::{clean_and_smooth, CleanOutcome};
pub use crate::error::RazorError;
pub use crate::graph::UndirectedGraph;
pub use crate::matrix::DistMatrix;
pub use crate::metric_repair::enforce_triangle_inequalities;
pub use crate::network::{network_from_parts, NetworkGraph};
pub use crate::params::{RazorParams, RazorParamsBuilder};
pub use crate::polish::polish_hubs;
pub use crate::progress::{NoProgress, ProgressListener};
pub use crate::prune::{prune_network, prune_redundant_edges, PruneSubstrate};
pub use crate::razor::{Razor, Reconstruction};
pub use crate::shortest_path::{
    all_shortest_paths, is_superfluous, shortest_distance, EdgeWeightedGraph, MatrixWeighted,
    OverlayWeighted, PathResult,
};
pub use crate::slack::{
    aux_row, find_coincident, is_essential_edge, is_redundant_edge, pre_graph, slack_with_argmin,
    Slack,
};

mod clean;
mod error;
mod graph;
mod matrix;
mod metric_repair;
mod network;
mod params;
mod polish;
mod progress;
mod prune;
mod razor;
mod shortest_path;
mod slack;
mod validation;
