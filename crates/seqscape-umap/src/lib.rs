//! seqscape-umap
//!
//! Host-side projection of embedding matrices: PCA, a brute-force
//! k-nearest-neighbor graph, a UMAP layout, and an SVG scatter plot.
pub mod neighbors;
pub mod pca;
pub mod scatter;
pub mod umap;

pub use neighbors::nearest_neighbors;
pub use pca::{Pca, PcaConfig};
pub use umap::{Umap, UmapConfig};
