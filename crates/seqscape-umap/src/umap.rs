//! UMAP layout over a fuzzy k-nearest-neighbor graph.
//!
//! Follows the reference construction: smoothed-kNN membership strengths,
//! probabilistic t-conorm symmetrization, curve parameters fitted from
//! `min_dist`/`spread`, and edge-sampled SGD on the layout with negative
//! sampling. The layout is seeded from a PCA projection rather than a
//! spectral embedding, which keeps initialization deterministic.
use crate::neighbors::nearest_neighbors;
use crate::pca::{Pca, PcaConfig};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIGMA_MIN: f32 = 1e-3;
const GRAD_CLIP: f32 = 4.0;

#[derive(Debug, Clone, Copy)]
pub struct UmapConfig {
    pub n_neighbors: usize,
    pub n_components: usize,
    pub min_dist: f32,
    pub spread: f32,
    pub n_epochs: usize,
    pub learning_rate: f32,
    pub negative_samples: usize,
    pub seed: u64,
}

impl Default for UmapConfig {
    fn default() -> Self {
        Self {
            n_neighbors: 15,
            n_components: 2,
            min_dist: 0.5,
            spread: 1.0,
            n_epochs: 500,
            learning_rate: 1.0,
            negative_samples: 5,
            seed: 0,
        }
    }
}

pub struct Umap {
    config: UmapConfig,
}

impl Umap {
    pub fn new(config: UmapConfig) -> Self {
        Self { config }
    }

    /// Computes a low-dimensional layout of `data` (rows are observations).
    /// Returns an `n x n_components` matrix. A fixed seed gives a
    /// reproducible layout.
    pub fn fit(&self, data: &Array2<f32>) -> Array2<f32> {
        let cfg = self.config;
        let n = data.nrows();
        if n <= 1 {
            return Array2::zeros((n, cfg.n_components));
        }
        let k = cfg.n_neighbors.min(n - 1);
        let graph = nearest_neighbors(data, k);
        let edges = fuzzy_simplicial_set(&graph);
        let (a, b) = fit_curve_params(cfg.spread, cfg.min_dist);
        log::debug!(
            "umap: {} point(s), {} edge(s), a = {:.4}, b = {:.4}",
            n,
            edges.len(),
            a,
            b
        );

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let mut layout = pca_init(data, cfg.n_components, &mut rng);
        optimize_layout(&mut layout, &edges, n, a, b, &cfg, &mut rng);
        layout
    }
}

/// Per-point smoothing of the kNN distances: `rho` is the distance to the
/// nearest non-identical neighbor, and `sigma` is chosen by binary search so
/// that the total membership strength equals `log2(k)`.
fn smooth_knn(dists: &[f32], k: usize) -> (f32, f32) {
    let rho = dists.iter().copied().find(|&d| d > 0.0).unwrap_or(0.0);
    let target = (k as f32).log2();
    let psum = |sigma: f32| -> f32 {
        dists
            .iter()
            .map(|&d| (-(d - rho).max(0.0) / sigma).exp())
            .sum()
    };
    let mut lo = 0.0f32;
    let mut hi = f32::INFINITY;
    let mut sigma = 1.0f32;
    for _ in 0..64 {
        if psum(sigma) > target {
            hi = sigma;
            sigma = (lo + hi) / 2.0;
        } else {
            lo = sigma;
            sigma = if hi.is_infinite() {
                sigma * 2.0
            } else {
                (lo + hi) / 2.0
            };
        }
    }
    (rho, sigma.max(SIGMA_MIN))
}

/// Converts the directed kNN graph into a symmetric weighted edge list via
/// the probabilistic t-conorm `w_ij + w_ji - w_ij * w_ji`.
fn fuzzy_simplicial_set(graph: &[Vec<(usize, f32)>]) -> Vec<(usize, usize, f32)> {
    use std::collections::HashMap;

    let mut directed: HashMap<(usize, usize), f32> = HashMap::new();
    for (i, nn) in graph.iter().enumerate() {
        if nn.is_empty() {
            continue;
        }
        let dists: Vec<f32> = nn.iter().map(|&(_, d)| d).collect();
        let (rho, sigma) = smooth_knn(&dists, nn.len());
        for &(j, d) in nn {
            let w = (-(d - rho).max(0.0) / sigma).exp();
            directed.insert((i, j), w);
        }
    }

    let mut edges = Vec::new();
    for (&(i, j), &w_ij) in &directed {
        if i > j {
            continue;
        }
        let w_ji = if i == j {
            0.0
        } else {
            directed.get(&(j, i)).copied().unwrap_or(0.0)
        };
        let w = w_ij + w_ji - w_ij * w_ji;
        if w > 0.0 {
            edges.push((i, j, w));
        }
    }
    // one entry per unordered pair: pairs seen only as (j, i) with j > i
    for (&(j, i), &w_ji) in &directed {
        if j <= i || directed.contains_key(&(i, j)) {
            continue;
        }
        edges.push((i, j, w_ji));
    }
    edges.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));
    edges
}

/// Fits the rational curve `1 / (1 + a x^(2b))` to the target membership
/// decay defined by `spread` and `min_dist`, by two-stage grid search.
pub fn fit_curve_params(spread: f32, min_dist: f32) -> (f32, f32) {
    let xs: Vec<f32> = (1..=300).map(|i| i as f32 * spread * 3.0 / 300.0).collect();
    let psi: Vec<f32> = xs
        .iter()
        .map(|&x| {
            if x <= min_dist {
                1.0
            } else {
                (-(x - min_dist) / spread).exp()
            }
        })
        .collect();
    let sse = |a: f32, b: f32| -> f32 {
        xs.iter()
            .zip(&psi)
            .map(|(&x, &t)| {
                let f = 1.0 / (1.0 + a * x.powf(2.0 * b));
                (f - t) * (f - t)
            })
            .sum()
    };

    let mut best = (1.0f32, 1.0f32, f32::INFINITY);
    for ai in 0..80 {
        let a = 10f32.powf(-3.0 + 4.0 * ai as f32 / 79.0);
        for bi in 0..60 {
            let b = 0.1 + 2.4 * bi as f32 / 59.0;
            let e = sse(a, b);
            if e < best.2 {
                best = (a, b, e);
            }
        }
    }
    let (a0, b0, _) = best;
    for ai in 0..40 {
        let a = a0 * 10f32.powf(-0.15 + 0.3 * ai as f32 / 39.0);
        for bi in 0..40 {
            let b = (b0 - 0.1 + 0.2 * bi as f32 / 39.0).max(0.01);
            let e = sse(a, b);
            if e < best.2 {
                best = (a, b, e);
            }
        }
    }
    (best.0, best.1)
}

/// PCA projection rescaled to a max-abs coordinate of 10, with a small
/// jitter so coincident points can separate during optimization.
fn pca_init(data: &Array2<f32>, n_components: usize, rng: &mut StdRng) -> Array2<f32> {
    let n = data.nrows();
    let reduced = Pca::new(PcaConfig { n_components }).fit_transform(data);
    let mut layout = Array2::<f32>::zeros((n, n_components));
    let max_abs = reduced.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    let scale = if max_abs > 0.0 { 10.0 / max_abs } else { 1.0 };
    for i in 0..n {
        for c in 0..n_components {
            let base = if c < reduced.ncols() {
                reduced[[i, c]] * scale
            } else {
                0.0
            };
            layout[[i, c]] = base + rng.gen_range(-1e-4..1e-4);
        }
    }
    layout
}

fn optimize_layout(
    layout: &mut Array2<f32>,
    edges: &[(usize, usize, f32)],
    n: usize,
    a: f32,
    b: f32,
    cfg: &UmapConfig,
    rng: &mut StdRng,
) {
    if edges.is_empty() {
        return;
    }
    let dim = cfg.n_components;
    let max_w = edges.iter().fold(0.0f32, |m, e| m.max(e.2));
    let epochs_per_sample: Vec<f32> = edges.iter().map(|e| max_w / e.2).collect();
    let mut epoch_of_next_sample = epochs_per_sample.clone();

    let sq_dist = |layout: &Array2<f32>, i: usize, j: usize| -> f32 {
        (0..dim)
            .map(|c| {
                let d = layout[[i, c]] - layout[[j, c]];
                d * d
            })
            .sum()
    };

    for epoch in 0..cfg.n_epochs {
        let alpha = cfg.learning_rate * (1.0 - epoch as f32 / cfg.n_epochs as f32);
        for (e, &(i, j, _)) in edges.iter().enumerate() {
            if epoch_of_next_sample[e] > epoch as f32 {
                continue;
            }
            epoch_of_next_sample[e] += epochs_per_sample[e];

            let d2 = sq_dist(layout, i, j);
            if d2 > 0.0 {
                let coeff = (-2.0 * a * b * d2.powf(b - 1.0)) / (1.0 + a * d2.powf(b));
                for c in 0..dim {
                    let g = clip(coeff * (layout[[i, c]] - layout[[j, c]]));
                    layout[[i, c]] += alpha * g;
                    layout[[j, c]] -= alpha * g;
                }
            }

            for _ in 0..cfg.negative_samples {
                let t = rng.gen_range(0..n);
                if t == i {
                    continue;
                }
                let d2 = sq_dist(layout, i, t);
                if d2 > 0.0 {
                    let coeff = (2.0 * b) / ((0.001 + d2) * (1.0 + a * d2.powf(b)));
                    for c in 0..dim {
                        let g = clip(coeff * (layout[[i, c]] - layout[[t, c]]));
                        layout[[i, c]] += alpha * g;
                    }
                } else {
                    for c in 0..dim {
                        layout[[i, c]] += alpha * GRAD_CLIP;
                    }
                }
            }
        }
    }
}

fn clip(x: f32) -> f32 {
    x.clamp(-GRAD_CLIP, GRAD_CLIP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn two_blobs(per_blob: usize, dims: usize, offset: f32) -> Array2<f32> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut data = Array2::<f32>::zeros((2 * per_blob, dims));
        for i in 0..2 * per_blob {
            let center = if i < per_blob { 0.0 } else { offset };
            for c in 0..dims {
                data[[i, c]] = center + rng.gen_range(-0.5..0.5);
            }
        }
        data
    }

    #[test]
    fn test_layout_shape_and_finiteness() {
        let data = two_blobs(15, 10, 100.0);
        let layout = Umap::new(UmapConfig {
            n_neighbors: 8,
            n_epochs: 50,
            ..Default::default()
        })
        .fit(&data);
        assert_eq!(layout.dim(), (30, 2));
        assert!(layout.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_separated_blobs_stay_separated() {
        let per_blob = 20;
        let data = two_blobs(per_blob, 5, 100.0);
        let layout = Umap::new(UmapConfig {
            n_neighbors: 8,
            n_epochs: 200,
            ..Default::default()
        })
        .fit(&data);

        let centroid = |range: std::ops::Range<usize>| -> (f32, f32) {
            let len = range.len() as f32;
            let (mut x, mut y) = (0.0, 0.0);
            for i in range {
                x += layout[[i, 0]];
                y += layout[[i, 1]];
            }
            (x / len, y / len)
        };
        let (ax, ay) = centroid(0..per_blob);
        let (bx, by) = centroid(per_blob..2 * per_blob);
        let inter = ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt();

        let spread = |range: std::ops::Range<usize>, cx: f32, cy: f32| -> f32 {
            let len = range.len() as f32;
            range
                .map(|i| ((layout[[i, 0]] - cx).powi(2) + (layout[[i, 1]] - cy).powi(2)).sqrt())
                .sum::<f32>()
                / len
        };
        let intra = spread(0..per_blob, ax, ay).max(spread(per_blob..2 * per_blob, bx, by));
        assert!(
            inter > intra,
            "blobs merged: inter = {inter}, intra = {intra}"
        );
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        let data = two_blobs(10, 4, 50.0);
        let cfg = UmapConfig {
            n_neighbors: 5,
            n_epochs: 30,
            seed: 7,
            ..Default::default()
        };
        let a = Umap::new(cfg).fit(&data);
        let b = Umap::new(cfg).fit(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_inputs() {
        let empty = Array2::<f32>::zeros((0, 3));
        assert_eq!(Umap::new(UmapConfig::default()).fit(&empty).dim(), (0, 2));
        let single = Array2::<f32>::zeros((1, 3));
        assert_eq!(Umap::new(UmapConfig::default()).fit(&single).dim(), (1, 2));
    }

    #[test]
    fn test_smooth_knn_hits_target_membership() {
        let dists: Vec<f32> = (1..=8).map(|i| i as f32).collect();
        let (rho, sigma) = smooth_knn(&dists, 8);
        assert_eq!(rho, 1.0);
        let total: f32 = dists.iter().map(|&d| (-(d - rho).max(0.0) / sigma).exp()).sum();
        assert!((total - 8f32.log2()).abs() < 1e-3);
    }

    #[test]
    fn test_fitted_curve_is_a_decreasing_membership() {
        let (a, b) = fit_curve_params(1.0, 0.5);
        assert!(a > 0.0 && b > 0.0);
        let f = |x: f32| 1.0 / (1.0 + a * x.powf(2.0 * b));
        assert!(f(0.1) > f(1.0));
        assert!(f(1.0) > f(2.0));
        // near min_dist the membership is still close to one
        assert!(f(0.4) > 0.8);
    }
}
