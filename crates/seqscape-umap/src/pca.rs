//! Principal component analysis by power iteration with deflation.
use ndarray::{Array1, Array2, Axis};

#[derive(Debug, Clone, Copy)]
pub struct PcaConfig {
    pub n_components: usize,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self { n_components: 10 }
    }
}

pub struct Pca {
    config: PcaConfig,
}

impl Pca {
    pub fn new(config: PcaConfig) -> Self {
        Self { config }
    }

    /// Projects `data` (rows are observations) onto its leading principal
    /// components, returning an `n x k` matrix. `k` is the configured
    /// component count clamped to the data dimensions.
    pub fn fit_transform(&self, data: &Array2<f32>) -> Array2<f32> {
        let (n, d) = data.dim();
        let k = self.config.n_components.min(n).min(d);
        if n == 0 || k == 0 {
            return Array2::zeros((n, 0));
        }

        let mean = data.mean_axis(Axis(0)).expect("n > 0");
        let centered = data - &mean.view().insert_axis(Axis(0));
        let divisor = if n > 1 { (n - 1) as f32 } else { 1.0 };
        let mut cov = centered.t().dot(&centered) / divisor;

        let mut components = Array2::<f32>::zeros((k, d));
        for c in 0..k {
            let v = dominant_eigenvector(&cov);
            let lambda = v.dot(&cov.dot(&v));
            // deflate: cov -= lambda * v v^T
            let outer = outer_product(&v, &v);
            cov = cov - outer * lambda;
            components.row_mut(c).assign(&v);
        }

        centered.dot(&components.t())
    }
}

/// Power iteration, seeded from the axis with the largest variance so the
/// start vector is not orthogonal to the target in practice.
fn dominant_eigenvector(cov: &Array2<f32>) -> Array1<f32> {
    let d = cov.nrows();
    let seed_axis = (0..d)
        .max_by(|&a, &b| cov[[a, a]].total_cmp(&cov[[b, b]]))
        .unwrap_or(0);
    let mut v = Array1::<f32>::zeros(d);
    v[seed_axis] = 1.0;
    for _ in 0..200 {
        let next = cov.dot(&v);
        let norm = next.dot(&next).sqrt();
        if norm <= f32::EPSILON {
            // degenerate (zero-variance) covariance
            return v;
        }
        let next = next / norm;
        let delta = (&next - &v).mapv(f32::abs).sum();
        v = next;
        if delta < 1e-7 {
            break;
        }
    }
    v
}

fn outer_product(a: &Array1<f32>, b: &Array1<f32>) -> Array2<f32> {
    let (la, lb) = (a.len(), b.len());
    let mut out = Array2::<f32>::zeros((la, lb));
    for i in 0..la {
        for j in 0..lb {
            out[[i, j]] = a[i] * b[j];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_output_shape_clamped_to_data_dims() {
        let data = Array2::<f32>::zeros((5, 3));
        let reduced = Pca::new(PcaConfig { n_components: 10 }).fit_transform(&data);
        assert_eq!(reduced.dim(), (5, 3));
    }

    #[test]
    fn test_recovers_dominant_direction() {
        // points along (0.6, 0.8) with no noise
        let ts = [-2.0f32, -1.0, 0.0, 1.0, 2.0];
        let mut data = Array2::<f32>::zeros((5, 2));
        for (i, t) in ts.iter().enumerate() {
            data[[i, 0]] = 0.6 * t;
            data[[i, 1]] = 0.8 * t;
        }
        let reduced = Pca::new(PcaConfig { n_components: 1 }).fit_transform(&data);
        assert_eq!(reduced.dim(), (5, 1));
        // projection onto the dominant axis restores the parameter t (up to sign)
        let sign = reduced[[4, 0]].signum();
        for (i, t) in ts.iter().enumerate() {
            assert_relative_eq!(sign * reduced[[i, 0]], *t, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_components_ordered_by_variance() {
        // variance along x is much larger than along y
        let data = array![
            [-10.0f32, -1.0],
            [-5.0, 1.0],
            [0.0, -1.0],
            [5.0, 1.0],
            [10.0, -1.0],
        ];
        let reduced = Pca::new(PcaConfig { n_components: 2 }).fit_transform(&data);
        let var = |col: usize| {
            let c = reduced.column(col);
            let m = c.mean().unwrap();
            c.iter().map(|v| (v - m).powi(2)).sum::<f32>()
        };
        assert!(var(0) > var(1));
    }

    #[test]
    fn test_zero_variance_input() {
        let data = Array2::<f32>::ones((4, 3));
        let reduced = Pca::new(PcaConfig { n_components: 2 }).fit_transform(&data);
        assert_eq!(reduced.dim(), (4, 2));
        assert!(reduced.iter().all(|v| v.abs() < 1e-6));
    }
}
