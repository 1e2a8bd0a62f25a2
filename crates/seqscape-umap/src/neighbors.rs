//! Brute-force k-nearest-neighbor graph construction.
use ndarray::Array2;

/// For each row of `data`, the indices and Euclidean distances of its `k`
/// nearest other rows, ascending by distance. `k` is clamped to `n - 1`.
pub fn nearest_neighbors(data: &Array2<f32>, k: usize) -> Vec<Vec<(usize, f32)>> {
    let n = data.nrows();
    let k = k.min(n.saturating_sub(1));
    let mut graph = Vec::with_capacity(n);
    for i in 0..n {
        let mut dists: Vec<(usize, f32)> = (0..n)
            .filter(|&j| j != i)
            .map(|j| {
                let diff = &data.row(i) - &data.row(j);
                (j, diff.dot(&diff).sqrt())
            })
            .collect();
        dists.sort_by(|a, b| a.1.total_cmp(&b.1));
        dists.truncate(k);
        graph.push(dists);
    }
    graph
}
