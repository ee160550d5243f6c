use rand::Rng;

/// Maximum Lloyd iterations before giving up on convergence.
pub(crate) const MAX_ITERATIONS: usize = 50;

/// Squared Euclidean distance between two planar coordinates.
#[inline]
pub(crate) fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Pick `k` initial centers with probability proportional to squared distance
/// from the centers chosen so far (k-means++ seeding).
pub(crate) fn initialize_centers(coords: &[[f64; 2]], k: usize, rng: &mut impl Rng) -> Vec<[f64; 2]> {
    assert!(k >= 1 && k <= coords.len(), "k must be in [1, {}]", coords.len());

    let mut centers = Vec::with_capacity(k);
    centers.push(coords[rng.random_range(0..coords.len())]);

    let mut dist = coords.iter()
        .map(|&c| squared_distance(c, centers[0]))
        .collect::<Vec<_>>();

    while centers.len() < k {
        let total: f64 = dist.iter().sum();
        let next = if total > 0.0 {
            // Sample an index weighted by current distance-squared.
            let mut target = rng.random::<f64>() * total;
            let mut chosen = coords.len() - 1;
            for (idx, &d) in dist.iter().enumerate() {
                target -= d;
                if target <= 0.0 { chosen = idx; break }
            }
            chosen
        } else {
            // All points coincide with a center; any choice is as good.
            rng.random_range(0..coords.len())
        };

        centers.push(coords[next]);
        for (idx, d) in dist.iter_mut().enumerate() {
            *d = d.min(squared_distance(coords[idx], coords[next]));
        }
    }

    centers
}

/// Assign every coordinate to its nearest center.
pub(crate) fn nearest_labels(coords: &[[f64; 2]], centers: &[[f64; 2]]) -> Vec<usize> {
    coords.iter()
        .map(|&c| {
            centers.iter().enumerate()
                .map(|(idx, &center)| (idx, squared_distance(c, center)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(idx, _)| idx)
                .unwrap_or(0)
        })
        .collect()
}

/// Recompute each center as the mean of its assigned coordinates. An empty
/// cluster is re-seeded to a coordinate chosen by `rng`.
pub(crate) fn update_centers(
    coords: &[[f64; 2]],
    labels: &[usize],
    k: usize,
    rng: &mut impl Rng,
) -> Vec<[f64; 2]> {
    let mut sums = vec![[0.0; 2]; k];
    let mut counts = vec![0usize; k];
    for (&coord, &label) in coords.iter().zip(labels) {
        sums[label][0] += coord[0];
        sums[label][1] += coord[1];
        counts[label] += 1;
    }

    sums.iter().zip(&counts)
        .map(|(&sum, &count)| {
            if count > 0 {
                [sum[0] / count as f64, sum[1] / count as f64]
            } else {
                coords[rng.random_range(0..coords.len())]
            }
        })
        .collect()
}

/// Plain (unconstrained) k-means: per-coordinate labels in `[0, k)`.
/// Deterministic for a fixed `rng` state.
pub(crate) fn lloyd(coords: &[[f64; 2]], k: usize, rng: &mut impl Rng) -> Vec<usize> {
    assert!(k >= 1 && k <= coords.len(), "k must be in [1, {}]", coords.len());
    if k == 1 { return vec![0; coords.len()] }

    let mut centers = initialize_centers(coords, k, rng);
    let mut labels = nearest_labels(coords, &centers);

    for _ in 0..MAX_ITERATIONS {
        centers = update_centers(coords, &labels, k, rng);
        let next = nearest_labels(coords, &centers);
        if next == labels { break }
        labels = next;
    }

    labels
}
