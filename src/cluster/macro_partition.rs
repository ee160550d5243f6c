//! Coarse macro partition of the full point set.
//!
//! Macro groups exist purely to bound the cost of the capacity-constrained
//! stage; they are disjoint, cover all points, and are discarded once micro
//! clustering has run.

use rand::Rng;

use crate::cluster::kmeans;
use crate::config::{MacroStrategy, PlanConfig};
use crate::types::Homepass;

/// Number of macro groups for `n` points: floor(n / chunk_size), at least 1.
#[inline]
pub(crate) fn num_macro_groups(num_points: usize, chunk_size: usize) -> usize {
    (num_points / chunk_size).max(1)
}

/// Assign a macro label in `[0, num_macro_groups)` to every point.
pub(crate) fn partition(
    points: &[Homepass],
    config: &PlanConfig,
    rng: &mut impl Rng,
) -> (Vec<usize>, usize) {
    assert!(!points.is_empty(), "macro partition requires at least one point");

    // Clamp so clustering never receives more groups than points.
    let k = num_macro_groups(points.len(), config.chunk_size).min(points.len());
    if k == 1 {
        return (vec![0; points.len()], 1);
    }

    let labels = match config.macro_strategy {
        MacroStrategy::Clustering => {
            let coords = points.iter()
                .map(|p| [p.lon, p.lat])
                .collect::<Vec<_>>();
            kmeans::lloyd(&coords, k, rng)
        }
        MacroStrategy::Sweep => sweep(points, k),
    };

    (labels, k)
}

/// East-to-west sweep: sort by descending longitude (ties broken by input
/// order), then cut the rank sequence into `k` equal-frequency bins.
fn sweep(points: &[Homepass], k: usize) -> Vec<usize> {
    let mut order = (0..points.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        points[b].lon.total_cmp(&points[a].lon).then(a.cmp(&b))
    });

    let n = points.len();
    let mut labels = vec![0; n];
    for (rank, &idx) in order.iter().enumerate() {
        labels[idx] = rank * k / n;
    }
    labels
}
