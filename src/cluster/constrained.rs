//! Capacity-constrained micro clustering within each macro group.
//!
//! Size-constrained k-means: alternate a bounded transportation matching
//! (assignment step) with a centroid update, until the assignment stabilizes
//! or the iteration cap is hit. The matching enforces the hard occupancy
//! bounds [1, max_capacity] that nearest-center assignment would violate.

use anyhow::{Context, Result, ensure};
use rand::Rng;

use crate::cluster::kmeans;
use crate::cluster::transport::solve_bounded_assignment;
use crate::config::PlanConfig;
use crate::types::{GroupId, Homepass};

/// Number of micro clusters for a macro group of `m` points. Always feasible:
/// `n_micro <= m` and `n_micro * max_capacity >= m`.
#[inline]
pub(crate) fn num_micro_groups(group_size: usize, max_capacity: usize) -> usize {
    group_size.div_ceil(max_capacity).max(1).min(group_size)
}

/// Cluster every macro group under the capacity bound and produce globally
/// unique final labels. Returns the per-point labels and total group count.
pub(crate) fn cluster(
    points: &[Homepass],
    macro_labels: &[usize],
    num_macro: usize,
    config: &PlanConfig,
    rng: &mut impl Rng,
) -> Result<(Vec<GroupId>, u32)> {
    assert_eq!(points.len(), macro_labels.len(), "one macro label per point");

    let mut labels = vec![GroupId(0); points.len()];
    let mut offset = 0u32; // running counter keeps final ids unique across macro groups

    for macro_id in 0..num_macro {
        let members = macro_labels.iter().enumerate()
            .filter_map(|(idx, &label)| (label == macro_id).then_some(idx))
            .collect::<Vec<_>>();
        if members.is_empty() { continue }

        let local = cluster_one(points, &members, config, rng)
            .with_context(|| format!("micro clustering failed in macro group {macro_id}"))?;

        let num_local = local.iter().copied().max().unwrap_or(0) as u32 + 1;
        for (&idx, &label) in members.iter().zip(&local) {
            labels[idx] = GroupId(offset + label as u32);
        }
        offset += num_local;
    }

    verify_capacity(&labels, offset, config.max_capacity)?;
    Ok((labels, offset))
}

/// Constrained k-means for one macro group; returns local labels in
/// `[0, n_micro)` with every class size in `[1, max_capacity]`.
fn cluster_one(
    points: &[Homepass],
    members: &[usize],
    config: &PlanConfig,
    rng: &mut impl Rng,
) -> Result<Vec<usize>> {
    let m = members.len();
    let n_micro = num_micro_groups(m, config.max_capacity);
    if n_micro == 1 {
        return Ok(vec![0; m]);
    }

    let coords = members.iter()
        .map(|&idx| [points[idx].lon, points[idx].lat])
        .collect::<Vec<_>>();

    let mut centers = kmeans::initialize_centers(&coords, n_micro, rng);
    let mut labels = Vec::new();

    for _ in 0..kmeans::MAX_ITERATIONS {
        let costs = coords.iter()
            .map(|&c| centers.iter().map(|&center| kmeans::squared_distance(c, center)).collect())
            .collect::<Vec<Vec<f64>>>();

        let next = solve_bounded_assignment(&costs, config.max_capacity)?;
        let stable = next == labels;
        labels = next;
        if stable { break }

        centers = kmeans::update_centers(&coords, &labels, n_micro, rng);
    }

    Ok(labels)
}

/// Capacity invariants must hold for downstream geometry to be meaningful;
/// a violation here is a bug, surfaced as an error rather than patched up.
fn verify_capacity(labels: &[GroupId], num_groups: u32, max_capacity: usize) -> Result<()> {
    let mut sizes = vec![0usize; num_groups as usize];
    for label in labels {
        sizes[label.0 as usize] += 1;
    }
    for (group, &size) in sizes.iter().enumerate() {
        ensure!(size >= 1, "group {group} is empty");
        ensure!(
            size <= max_capacity,
            "group {group} holds {size} points, exceeding capacity {max_capacity}"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid(n: usize) -> Vec<Homepass> {
        (0..n)
            .map(|i| {
                Homepass::new(
                    i as u64,
                    106.8 + (i % 8) as f64 * 5e-5,
                    -6.2 + (i / 8) as f64 * 5e-5,
                )
            })
            .collect()
    }

    #[test]
    fn micro_group_count_matches_ceiling() {
        assert_eq!(num_micro_groups(40, 16), 3);
        assert_eq!(num_micro_groups(16, 16), 1);
        assert_eq!(num_micro_groups(17, 16), 2);
        assert_eq!(num_micro_groups(1, 16), 1);
        // Clamp: never more clusters than points.
        assert_eq!(num_micro_groups(3, 1), 3);
    }

    #[test]
    fn sizes_respect_capacity_and_cover_everything() {
        let points = grid(40);
        let macro_labels = vec![0; 40];
        let config = PlanConfig { max_capacity: 16, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(42);

        let (labels, num_groups) = cluster(&points, &macro_labels, 1, &config, &mut rng).unwrap();

        assert_eq!(num_groups, 3);
        let mut sizes = vec![0usize; num_groups as usize];
        for label in &labels { sizes[label.0 as usize] += 1 }
        assert_eq!(sizes.iter().sum::<usize>(), 40);
        assert!(sizes.iter().all(|&s| (1..=16).contains(&s)), "sizes {sizes:?}");
    }

    #[test]
    fn global_ids_are_offset_across_macro_groups() {
        let points = grid(20);
        // Two macro groups of 10; capacity 4 gives ceil(10/4) = 3 each.
        let macro_labels = (0..20).map(|i| i / 10).collect::<Vec<_>>();
        let config = PlanConfig { max_capacity: 4, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(42);

        let (labels, num_groups) = cluster(&points, &macro_labels, 2, &config, &mut rng).unwrap();

        assert_eq!(num_groups, 6);
        let first: Vec<u32> = labels[..10].iter().map(|g| g.0).collect();
        let second: Vec<u32> = labels[10..].iter().map(|g| g.0).collect();
        assert!(first.iter().all(|&g| g < 3));
        assert!(second.iter().all(|&g| (3..6).contains(&g)));
    }

    #[test]
    fn single_point_macro_group_gets_its_own_group() {
        let points = grid(1);
        let config = PlanConfig::default();
        let mut rng = StdRng::seed_from_u64(42);
        let (labels, num_groups) = cluster(&points, &[0], 1, &config, &mut rng).unwrap();
        assert_eq!(num_groups, 1);
        assert_eq!(labels, vec![GroupId(0)]);
    }

    #[test]
    fn capacity_one_gives_one_point_per_group() {
        let points = grid(5);
        let config = PlanConfig { max_capacity: 1, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(42);
        let (labels, num_groups) = cluster(&points, &vec![0; 5], 1, &config, &mut rng).unwrap();

        assert_eq!(num_groups, 5);
        let mut seen = labels.iter().map(|g| g.0).collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let points = grid(30);
        let config = PlanConfig { max_capacity: 7, ..Default::default() };

        let a = cluster(&points, &vec![0; 30], 1, &config, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = cluster(&points, &vec![0; 30], 1, &config, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
