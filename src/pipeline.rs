use ahash::AHashSet;
use anyhow::{Context, Result, bail};
use geo::LineString;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::boundary;
use crate::cluster;
use crate::config::{BoundaryPolicy, PlanConfig};
use crate::types::{Assignment, Boundary, Homepass, ServiceGroup};

/// Aggregate diagnostics for one run. Boundary-stage degradations are
/// collected here instead of failing the run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub num_points: usize,
    pub num_macro_groups: usize,
    pub num_groups: u32,
    /// Groups too small or too degenerate for a hull polygon.
    pub skipped_small_groups: usize,
    /// Voronoi cells dropped because the centroid join found zero or several owners.
    pub ambiguous_cells: usize,
    /// Voronoi cells that clipped away to nothing.
    pub degenerate_cells: usize,
    /// Road-cut pieces discarded for containing none of their group's points.
    pub discarded_pieces: usize,
    /// Road cutting was requested but road data was unavailable or empty.
    pub road_cut_degraded: bool,
}

/// Everything a rendering collaborator needs from one run.
#[derive(Clone, Debug)]
pub struct PlanOutcome {
    pub assignment: Assignment,
    pub groups: Vec<ServiceGroup>,
    pub boundaries: Vec<Boundary>,
    pub report: RunReport,
}

/// The full planning pipeline: macro partition, capacity-constrained micro
/// clustering, boundary synthesis, optional road cutting. One instance runs
/// one point set; nothing is shared between concurrent invocations.
pub struct Pipeline {
    config: PlanConfig,
    verbose: u8,
}

impl Pipeline {
    /// Validate the configuration and build a pipeline.
    pub fn new(config: PlanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, verbose: 0 })
    }

    /// Set stderr diagnostics verbosity (0 = silent).
    pub fn verbose(mut self, verbose: u8) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the pipeline. `roads` is the optional road-centerline set covering
    /// the point extent; `None` (or an empty set) skips road cutting.
    pub fn run(
        &self,
        points: &[Homepass],
        roads: Option<&[LineString<f64>]>,
    ) -> Result<PlanOutcome> {
        validate_points(points)?;
        let config = &self.config;
        let mut report = RunReport { num_points: points.len(), ..Default::default() };
        let mut rng = StdRng::seed_from_u64(config.seed);

        let (macro_labels, num_macro) = cluster::macro_partition(points, config, &mut rng);
        report.num_macro_groups = num_macro;
        if self.verbose > 0 {
            eprintln!("[macro] {} points -> {num_macro} macro groups", points.len());
        }

        let (labels, num_groups) = cluster::micro_cluster(points, &macro_labels, num_macro, config, &mut rng)
            .context("capacity-constrained clustering failed")?;
        let assignment = Assignment::new(labels, num_groups);
        let groups = assignment.groups();
        report.num_groups = num_groups;
        if self.verbose > 0 {
            eprintln!("[micro] {num_groups} ODP groups (capacity {})", config.max_capacity);
        }

        let boundaries = match config.boundary_policy {
            BoundaryPolicy::Voronoi => {
                boundary::voronoi_boundaries(points, &groups, config, &mut report)
            }
            BoundaryPolicy::ConvexHull => {
                boundary::hull_boundaries(points, &groups, &mut report)
            }
        };
        if self.verbose > 0 {
            eprintln!(
                "[boundary] {} polygons ({} ambiguous, {} degenerate, {} skipped)",
                boundaries.len(),
                report.ambiguous_cells,
                report.degenerate_cells,
                report.skipped_small_groups,
            );
        }

        let boundaries = if config.road_cutting {
            let roads = roads.unwrap_or(&[]);
            let cut = boundary::cut_boundaries(
                boundaries, roads, points, &assignment, config, &mut report,
            )?;
            if self.verbose > 0 {
                if report.road_cut_degraded {
                    eprintln!("[roads] no road data, boundaries left uncut");
                } else {
                    eprintln!(
                        "[roads] cut against {} road lines, {} pieces discarded",
                        roads.len(),
                        report.discarded_pieces,
                    );
                }
            }
            cut
        } else {
            boundaries
        };

        Ok(PlanOutcome { assignment, groups, boundaries, report })
    }
}

/// Input contract: at least one point, ids unique within the sequence.
fn validate_points(points: &[Homepass]) -> Result<()> {
    if points.is_empty() {
        bail!("no usable points: input is empty after filtering");
    }
    let mut seen = AHashSet::with_capacity(points.len());
    for p in points {
        if !seen.insert(p.id) {
            bail!("duplicate point id {:?}", p.id);
        }
        if !p.lon.is_finite() || !p.lat.is_finite() {
            bail!("non-finite coordinates on point {:?}", p.id);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HomepassId;

    #[test]
    fn empty_input_is_a_terminal_failure() {
        let pipeline = Pipeline::new(PlanConfig::default()).unwrap();
        assert!(pipeline.run(&[], None).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let points = vec![
            Homepass::new(7, 106.8, -6.2),
            Homepass::new(7, 106.9, -6.3),
        ];
        let err = validate_points(&points).unwrap_err();
        assert!(err.to_string().contains("duplicate"), "{err}");
        assert_eq!(points[0].id, HomepassId(7));
    }

    #[test]
    fn invalid_config_fails_at_construction() {
        let config = PlanConfig { max_capacity: 0, ..Default::default() };
        assert!(Pipeline::new(config).is_err());
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let points = vec![Homepass::new(1, f64::NAN, -6.2)];
        assert!(validate_points(&points).is_err());
    }
}
