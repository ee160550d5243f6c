use geo::{Area, ConvexHull, MultiPoint, MultiPolygon, Point};

use crate::pipeline::RunReport;
use crate::types::{Boundary, Homepass, ServiceGroup};

/// Convex-hull coverage per group. Groups with fewer than three members or a
/// degenerate (zero-area) hull get no polygon; they stay point-only and are
/// counted in the report rather than failing the run.
pub(crate) fn hull_boundaries(
    points: &[Homepass],
    groups: &[ServiceGroup],
    report: &mut RunReport,
) -> Vec<Boundary> {
    let mut boundaries = Vec::with_capacity(groups.len());

    for group in groups {
        if group.members.len() < 3 {
            report.skipped_small_groups += 1;
            continue;
        }

        let members = group.members.iter()
            .map(|&idx| Point::new(points[idx].lon, points[idx].lat))
            .collect::<Vec<_>>();
        let hull = MultiPoint(members).convex_hull();

        if hull.unsigned_area() == 0.0 {
            // All members collinear or coincident.
            report.skipped_small_groups += 1;
            continue;
        }

        boundaries.push(Boundary { group: group.id, shape: MultiPolygon(vec![hull]) });
    }

    boundaries
}
