//! Road cutter: subtracts the buffered road network from every boundary.
//!
//! Cutting happens in a shared UTM frame so the road footprint width is a
//! real linear width. A cut can strand a sliver of a group's cell on the far
//! side of a road with none of that group's homes in it; the own-group
//! membership filter removes those so they are never rendered as coverage.

use anyhow::Result;
use geo::{Area, BooleanOps, BoundingRect, Contains, Coord, LineString, MultiPolygon, Point, Polygon};
use rstar::{AABB, RTree, primitives::GeomWithData};

use crate::config::PlanConfig;
use crate::geom::{self, MetricFrame};
use crate::pipeline::RunReport;
use crate::types::{Assignment, Boundary, GroupId, Homepass};

type PointEntry = GeomWithData<[f64; 2], usize>;

/// Cut every boundary against the road barrier and keep only the pieces that
/// contain at least one of their own group's points. With no road data the
/// pre-cut boundaries pass through unchanged and the run is flagged degraded.
pub(crate) fn cut_boundaries(
    boundaries: Vec<Boundary>,
    roads: &[LineString<f64>],
    points: &[Homepass],
    assignment: &Assignment,
    config: &PlanConfig,
    report: &mut RunReport,
) -> Result<Vec<Boundary>> {
    if roads.is_empty() {
        report.road_cut_degraded = true;
        return Ok(boundaries);
    }

    let frame = MetricFrame::for_center(mean_coord(points))?;

    // One barrier for the whole run: all road lines buffered and unioned.
    let ribbons = roads.iter()
        .map(|line| geom::buffer_line(&frame.line_to_metric(line), config.road_buffer_m));
    let barrier = match geom::union_all(ribbons) {
        Some(barrier) if !barrier.0.is_empty() => barrier,
        _ => {
            report.road_cut_degraded = true;
            return Ok(boundaries);
        }
    };

    let metric_points = points.iter()
        .map(|p| frame.coord_to_metric(p.coord()))
        .collect::<Vec<_>>();
    let tree = RTree::bulk_load(
        metric_points.iter().enumerate()
            .map(|(idx, c)| PointEntry::new([c.x, c.y], idx))
            .collect(),
    );

    let mut cut = Vec::with_capacity(boundaries.len());
    for boundary in &boundaries {
        let metric_shape = frame.multi_polygon_to_metric(&boundary.shape);
        let pieces = metric_shape.difference(&barrier);

        // Explode the difference into single connected pieces and filter each
        // by strict membership of the group's own points.
        let mut kept = Vec::new();
        for piece in pieces.0 {
            if piece.unsigned_area() == 0.0 { continue }
            if piece_has_member(&piece, boundary.group, &tree, assignment) {
                kept.push(piece);
            } else {
                report.discarded_pieces += 1;
            }
        }

        if !kept.is_empty() {
            cut.push(Boundary {
                group: boundary.group,
                shape: frame.multi_polygon_to_geographic(&MultiPolygon(kept)),
            });
        }
    }

    Ok(cut)
}

/// Does any point of `group` fall strictly within the piece? R-tree envelope
/// query first, exact containment on the survivors.
fn piece_has_member(
    piece: &Polygon<f64>,
    group: GroupId,
    tree: &RTree<PointEntry>,
    assignment: &Assignment,
) -> bool {
    let Some(bbox) = piece.bounding_rect() else { return false };
    let envelope = AABB::from_corners(
        [bbox.min().x, bbox.min().y],
        [bbox.max().x, bbox.max().y],
    );
    tree.locate_in_envelope_intersecting(&envelope).any(|entry| {
        assignment.group_of(entry.data) == group
            && piece.contains(&Point::new(entry.geom()[0], entry.geom()[1]))
    })
}

fn mean_coord(points: &[Homepass]) -> Coord<f64> {
    debug_assert!(!points.is_empty(), "no points to center the frame on");
    let (mut x, mut y) = (0.0, 0.0);
    for p in points {
        x += p.lon;
        y += p.lat;
    }
    let n = points.len() as f64;
    Coord { x: x / n, y: y / n }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LON: f64 = 106.8;
    const LAT: f64 = -6.2;
    const DEG_30M: f64 = 0.0003; // roughly 33 m near the equator

    /// A square boundary of half-width 2 * DEG_30M around (LON, LAT).
    fn square_boundary() -> Boundary {
        let w = DEG_30M * 2.0;
        Boundary {
            group: GroupId(0),
            shape: MultiPolygon(vec![Polygon::new(
                vec![
                    (LON - w, LAT - w),
                    (LON + w, LAT - w),
                    (LON + w, LAT + w),
                    (LON - w, LAT + w),
                    (LON - w, LAT - w),
                ].into(),
                vec![],
            )]),
        }
    }

    /// Horizontal road through the square's middle, extending past its edges.
    fn bisecting_road() -> LineString<f64> {
        LineString::from(vec![(LON - 0.01, LAT), (LON + 0.01, LAT)])
    }

    fn rows(above: usize, below: usize) -> Vec<Homepass> {
        let mut points = Vec::new();
        for i in 0..above {
            points.push(Homepass::new(points.len() as u64, LON + i as f64 * 1e-5, LAT + DEG_30M));
        }
        for i in 0..below {
            points.push(Homepass::new(points.len() as u64, LON + i as f64 * 1e-5, LAT - DEG_30M));
        }
        points
    }

    #[test]
    fn missing_road_data_degrades_gracefully() {
        let points = rows(2, 2);
        let assignment = Assignment::new(vec![GroupId(0); 4], 1);
        let config = PlanConfig::default();
        let mut report = RunReport::default();

        let before = vec![square_boundary()];
        let after = cut_boundaries(before.clone(), &[], &points, &assignment, &config, &mut report)
            .unwrap();

        assert_eq!(after, before);
        assert!(report.road_cut_degraded);
    }

    #[test]
    fn road_splits_cell_into_two_retained_pieces() {
        let points = rows(3, 3);
        let assignment = Assignment::new(vec![GroupId(0); 6], 1);
        let config = PlanConfig::default();
        let mut report = RunReport::default();

        let after = cut_boundaries(
            vec![square_boundary()],
            &[bisecting_road()],
            &points,
            &assignment,
            &config,
            &mut report,
        ).unwrap();

        assert_eq!(after.len(), 1);
        assert_eq!(after[0].group, GroupId(0));
        assert_eq!(after[0].shape.0.len(), 2, "expected two pieces, got {:?}", after[0].shape);
        assert_eq!(report.discarded_pieces, 0);
        assert!(!report.road_cut_degraded);

        // Every point still falls inside one of the surviving pieces.
        for p in &points {
            assert!(after[0].shape.contains(&Point::new(p.lon, p.lat)), "{p:?} orphaned");
        }
    }

    #[test]
    fn piece_with_no_own_points_is_discarded() {
        let points = rows(3, 0);
        let assignment = Assignment::new(vec![GroupId(0); 3], 1);
        let config = PlanConfig::default();
        let mut report = RunReport::default();

        let after = cut_boundaries(
            vec![square_boundary()],
            &[bisecting_road()],
            &points,
            &assignment,
            &config,
            &mut report,
        ).unwrap();

        assert_eq!(after.len(), 1);
        assert_eq!(after[0].shape.0.len(), 1);
        assert_eq!(report.discarded_pieces, 1);

        // The surviving piece is the northern half.
        assert!(after[0].shape.contains(&Point::new(LON, LAT + DEG_30M)));
        assert!(!after[0].shape.contains(&Point::new(LON, LAT - DEG_30M)));
    }

    #[test]
    fn road_missing_the_cell_leaves_one_piece() {
        let points = rows(2, 2);
        let assignment = Assignment::new(vec![GroupId(0); 4], 1);
        let config = PlanConfig::default();
        let mut report = RunReport::default();

        // A road far north of the square.
        let road = LineString::from(vec![(LON - 0.01, LAT + 0.05), (LON + 0.01, LAT + 0.05)]);
        let after = cut_boundaries(
            vec![square_boundary()],
            &[road],
            &points,
            &assignment,
            &config,
            &mut report,
        ).unwrap();

        assert_eq!(after.len(), 1);
        assert_eq!(after[0].shape.0.len(), 1);
        assert_eq!(report.discarded_pieces, 0);
    }
}
