//! Voronoi boundary synthesis.
//!
//! Each group centroid's cell is carved from the mask envelope by clipping
//! against the perpendicular bisector of every other centroid. That is the
//! clipped Voronoi cell by definition, and building it directly keeps the
//! tessellation finite with no unbounded-ray bookkeeping. Ownership is then
//! re-established by a strict containment join of centroids against cells;
//! a cell holding zero or several centroids is a recoverable join failure
//! and is dropped, never assigned by nearest distance.

use geo::{BooleanOps, BoundingRect, Contains, Coord, MultiPolygon, Point, Polygon};
use smallvec::SmallVec;

use crate::config::PlanConfig;
use crate::geom;
use crate::pipeline::RunReport;
use crate::types::{Boundary, Homepass, ServiceGroup};

/// Open ring of cell vertices in counter-clockwise order; closed on conversion.
type CellRing = SmallVec<[Coord<f64>; 16]>;

/// Tessellate the plan extent into one cell per group.
pub(crate) fn voronoi_boundaries(
    points: &[Homepass],
    groups: &[ServiceGroup],
    config: &PlanConfig,
    report: &mut RunReport,
) -> Vec<Boundary> {
    // Voronoi needs at least two sites; a lone group falls back to its own
    // buffered hull, with a larger buffer than the mask would get.
    if groups.len() == 1 {
        let coords = groups[0].members.iter()
            .map(|&idx| points[idx].coord())
            .collect::<Vec<_>>();
        return match geom::buffered_point_hull(&coords, config.mask_buffer_deg * 2.0) {
            Some(hull) => vec![Boundary {
                group: groups[0].id,
                shape: MultiPolygon(vec![hull]),
            }],
            None => vec![],
        };
    }

    let all_coords = points.iter().map(|p| p.coord()).collect::<Vec<_>>();
    let Some(mask) = geom::buffered_point_hull(&all_coords, config.mask_buffer_deg) else {
        return vec![];
    };
    let Some(envelope) = mask.bounding_rect() else { return vec![] };
    let mask = MultiPolygon(vec![mask]);

    let sites = groups.iter().map(|g| g.centroid(points)).collect::<Vec<_>>();
    let site_points = sites.iter().map(|&c| Point::from(c)).collect::<Vec<_>>();

    let envelope_ring: CellRing = SmallVec::from_slice(&[
        envelope.min(),
        Coord { x: envelope.max().x, y: envelope.min().y },
        envelope.max(),
        Coord { x: envelope.min().x, y: envelope.max().y },
    ]);

    let mut boundaries = Vec::with_capacity(groups.len());
    for (i, &site) in sites.iter().enumerate() {
        let mut cell = envelope_ring.clone();
        for (j, &other) in sites.iter().enumerate() {
            if j == i { continue }
            cell = clip_closer_half(&cell, site, other);
            if cell.len() < 3 { break }
        }
        if cell.len() < 3 {
            report.degenerate_cells += 1;
            continue;
        }

        let cell = ring_to_polygon(&cell);
        match cell_owner(&cell, &site_points) {
            Some(owner) if owner == i => {
                let clipped = mask.intersection(&MultiPolygon(vec![cell]));
                if clipped.0.is_empty() {
                    report.degenerate_cells += 1;
                } else {
                    boundaries.push(Boundary { group: groups[owner].id, shape: clipped });
                }
            }
            // Zero centroids (site on its own cell edge) or several
            // (near-coincident sites): drop rather than guess.
            _ => report.ambiguous_cells += 1,
        }
    }

    boundaries
}

/// The unique site strictly contained in `cell`, if there is exactly one.
///
/// Containment is geo's exact interior predicate: a site on the cell boundary
/// is not contained, so a centroid sitting on a shared edge resolves to no
/// owner on either side instead of two owners for one cell.
pub(crate) fn cell_owner(cell: &Polygon<f64>, sites: &[Point<f64>]) -> Option<usize> {
    let mut owner = None;
    for (idx, site) in sites.iter().enumerate() {
        if cell.contains(site) {
            if owner.is_some() { return None }
            owner = Some(idx);
        }
    }
    owner
}

/// Sutherland-Hodgman clip of a convex ring against the half-plane of points
/// at least as close to `site` as to `other`.
fn clip_closer_half(ring: &[Coord<f64>], site: Coord<f64>, other: Coord<f64>) -> CellRing {
    let mid = Coord { x: (site.x + other.x) / 2.0, y: (site.y + other.y) / 2.0 };
    let dir = Coord { x: other.x - site.x, y: other.y - site.y };
    // Negative on the kept (site) side of the bisector.
    let side = |p: Coord<f64>| (p.x - mid.x) * dir.x + (p.y - mid.y) * dir.y;

    let mut out = CellRing::new();
    for k in 0..ring.len() {
        let cur = ring[k];
        let next = ring[(k + 1) % ring.len()];
        let side_cur = side(cur);
        let side_next = side(next);

        if side_cur <= 0.0 {
            out.push(cur);
        }
        if (side_cur < 0.0 && side_next > 0.0) || (side_cur > 0.0 && side_next < 0.0) {
            let t = side_cur / (side_cur - side_next);
            out.push(Coord {
                x: cur.x + t * (next.x - cur.x),
                y: cur.y + t * (next.y - cur.y),
            });
        }
    }
    out
}

fn ring_to_polygon(ring: &[Coord<f64>]) -> Polygon<f64> {
    let mut coords = ring.to_vec();
    coords.push(ring[0]);
    Polygon::new(coords.into(), vec![])
}
