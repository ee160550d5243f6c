//! Planar buffering primitives built from convex hulls and boolean ops.

use geo::{BooleanOps, ConvexHull, Coord, LineString, MultiPoint, MultiPolygon, Point, Polygon};

/// Convex hull of a point set dilated by a square of half-width `buffer`.
///
/// The Minkowski sum of a convex hull with a square is the hull of the
/// pointwise sums, so offsetting every input by the four square corners gives
/// an exact fixed-width expansion. Works for any non-empty input, including a
/// single point or collinear points (which a plain hull would degenerate on).
pub(crate) fn buffered_point_hull(coords: &[Coord<f64>], buffer: f64) -> Option<Polygon<f64>> {
    if coords.is_empty() { return None }
    debug_assert!(buffer > 0.0, "buffer must be positive");

    let offsets = [
        (-buffer, -buffer),
        (-buffer, buffer),
        (buffer, -buffer),
        (buffer, buffer),
    ];
    let dilated = coords.iter()
        .flat_map(|c| offsets.iter().map(move |&(dx, dy)| Point::new(c.x + dx, c.y + dy)))
        .collect::<Vec<_>>();

    Some(MultiPoint(dilated).convex_hull())
}

/// Axis-aligned square of half-width `w` around a coordinate.
fn square(center: Coord<f64>, w: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (center.x - w, center.y - w),
            (center.x + w, center.y - w),
            (center.x + w, center.y + w),
            (center.x - w, center.y + w),
            (center.x - w, center.y - w),
        ]),
        vec![],
    )
}

/// Buffer a polyline into a ribbon polygon of half-width `width`: one
/// rectangle per segment plus a square weld at each vertex, unioned.
pub(crate) fn buffer_line(line: &LineString<f64>, width: f64) -> MultiPolygon<f64> {
    debug_assert!(width > 0.0, "width must be positive");
    let mut parts = Vec::new();

    for w in line.0.windows(2) {
        let (a, b) = (w[0], w[1]);
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 { continue } // duplicate vertex

        let nx = -dy / len * width;
        let ny = dx / len * width;
        parts.push(Polygon::new(
            LineString::from(vec![
                (a.x + nx, a.y + ny),
                (b.x + nx, b.y + ny),
                (b.x - nx, b.y - ny),
                (a.x - nx, a.y - ny),
                (a.x + nx, a.y + ny),
            ]),
            vec![],
        ));
    }
    for &vertex in &line.0 {
        parts.push(square(vertex, width));
    }

    union_all(parts.into_iter().map(|p| MultiPolygon(vec![p])))
        .unwrap_or_else(|| MultiPolygon(vec![]))
}

/// Union a sequence of multi-polygons into one.
/// This method may be slow for large numbers of complex polygons.
pub(crate) fn union_all(
    shapes: impl IntoIterator<Item = MultiPolygon<f64>>,
) -> Option<MultiPolygon<f64>> {
    shapes.into_iter().reduce(|a, b| a.union(&b))
}
