use anyhow::{Context, Result, anyhow};
use geo::{Coord, LineString, MapCoords, MultiPolygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// PROJ.4 string for the geographic source CRS (WGS84 lon/lat).
const GEOG_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Build PROJ.4 string for the target UTM CRS, chosen from a lon/lat center.
/// WGS84: 326zz (north) / 327zz (south).
fn utm_proj4(center: Coord<f64>) -> String {
    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    let south = if center.y >= 0.0 { "" } else { " +south" };
    format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
}

/// A lon/lat ↔ UTM transform pair pinned to one zone for the whole run, so
/// every geometry in a run shares a common planar metric frame.
pub(crate) struct MetricFrame {
    geographic: Proj4,
    metric: Proj4,
}

impl MetricFrame {
    /// Build the frame for a dataset centered on the given lon/lat coordinate.
    pub(crate) fn for_center(center: Coord<f64>) -> Result<Self> {
        let geographic = Proj4::from_proj_string(GEOG_PROJ4)
            .with_context(|| anyhow!("failed to build source PROJ.4: {GEOG_PROJ4}"))?;

        let proj_string = utm_proj4(center);
        let metric = Proj4::from_proj_string(&proj_string)
            .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?;

        Ok(Self { geographic, metric })
    }

    /// Degrees in, UTM meters out.
    #[inline]
    pub(crate) fn coord_to_metric(&self, coord: Coord<f64>) -> Coord<f64> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.geographic, &self.metric, &mut point)
            .expect("CRS transform failed");
        Coord { x: point.0, y: point.1 }
    }

    /// UTM meters in, degrees out.
    #[inline]
    pub(crate) fn coord_to_geographic(&self, coord: Coord<f64>) -> Coord<f64> {
        let mut point = (coord.x, coord.y, 0.0);
        transform(&self.metric, &self.geographic, &mut point)
            .expect("CRS transform failed");
        Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
    }

    /// Reproject a lon/lat multi-polygon into the metric frame.
    #[inline]
    pub(crate) fn multi_polygon_to_metric(&self, shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        shape.map_coords(|c| self.coord_to_metric(c))
    }

    /// Reproject a metric multi-polygon back to lon/lat.
    #[inline]
    pub(crate) fn multi_polygon_to_geographic(&self, shape: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        shape.map_coords(|c| self.coord_to_geographic(c))
    }

    /// Reproject a lon/lat line into the metric frame.
    #[inline]
    pub(crate) fn line_to_metric(&self, line: &LineString<f64>) -> LineString<f64> {
        line.map_coords(|c| self.coord_to_metric(c))
    }
}
