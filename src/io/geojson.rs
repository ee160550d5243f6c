use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, LineString, MultiPolygon};
use serde_json::{Value, json};

use crate::types::{Assignment, Boundary, Homepass};

/// Fill palette indexed by `group_id % len`, mirroring the rendering
/// collaborator's tableau-style coloring.
const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

fn multi_polygon_coords(shape: &MultiPolygon<f64>) -> Vec<Value> {
    shape.0.iter().map(|polygon| {
        let exterior: Vec<Vec<f64>> = polygon.exterior().coords()
            .map(|c| vec![c.x, c.y])
            .collect();
        let interiors: Vec<Vec<Vec<f64>>> = polygon.interiors().iter()
            .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
            .collect();

        let mut rings = vec![json!(exterior)];
        rings.extend(interiors.into_iter().map(|ring| json!(ring)));
        json!(rings)
    }).collect()
}

/// Write boundary polygons as a GeoJSON FeatureCollection, one feature per
/// group, styled for the rendering collaborator.
pub fn write_boundaries(path: &Path, boundaries: &[Boundary], fill_opacity: f64) -> Result<()> {
    let features: Vec<Value> = boundaries.iter().map(|boundary| {
        let color = PALETTE[boundary.group.0 as usize % PALETTE.len()];
        json!({
            "type": "Feature",
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": multi_polygon_coords(&boundary.shape),
            },
            "properties": {
                "odp_id": boundary.group.0,
                "fill": color,
                "fill-opacity": fill_opacity,
                "stroke": "#ffffff",
            },
        })
    }).collect();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    let bytes = serde_json::to_vec(&collection).context("failed to serialize boundary GeoJSON")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Write the per-point group assignment as a GeoJSON point FeatureCollection.
pub fn write_assignments(path: &Path, points: &[Homepass], assignment: &Assignment) -> Result<()> {
    let features: Vec<Value> = points.iter().enumerate().map(|(idx, p)| {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [p.lon, p.lat],
            },
            "properties": {
                "id": p.id.0,
                "odp_id": assignment.group_of(idx).0,
            },
        })
    }).collect();

    let collection = json!({
        "type": "FeatureCollection",
        "features": features,
    });

    let bytes = serde_json::to_vec(&collection).context("failed to serialize assignment GeoJSON")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Read road centerlines from a GeoJSON FeatureCollection. LineString and
/// MultiLineString features are collected; any other geometry is ignored.
pub fn read_road_lines(path: &Path) -> Result<Vec<LineString<f64>>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse GeoJSON in {}", path.display()))?;

    let mut lines = Vec::new();
    if let Some(features) = value["features"].as_array() {
        for feature in features {
            let geometry = &feature["geometry"];
            match geometry["type"].as_str() {
                Some("LineString") => {
                    if let Some(coords) = geometry["coordinates"].as_array() {
                        if let Some(line) = parse_line_coords(coords) {
                            lines.push(line);
                        }
                    }
                }
                Some("MultiLineString") => {
                    if let Some(parts) = geometry["coordinates"].as_array() {
                        for part in parts {
                            if let Some(coords) = part.as_array() {
                                if let Some(line) = parse_line_coords(coords) {
                                    lines.push(line);
                                }
                            }
                        }
                    }
                }
                _ => {} // points, polygons, missing geometry: not road centerlines
            }
        }
    }

    Ok(lines)
}

/// Parse `[[x, y], ...]` into a LineString; None if fewer than 2 positions.
fn parse_line_coords(coords: &[Value]) -> Option<LineString<f64>> {
    let parsed = coords.iter()
        .filter_map(|pair| {
            let pair = pair.as_array()?;
            Some(Coord { x: pair.first()?.as_f64()?, y: pair.get(1)?.as_f64()? })
        })
        .collect::<Vec<_>>();
    (parsed.len() >= 2).then(|| LineString(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GroupId;
    use geo::Polygon;

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("odplan-geojson-test-{}-{tag}.json", std::process::id()))
    }

    #[test]
    fn boundary_features_carry_group_id_and_style() {
        let boundary = Boundary {
            group: GroupId(3),
            shape: MultiPolygon(vec![Polygon::new(
                vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)].into(),
                vec![],
            )]),
        };
        let path = temp_path("boundaries");
        write_boundaries(&path, &[boundary], 0.4).unwrap();

        let value: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        let feature = &value["features"][0];
        assert_eq!(feature["properties"]["odp_id"], 3);
        assert_eq!(feature["properties"]["fill"], PALETTE[3]);
        assert_eq!(feature["geometry"]["type"], "MultiPolygon");
    }

    #[test]
    fn road_reader_collects_line_features_only() {
        let path = temp_path("roads");
        let collection = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "LineString",
                        "coordinates": [[106.8, -6.2], [106.81, -6.2]],
                    },
                    "properties": {"highway": "residential"},
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "MultiLineString",
                        "coordinates": [
                            [[106.8, -6.21], [106.81, -6.21]],
                            [[106.8, -6.22], [106.81, -6.22]],
                        ],
                    },
                    "properties": {},
                },
                {
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [106.8, -6.2],
                    },
                    "properties": {},
                },
            ],
        });
        std::fs::write(&path, serde_json::to_vec(&collection).unwrap()).unwrap();

        let lines = read_road_lines(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].0.len(), 2);
    }

    #[test]
    fn assignment_features_pair_ids_with_groups() {
        let points = vec![Homepass::new(10, 106.8, -6.2), Homepass::new(11, 106.81, -6.21)];
        let assignment = Assignment::new(vec![GroupId(0), GroupId(1)], 2);
        let path = temp_path("assignments");
        write_assignments(&path, &points, &assignment).unwrap();

        let value: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(value["features"][0]["properties"]["id"], 10);
        assert_eq!(value["features"][1]["properties"]["odp_id"], 1);
    }
}
