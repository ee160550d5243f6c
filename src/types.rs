use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// Stable identifier of a homepass point, unique within one planning run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HomepassId(pub u64);

/// Identifier of a final service group (ODP), unique across the whole run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate subscriber location in geographic (lon/lat degree) coordinates.
/// Immutable once ingested; coordinates are never rewritten by the pipeline.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homepass {
    pub id: HomepassId,
    pub lon: f64,
    pub lat: f64,
}

impl Homepass {
    /// Construct a homepass point from raw ingestion fields.
    #[inline]
    pub fn new(id: u64, lon: f64, lat: f64) -> Self {
        Self { id: HomepassId(id), lon, lat }
    }

    /// Coordinate pair in (lon, lat) order.
    #[inline]
    pub fn coord(&self) -> geo::Coord<f64> {
        geo::Coord { x: self.lon, y: self.lat }
    }
}

/// Total assignment of points (by input index) to final groups.
///
/// Stages hand this forward by value; no shared mutable table exists between
/// stages, so a run owns every intermediate structure exclusively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    labels: Vec<GroupId>, // labels[i] = group of points[i]
    num_groups: u32,
}

impl Assignment {
    /// Build an assignment from per-point labels and the total group count.
    pub(crate) fn new(labels: Vec<GroupId>, num_groups: u32) -> Self {
        debug_assert!(
            labels.iter().all(|g| g.0 < num_groups),
            "all labels must be in range [0, {num_groups})"
        );
        Self { labels, num_groups }
    }

    /// Number of assigned points.
    #[inline]
    pub fn len(&self) -> usize { self.labels.len() }

    /// Whether the assignment covers no points.
    #[inline]
    pub fn is_empty(&self) -> bool { self.labels.is_empty() }

    /// Number of final groups formed.
    #[inline]
    pub fn num_groups(&self) -> u32 { self.num_groups }

    /// The group of the point at input index `idx`.
    #[inline]
    pub fn group_of(&self, idx: usize) -> GroupId { self.labels[idx] }

    /// Per-point labels, indexed like the input point list.
    #[inline]
    pub fn labels(&self) -> &[GroupId] { &self.labels }

    /// Derive the per-group member lists. Every group is non-empty and the
    /// member lists partition `0..len()`.
    pub fn groups(&self) -> Vec<ServiceGroup> {
        let mut members = vec![Vec::new(); self.num_groups as usize];
        for (idx, group) in self.labels.iter().enumerate() {
            members[group.0 as usize].push(idx);
        }
        members.into_iter().enumerate()
            .map(|(g, members)| ServiceGroup { id: GroupId(g as u32), members })
            .collect()
    }
}

/// One final service group: an ODP and the input indices of its members.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceGroup {
    pub id: GroupId,
    pub members: Vec<usize>,
}

impl ServiceGroup {
    /// Arithmetic mean of the member coordinates (small-angle approximation).
    pub fn centroid(&self, points: &[Homepass]) -> geo::Coord<f64> {
        debug_assert!(!self.members.is_empty(), "group {} has no members", self.id);
        let (mut x, mut y) = (0.0, 0.0);
        for &idx in &self.members {
            x += points[idx].lon;
            y += points[idx].lat;
        }
        let n = self.members.len() as f64;
        geo::Coord { x: x / n, y: y / n }
    }
}

/// Coverage geometry for one group, in geographic coordinates.
///
/// After road cutting the shape may hold several disjoint polygons; with no
/// road cutting it holds exactly one.
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    pub group: GroupId,
    pub shape: MultiPolygon<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_partition_all_points() {
        let labels = vec![GroupId(1), GroupId(0), GroupId(1), GroupId(2), GroupId(0)];
        let assignment = Assignment::new(labels, 3);
        let groups = assignment.groups();

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].members, vec![1, 4]);
        assert_eq!(groups[1].members, vec![0, 2]);
        assert_eq!(groups[2].members, vec![3]);

        let total: usize = groups.iter().map(|g| g.members.len()).sum();
        assert_eq!(total, assignment.len());
    }

    #[test]
    fn centroid_is_mean_of_members() {
        let points = vec![
            Homepass::new(1, 0.0, 0.0),
            Homepass::new(2, 2.0, 4.0),
        ];
        let group = ServiceGroup { id: GroupId(0), members: vec![0, 1] };
        let c = group.centroid(&points);
        assert_eq!(c, geo::Coord { x: 1.0, y: 2.0 });
    }
}
