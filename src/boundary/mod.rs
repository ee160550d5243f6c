mod hull;
mod roads;
mod voronoi;

pub(crate) use hull::hull_boundaries;
pub(crate) use roads::cut_boundaries;
pub(crate) use voronoi::voronoi_boundaries;
