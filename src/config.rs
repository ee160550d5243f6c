use anyhow::{Result, bail};
use clap::ValueEnum;

/// Boundary synthesis policy.
#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum BoundaryPolicy {
    /// Voronoi tessellation of group centroids, clipped to the project mask.
    Voronoi,
    /// Convex hull of each group's own points.
    ConvexHull,
}

/// Strategy for the coarse macro partition that bounds micro-clustering cost.
#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum MacroStrategy {
    /// Unconstrained k-means on the point coordinates.
    Clustering,
    /// East-to-west directional sweep with equal-frequency binning.
    Sweep,
}

/// Configuration for one planning run.
#[derive(Clone, Debug)]
pub struct PlanConfig {
    /// Maximum points per ODP (hard upper bound on group size).
    pub max_capacity: usize,
    /// Target points per macro group; trades boundary quality for speed.
    pub chunk_size: usize,
    pub boundary_policy: BoundaryPolicy,
    pub macro_strategy: MacroStrategy,
    /// Cut boundaries along the road network when road data is available.
    pub road_cutting: bool,
    /// Seed for every stochastic step; reruns with the same seed are identical.
    pub seed: u64,
    /// Road footprint half-width in meters, used as the cutting knife.
    pub road_buffer_m: f64,
    /// Buffer in degrees applied to the overall mask hull.
    pub mask_buffer_deg: f64,
    /// Rendering pass-through, not interpreted by the pipeline.
    pub fill_opacity: f64,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            max_capacity: 16,
            chunk_size: 500,
            boundary_policy: BoundaryPolicy::Voronoi,
            macro_strategy: MacroStrategy::Clustering,
            road_cutting: true,
            seed: 42,
            road_buffer_m: 3.0,
            mask_buffer_deg: 0.001,
            fill_opacity: 0.4,
        }
    }
}

impl PlanConfig {
    /// Reject invalid configuration before any clustering starts.
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity < 1 {
            bail!("max_capacity must be at least 1, got {}", self.max_capacity);
        }
        if self.chunk_size < 1 {
            bail!("chunk_size must be at least 1, got {}", self.chunk_size);
        }
        if !(self.road_buffer_m > 0.0) {
            bail!("road_buffer_m must be positive, got {}", self.road_buffer_m);
        }
        if !(self.mask_buffer_deg > 0.0) {
            bail!("mask_buffer_deg must be positive, got {}", self.mask_buffer_deg);
        }
        Ok(())
    }
}
