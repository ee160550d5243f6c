use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::{BoundaryPolicy, MacroStrategy};

/// FTTH ODP planning CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "odplan", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cluster homepass points into ODP groups and emit coverage boundaries
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input homepass point file (CSV with id,lon,lat headers)
    #[arg(value_hint = ValueHint::FilePath)]
    pub points: PathBuf,

    /// Output boundary file (GeoJSON)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: PathBuf,

    /// Optional road centerline file (GeoJSON LineString features)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub roads: Option<PathBuf>,

    /// Optional per-point assignment output (GeoJSON points)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub assignments: Option<PathBuf>,

    /// Maximum points per ODP
    #[arg(long, default_value_t = 16)]
    pub max_capacity: usize,

    /// Target points per macro group (quality/speed trade-off)
    #[arg(long, default_value_t = 500)]
    pub chunk_size: usize,

    /// Boundary synthesis policy
    #[arg(long, value_enum, default_value = "voronoi")]
    pub boundary: BoundaryPolicy,

    /// Macro partition strategy
    #[arg(long, value_enum, default_value = "clustering")]
    pub macro_strategy: MacroStrategy,

    /// Skip cutting boundaries along the road network
    #[arg(long)]
    pub no_road_cutting: bool,

    /// Seed for deterministic clustering
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Road footprint half-width in meters
    #[arg(long, default_value_t = 3.0)]
    pub road_buffer: f64,

    /// Mask hull buffer in degrees
    #[arg(long, default_value_t = 0.001)]
    pub mask_buffer: f64,

    /// Fill opacity written to boundary properties (rendering pass-through)
    #[arg(long, default_value_t = 0.4)]
    pub fill_opacity: f64,

    /// Overwrite output files if they exist
    #[arg(long)]
    pub force: bool,
}
