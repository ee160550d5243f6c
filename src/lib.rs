#![doc = "ODP planning public API"]
mod boundary;
mod cluster;
mod config;
mod geom;
mod pipeline;
mod types;

pub mod cli;
pub mod commands;
pub mod io;

#[doc(inline)]
pub use config::{BoundaryPolicy, MacroStrategy, PlanConfig};

#[doc(inline)]
pub use pipeline::{Pipeline, PlanOutcome, RunReport};

#[doc(inline)]
pub use types::{Assignment, Boundary, GroupId, Homepass, HomepassId, ServiceGroup};
