use anyhow::{Result, bail};

use crate::cli::{Cli, PlanArgs};
use crate::config::PlanConfig;
use crate::io;
use crate::pipeline::Pipeline;

/// Run the `plan` subcommand end to end.
pub fn plan(cli: &Cli, args: &PlanArgs) -> Result<()> {
    for path in [Some(&args.output), args.assignments.as_ref()].into_iter().flatten() {
        if path.exists() && !args.force {
            bail!("{} already exists (use --force to overwrite)", path.display());
        }
    }

    let points = io::csv::read_points(&args.points)?;
    if cli.verbose > 0 {
        eprintln!("[plan] {} points from {}", points.len(), args.points.display());
    }

    // Road data is an optional collaborator: an unreadable file degrades to
    // uncut boundaries, same as having no road file at all.
    let roads = match &args.roads {
        Some(path) => match io::geojson::read_road_lines(path) {
            Ok(lines) => Some(lines),
            Err(err) => {
                eprintln!("[plan] road data unavailable ({err:#}), boundaries will be uncut");
                None
            }
        },
        None => None,
    };

    let config = PlanConfig {
        max_capacity: args.max_capacity,
        chunk_size: args.chunk_size,
        boundary_policy: args.boundary,
        macro_strategy: args.macro_strategy,
        road_cutting: !args.no_road_cutting,
        seed: args.seed,
        road_buffer_m: args.road_buffer,
        mask_buffer_deg: args.mask_buffer,
        fill_opacity: args.fill_opacity,
    };

    let outcome = Pipeline::new(config)?
        .verbose(cli.verbose)
        .run(&points, roads.as_deref())?;

    io::geojson::write_boundaries(&args.output, &outcome.boundaries, args.fill_opacity)?;
    if let Some(path) = &args.assignments {
        io::geojson::write_assignments(path, &points, &outcome.assignment)?;
    }

    println!(
        "{} ODP groups, {} boundary polygons -> {}",
        outcome.report.num_groups,
        outcome.boundaries.len(),
        args.output.display(),
    );
    if outcome.report.road_cut_degraded {
        println!("note: road data unavailable, boundaries were not cut");
    }

    Ok(())
}
