mod cli;
mod logging;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use rsrf::density_map::info as banner;
use rsrf::density_map::integrate::AtomSite;
use rsrf::density_map::shape::ShapeParams;
use rsrf::density_map::transform::AxisConvention;
use rsrf::{Workspace, Zone, ZoneMode};

use crate::cli::{Cli, Commands, IntegrateArgs, MaskOp, ZoneArgs};

/// Load the zone mask, if the zone needs one, into mask slot 0.
fn load_zone(ws: &mut Workspace, args: &ZoneArgs) -> Result<Zone> {
	match (&args.mask, args.zone) {
		(_, ZoneMode::Total) => Ok(Zone::Total),
		(Some(path), mode) => {
			ws.load_mask(path, 0)
				.with_context(|| format!("loading mask {}", path.display()))?;
			Ok(Zone::new(mode, Some(0))?)
		}
		(None, mode) => Ok(Zone::new(mode, None)?),
	}
}

/// Parse `x y z radius` lines; blank lines and `#` comments are skipped.
fn read_sites(path: &Path, convention: Option<(AxisConvention, &Workspace)>) -> Result<Vec<AtomSite>> {
	let text = fs::read_to_string(path).with_context(|| format!("reading sites from {}", path.display()))?;
	let transform = convention.map(|(c, ws)| ws.geometry().transform(c));

	let mut sites = Vec::new();
	for (line_no, line) in text.lines().enumerate() {
		let line = line.trim();
		if line.is_empty() || line.starts_with('#') {
			continue;
		}
		let fields: Vec<f64> = line
			.split_whitespace()
			.map(str::parse)
			.collect::<std::result::Result<_, _>>()
			.with_context(|| format!("{}:{}: expected numbers", path.display(), line_no + 1))?;
		if fields.len() != 4 {
			bail!("{}:{}: expected `x y z radius`, found {} fields", path.display(), line_no + 1, fields.len());
		}
		let point = [fields[0], fields[1], fields[2]];
		let grid = match &transform {
			Some(t) => t.fractional(point),
			None => point,
		};
		sites.push(AtomSite {
			grid,
			radius: fields[3],
		});
	}
	Ok(sites)
}

fn integrate(ws: &Workspace, args: &IntegrateArgs) -> Result<()> {
	let convention = args.cartesian.then_some((args.convention, ws));
	let sites = read_sites(&args.sites, convention)?;
	let values = ws.integrate_sites(&sites, 0)?;
	for (site, value) in sites.iter().zip(&values) {
		println!(
			"{:10.3} {:10.3} {:10.3} {:6.2} {:14.6}",
			site.grid[0], site.grid[1], site.grid[2], site.radius, value
		);
	}
	info!("Integrated {} sites", values.len());
	Ok(())
}

fn run(cli: Cli) -> Result<()> {
	let config = cli.store_config();
	let mut ws = Workspace::load_reference(&cli.reference, config)
		.with_context(|| format!("loading reference map {}", cli.reference.display()))?;

	match cli.command {
		Commands::Header => {
			for line in ws.reference_header().summary() {
				println!("{}", line);
			}
			ws.report_memory();
		}
		Commands::Stats(args) => {
			let zone = load_zone(&mut ws, &args)?;
			let s = ws.statistics(0, zone)?;
			println!("Zone:      {}", zone);
			println!("Voxels:    {}", s.count);
			println!("Maximum:   {:.6}", s.max);
			println!("Minimum:   {:.6}", s.min);
			println!("Mean:      {:.6}", s.mean);
			println!("Total:     {:.6}", s.total);
			println!("Variance:  {:.6}", s.variance);
			println!("RMS:       {:.6}", s.rms);
		}
		Commands::Scale(args) => {
			ws.load_map(&args.target, 1)
				.with_context(|| format!("loading map {}", args.target.display()))?;
			let zone = load_zone(&mut ws, &args.zone)?;
			let factor = ws.scale_to(0, 1, zone)?;
			println!("Scale factor: {:.6}", factor);
			ws.write_map(&args.output, 0)?;
		}
		Commands::Rfac(args) => {
			ws.load_map(&args.other, 1)
				.with_context(|| format!("loading map {}", args.other.display()))?;
			let zone = load_zone(&mut ws, &args.zone)?;
			let r = ws.r_factor(0, 1, zone)?;
			r.report();
			println!("R-factor ({}): {:.6}", args.norm, r.value(args.norm));
		}
		Commands::Smear(args) => {
			ws.smear(0, 1, 2, args.radius)?;
			ws.write_map(&args.output, 1)?;
		}
		Commands::Rough(args) => {
			let report = ws.roughness(0, 1, args.radius)?;
			println!("Roughness range: {:.6} to {:.6}", report.min, report.max);
			ws.write_map(&args.output, 1)?;
		}
		Commands::Shape(args) => {
			ws.load_mask(&args.seed, 0)
				.with_context(|| format!("loading seed mask {}", args.seed.display()))?;
			let params = ShapeParams {
				min_dif: args.min_dif,
				cycles: args.cycles,
				min_connect: args.min_connect,
			};
			let report = ws.shape_fit(0, 1, 2, 0, params)?;
			for c in &report.cycles {
				println!("Cycle {:3}: {:8} grown {:8} constrictions", c.cycle, c.grown, c.constrictions);
			}
			println!("Total: {} grown, {} constrictions", report.total_grown, report.total_constrictions);
			let summary = ws.write_mask(&args.output, 1)?;
			println!("Mask fraction: {:.6}", summary.fraction());
		}
		Commands::Integrate(args) => integrate(&ws, &args)?,
		Commands::Mask(args) => {
			ws.load_mask(&args.first, 0)
				.with_context(|| format!("loading mask {}", args.first.display()))?;
			match (args.op, &args.second) {
				(MaskOp::Flip, _) => ws.flip(2, 0)?,
				(op, Some(second)) => {
					ws.load_mask(second, 1)
						.with_context(|| format!("loading mask {}", second.display()))?;
					if op == MaskOp::Max {
						ws.max_mask(2, 0, 1)?;
					} else {
						ws.min_mask(2, 0, 1)?;
					}
				}
				(op, None) => bail!("mask {:?} needs two input masks", op),
			}
			let summary = ws.write_mask(&args.output, 2)?;
			println!("Mask fraction: {:.6}", summary.fraction());
		}
	}
	Ok(())
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	logging::setup_logging(cli.verbose, cli.quiet);
	if !cli.quiet {
		banner::print_banner();
		banner::print_compile_info();
	}
	run(cli)
}
