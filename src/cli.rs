use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rsrf::density_map::rfactor::RFactorNorm;
use rsrf::density_map::transform::AxisConvention;
use rsrf::{StoreConfig, ZoneMode};

#[derive(Parser, Debug)]
#[command(
	version,
	about = "Real space R-factor tools for density maps and masks sharing one reference grid."
)]
#[command(propagate_version = true)]
pub struct Cli {
	/// Reference map; fixes the grid for every other map and mask
	#[arg(value_name = "REFERENCE")]
	pub reference: PathBuf,

	#[command(subcommand)]
	pub command: Commands,

	/// Number of map slots to allocate
	#[arg(long, global = true, default_value_t = 3, value_name = "N")]
	pub maps: usize,

	/// Number of mask slots to allocate
	#[arg(long, global = true, default_value_t = 1, value_name = "N")]
	pub masks: usize,

	/// Increase verbosity level (-v for DEBUG, -vv for TRACE)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	pub verbose: u8,

	/// Suppress all log output except for errors
	#[arg(short, long, global = true, conflicts_with = "verbose")]
	pub quiet: bool,
}

impl Cli {
	/// Requested capacities, raised to what the command needs.
	pub fn store_config(&self) -> StoreConfig {
		let need = self.command.slots_needed();
		StoreConfig {
			map_slots: self.maps.max(need.map_slots),
			mask_slots: self.masks.max(need.mask_slots),
		}
	}
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Print the reference header and grid summary.
	Header,
	/// Density statistics of the reference map.
	Stats(ZoneArgs),
	/// Scale the reference map so its zone mean matches a second map.
	Scale(ScaleArgs),
	/// Real space R-factor between the reference and a second map.
	Rfac(RfacArgs),
	/// Triangular smoothing with periodic boundaries.
	Smear(SmearArgs),
	/// Local roughness of the reference map.
	Rough(RoughArgs),
	/// Grow a seed mask toward declining density.
	Shape(ShapeArgs),
	/// Integrate density around atom sites read from a text file.
	Integrate(IntegrateArgs),
	/// Combine mask files.
	Mask(MaskArgs),
}

impl Commands {
	fn slots_needed(&self) -> StoreConfig {
		let (map_slots, mask_slots) = match self {
			Commands::Header | Commands::Stats(_) | Commands::Integrate(_) => (1, 1),
			Commands::Scale(_) | Commands::Rfac(_) | Commands::Rough(_) => (2, 1),
			Commands::Smear(_) => (3, 1),
			Commands::Shape(_) => (1, 3),
			Commands::Mask(_) => (1, 3),
		};
		StoreConfig { map_slots, mask_slots }
	}
}

/// Optional zone restriction through a mask file.
#[derive(Args, Debug, Clone)]
pub struct ZoneArgs {
	/// Where to apply: IN, OUT or TOTAL
	#[arg(long, default_value = "TOTAL", value_name = "ZONE")]
	pub zone: ZoneMode,

	/// Mask file defining IN and OUT
	#[arg(long, value_name = "PATH")]
	pub mask: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ScaleArgs {
	/// Map whose zone mean is the target
	#[arg(value_name = "MAP")]
	pub target: PathBuf,

	#[command(flatten)]
	pub zone: ZoneArgs,

	/// Where to write the scaled reference map
	#[arg(short, long, value_name = "PATH")]
	pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct RfacArgs {
	/// Map compared against the reference
	#[arg(value_name = "MAP")]
	pub other: PathBuf,

	#[command(flatten)]
	pub zone: ZoneArgs,

	/// Normalisation: diff, mean1, mean2, mean, rms1, rms2, rms or 0-6
	#[arg(long, default_value = "diff", value_name = "NORM")]
	pub norm: RFactorNorm,
}

#[derive(Args, Debug)]
pub struct SmearArgs {
	/// Taper radius in grid points
	#[arg(short, long, value_name = "N")]
	pub radius: usize,

	#[arg(short, long, value_name = "PATH")]
	pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct RoughArgs {
	/// Neighbourhood radius in grid points (at most 10)
	#[arg(short, long, value_name = "N")]
	pub radius: usize,

	#[arg(short, long, value_name = "PATH")]
	pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct ShapeArgs {
	/// Seed mask
	#[arg(value_name = "SEED")]
	pub seed: PathBuf,

	/// Minimum density drop for growth
	#[arg(long, default_value_t = 0.0, value_name = "FLOAT")]
	pub min_dif: f32,

	/// Growth cycles (at most 100)
	#[arg(long, default_value_t = 1, value_name = "N")]
	pub cycles: usize,

	/// Minimum mask voxels in a 3x3x3 block
	#[arg(long, default_value_t = 1, value_name = "N")]
	pub min_connect: usize,

	/// Where to write the grown mask
	#[arg(short, long, value_name = "PATH")]
	pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct IntegrateArgs {
	/// Text file with one `x y z radius` site per line
	#[arg(value_name = "SITES")]
	pub sites: PathBuf,

	/// Site coordinates are Cartesian Angstrom instead of grid points
	#[arg(long)]
	pub cartesian: bool,

	/// Cell orientation used to convert Cartesian sites
	#[arg(long, default_value = "a-along-x", value_name = "CONVENTION")]
	pub convention: AxisConvention,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MaskOp {
	/// Union of two masks
	Max,
	/// Intersection of two masks
	Min,
	/// Complement of one mask
	Flip,
}

#[derive(Args, Debug)]
pub struct MaskArgs {
	#[arg(value_enum)]
	pub op: MaskOp,

	#[arg(value_name = "MASK")]
	pub first: PathBuf,

	/// Second input, required by max and min
	#[arg(value_name = "MASK")]
	pub second: Option<PathBuf>,

	#[arg(short, long, value_name = "PATH")]
	pub output: PathBuf,
}
