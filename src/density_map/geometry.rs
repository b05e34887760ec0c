use std::f64::consts::PI;

use log::info;

use crate::density_map::error::{MapError, Result};
use crate::density_map::header::MapHeader;

/// Unit-cell edges in Angstrom and angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
	pub a: f64,
	pub b: f64,
	pub c: f64,
	pub alpha: f64,
	pub beta: f64,
	pub gamma: f64,
}

impl UnitCell {
	pub fn from_header(cell: &[f32; 6]) -> Self {
		Self {
			a: cell[0] as f64,
			b: cell[1] as f64,
			c: cell[2] as f64,
			alpha: cell[3] as f64,
			beta: cell[4] as f64,
			gamma: cell[5] as f64,
		}
	}

	/// Cosines of (alpha, beta, gamma).
	pub fn cosines(&self) -> (f64, f64, f64) {
		(
			self.alpha.to_radians().cos(),
			self.beta.to_radians().cos(),
			self.gamma.to_radians().cos(),
		)
	}

	/// Sines of (alpha, beta, gamma).
	pub fn sines(&self) -> (f64, f64, f64) {
		(
			self.alpha.to_radians().sin(),
			self.beta.to_radians().sin(),
			self.gamma.to_radians().sin(),
		)
	}

	/// Metric term `G = sqrt(1 - cos²α - cos²β - cos²γ + 2 cosα cosβ cosγ)`.
	pub fn metric_g(&self) -> f64 {
		let (ca, cb, cc) = self.cosines();
		(1.0 - ca * ca - cb * cb - cc * cc + 2.0 * ca * cb * cc).sqrt()
	}

	/// Unit-cell volume in cubic Angstrom (half-angle sine product form).
	pub fn volume(&self) -> f64 {
		let half = PI / 360.0;
		let (a, b, c) = (self.alpha, self.beta, self.gamma);
		let product = ((a + b + c) * half).sin()
			* ((-a + b + c) * half).sin()
			* ((a - b + c) * half).sin()
			* ((a + b - c) * half).sin();
		2.0 * self.a * self.b * self.c * product.sqrt()
	}
}

/// Grid extent and unit-cell metadata shared by every map and mask slot.
#[derive(Debug, Clone, PartialEq)]
pub struct GridGeometry {
	pub nx: usize,
	pub ny: usize,
	pub nz: usize,
	pub total_voxels: usize,
	/// Grid points spanning one unit cell along each axis.
	pub cell_grid: [usize; 3],
	pub cell: UnitCell,
	/// Angstrom per grid point along each axis.
	pub spacing: [f64; 3],
	pub cell_volume: f64,
	pub map_volume: f64,
	pub voxel_volume: f64,
}

impl GridGeometry {
	/// Derive the geometry from a reference header.
	pub fn from_header(header: &MapHeader) -> Result<Self> {
		let [nx, ny, nz] = header.dims()?;
		if header.cell_grid.iter().any(|&g| g <= 0) {
			return Err(MapError::InvalidHeader(format!(
				"unit cell grid {:?} must be positive",
				header.cell_grid
			)));
		}
		let cell_grid = [
			header.cell_grid[0] as usize,
			header.cell_grid[1] as usize,
			header.cell_grid[2] as usize,
		];
		let cell = UnitCell::from_header(&header.cell);
		if cell.a <= 0.0 || cell.b <= 0.0 || cell.c <= 0.0 {
			return Err(MapError::InvalidHeader(format!(
				"unit cell edges {:?} must be positive",
				&header.cell[..3]
			)));
		}

		let total_voxels = voxel_count([nx, ny, nz]).ok_or_else(|| {
			MapError::InvalidHeader(format!("grid {:?} holds more voxels than can be addressed", [nx, ny, nz]))
		})?;
		let cell_voxels = voxel_count(cell_grid).ok_or_else(|| {
			MapError::InvalidHeader(format!("unit cell grid {:?} holds more voxels than can be addressed", cell_grid))
		})?;
		let cell_volume = cell.volume();
		let frac_vol = total_voxels as f64 / cell_voxels as f64;

		Ok(Self {
			nx,
			ny,
			nz,
			total_voxels,
			cell_grid,
			cell,
			spacing: [
				cell.a / cell_grid[0] as f64,
				cell.b / cell_grid[1] as f64,
				cell.c / cell_grid[2] as f64,
			],
			cell_volume,
			map_volume: cell_volume * frac_vol,
			voxel_volume: cell_volume / cell_voxels as f64,
		})
	}

	pub fn dims(&self) -> [usize; 3] {
		[self.nx, self.ny, self.nz]
	}

	pub fn matches(&self, dims: [usize; 3]) -> bool {
		self.dims() == dims
	}

	/// Convert (x, y, z) to a linear index within one slot
	#[inline]
	pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
		x + y * self.nx + z * self.nx * self.ny
	}

	/// Linear index of (x, y, z), or `CoordinateOutOfRange` off the grid.
	pub fn checked_index(&self, x: usize, y: usize, z: usize) -> Result<usize> {
		if x < self.nx && y < self.ny && z < self.nz {
			Ok(self.index(x, y, z))
		} else {
			Err(MapError::CoordinateOutOfRange {
				coords: [x, y, z],
				dims: self.dims(),
			})
		}
	}

	/// Convert a linear index back to (x, y, z)
	#[inline]
	pub fn coords(&self, index: usize) -> (usize, usize, usize) {
		let z = index / (self.nx * self.ny);
		let y = (index % (self.nx * self.ny)) / self.nx;
		let x = index % self.nx;
		(x, y, z)
	}

	/// Angstrom length of a grid offset, through the unit-cell metric.
	pub fn distance(&self, dx: i64, dy: i64, dz: i64) -> f64 {
		self.metric_distance(dx as f64, dy as f64, dz as f64)
	}

	/// Angstrom length of a fractional grid offset.
	pub fn metric_distance(&self, dx: f64, dy: f64, dz: f64) -> f64 {
		let fx = dx / self.cell_grid[0] as f64;
		let fy = dy / self.cell_grid[1] as f64;
		let fz = dz / self.cell_grid[2] as f64;
		let UnitCell { a, b, c, .. } = self.cell;
		let (ca, cb, cc) = self.cell.cosines();

		let d2 = fx * fx * a * a
			+ fy * fy * b * b
			+ fz * fz * c * c
			+ 2.0 * fx * fy * a * b * cc
			+ 2.0 * fx * fz * a * c * cb
			+ 2.0 * fy * fz * b * c * ca;
		d2.max(0.0).sqrt()
	}

	/// Log the grid/cell table shown when the reference map is loaded.
	pub fn report(&self) {
		info!("Grid X size      = {:.4}", self.spacing[0]);
		info!("Grid Y size      = {:.4}", self.spacing[1]);
		info!("Grid Z size      = {:.4}", self.spacing[2]);
		info!("Grid volume      = {:.4}", self.voxel_volume);
		info!("| PARAMETER          | UNIT CELL |    MAP    |");
		let rows = [
			("X in Grid Units", self.cell_grid[0] as f64, self.nx as f64),
			("Y in Grid Units", self.cell_grid[1] as f64, self.ny as f64),
			("Z in Grid Units", self.cell_grid[2] as f64, self.nz as f64),
			("X in Angstroms", self.cell.a, self.nx as f64 * self.spacing[0]),
			("Y in Angstroms", self.cell.b, self.ny as f64 * self.spacing[1]),
			("Z in Angstroms", self.cell.c, self.nz as f64 * self.spacing[2]),
			(
				"Voxel number",
				self.cell_grid.iter().map(|&g| g as f64).product(),
				self.total_voxels as f64,
			),
			("Volume", self.cell_volume, self.map_volume),
		];
		for (name, cell, map) in rows {
			info!("| {:<18} |{:>11.2}|{:>11.2}|", name, cell, map);
		}
	}
}

fn voxel_count(dims: [usize; 3]) -> Option<usize> {
	dims[0].checked_mul(dims[1])?.checked_mul(dims[2])
}
