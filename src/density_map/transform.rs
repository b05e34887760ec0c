use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::density_map::geometry::{GridGeometry, UnitCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
	X,
	Y,
	Z,
}

impl Axis {
	pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

	fn index(self) -> usize {
		match self {
			Axis::X => 0,
			Axis::Y => 1,
			Axis::Z => 2,
		}
	}
}

/// How the unit cell is laid into the Cartesian frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisConvention {
	/// Real a along X, reciprocal c* along Z.
	#[default]
	AAlongX,
	/// Real c along Z, reciprocal a* along X.
	CAlongZ,
}

impl fmt::Display for AxisConvention {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AxisConvention::AAlongX => write!(f, "a-along-x"),
			AxisConvention::CAlongZ => write!(f, "c-along-z"),
		}
	}
}

#[derive(Debug, Clone, Error)]
#[error("unknown axis convention '{0}', expected a-along-x or c-along-z")]
pub struct ParseConventionError(String);

impl FromStr for AxisConvention {
	type Err = ParseConventionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"a-along-x" | "1" => Ok(AxisConvention::AAlongX),
			"c-along-z" | "0" => Ok(AxisConvention::CAlongZ),
			_ => Err(ParseConventionError(s.to_string())),
		}
	}
}

/// Cartesian Angstrom <-> fractional grid-point conversion for one cell.
///
/// Grid values are fractional coordinates multiplied by the number of grid
/// points spanning the unit cell along that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransform {
	convention: AxisConvention,
	cell: UnitCell,
	cell_grid: [f64; 3],
	cos: (f64, f64, f64),
	sin: (f64, f64, f64),
	g: f64,
}

impl CoordinateTransform {
	pub fn new(cell: UnitCell, cell_grid: [usize; 3], convention: AxisConvention) -> Self {
		Self {
			convention,
			cell,
			cell_grid: [cell_grid[0] as f64, cell_grid[1] as f64, cell_grid[2] as f64],
			cos: cell.cosines(),
			sin: cell.sines(),
			g: cell.metric_g(),
		}
	}

	pub fn convention(&self) -> AxisConvention {
		self.convention
	}

	/// Edge-scaled fractional coordinates (x·a, y·b, z·c) from grid units.
	fn scaled(&self, grid: [f64; 3]) -> [f64; 3] {
		[
			grid[0] / self.cell_grid[0] * self.cell.a,
			grid[1] / self.cell_grid[1] * self.cell.b,
			grid[2] / self.cell_grid[2] * self.cell.c,
		]
	}

	/// One Cartesian component of the point at grid coordinates `grid`.
	pub fn to_cartesian(&self, axis: Axis, grid: [f64; 3]) -> f64 {
		let [xa, yb, zc] = self.scaled(grid);
		let (ca, cb, cc) = self.cos;
		let (sa, _, sc) = self.sin;
		match (self.convention, axis) {
			(AxisConvention::AAlongX, Axis::X) => xa + yb * cc + zc * cb,
			(AxisConvention::AAlongX, Axis::Y) => yb * sc + zc * (ca - cb * cc) / sc,
			(AxisConvention::AAlongX, Axis::Z) => zc * self.g / sc,
			(AxisConvention::CAlongZ, Axis::X) => xa * self.g / sa,
			(AxisConvention::CAlongZ, Axis::Y) => xa * (cc - ca * cb) / sa + yb * sa,
			(AxisConvention::CAlongZ, Axis::Z) => xa * cb + yb * ca + zc,
		}
	}

	/// One grid-unit fractional component of the Cartesian point `cart`.
	pub fn to_fractional(&self, axis: Axis, cart: [f64; 3]) -> f64 {
		let [x, y, z] = cart;
		let (ca, cb, cc) = self.cos;
		let (sa, _, sc) = self.sin;
		let scaled = match self.convention {
			AxisConvention::AAlongX => {
				let zc = z * sc / self.g;
				match axis {
					Axis::Z => zc,
					Axis::Y => (y - zc * (ca - cb * cc) / sc) / sc,
					Axis::X => {
						let yb = (y - zc * (ca - cb * cc) / sc) / sc;
						x - yb * cc - zc * cb
					}
				}
			}
			AxisConvention::CAlongZ => {
				let xa = x * sa / self.g;
				match axis {
					Axis::X => xa,
					Axis::Y => (y - xa * (cc - ca * cb) / sa) / sa,
					Axis::Z => {
						let yb = (y - xa * (cc - ca * cb) / sa) / sa;
						z - xa * cb - yb * ca
					}
				}
			}
		};
		let edge = [self.cell.a, self.cell.b, self.cell.c][axis.index()];
		scaled / edge * self.cell_grid[axis.index()]
	}

	pub fn cartesian(&self, grid: [f64; 3]) -> [f64; 3] {
		Axis::ALL.map(|axis| self.to_cartesian(axis, grid))
	}

	pub fn fractional(&self, cart: [f64; 3]) -> [f64; 3] {
		Axis::ALL.map(|axis| self.to_fractional(axis, cart))
	}
}

impl GridGeometry {
	pub fn transform(&self, convention: AxisConvention) -> CoordinateTransform {
		CoordinateTransform::new(self.cell, self.cell_grid, convention)
	}
}
