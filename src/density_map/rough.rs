use log::info;

use crate::density_map::error::{MapError, Result};
use crate::density_map::utils::voxel_progress;
use crate::density_map::workspace::Workspace;

/// Largest neighbourhood radius accepted by `roughness`.
pub const MAX_ROUGH_RADIUS: usize = 10;

/// Range of the computed roughness values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoughnessReport {
	pub radius: usize,
	/// Voxels in each neighbourhood, centre included.
	pub neighbors: usize,
	pub min: f32,
	pub max: f32,
}

/// Grid offsets within pixel distance `radius` of the origin, origin included.
pub fn neighborhood_offsets(radius: usize) -> Vec<[i64; 3]> {
	let mut offsets = Vec::new();
	let r = radius as i64;
	let r2 = r * r;

	for dk in -r..=r {
		let dk2 = dk * dk;
		for dj in -r..=r {
			let dj2 = dj * dj;
			for di in -r..=r {
				if di * di + dj2 + dk2 <= r2 {
					offsets.push([di, dj, dk]);
				}
			}
		}
	}
	offsets
}

impl Workspace {
	/// Local dispersion of `src` written into `dst`.
	///
	/// Every voxel gets the square root of the summed squared deviation of its
	/// periodic neighbourhood from that neighbourhood's mean. The sum is not
	/// divided by the neighbourhood size. `radius` is capped at 10.
	pub fn roughness(&mut self, src: usize, dst: usize, radius: usize) -> Result<RoughnessReport> {
		if radius == 0 {
			return Err(MapError::InvalidRadius(radius));
		}
		let radius = radius.min(MAX_ROUGH_RADIUS);
		self.maps.check(dst)?;
		let data = self.maps.slot(src)?;
		let (nx, ny, nz) = (self.geometry.nx as i64, self.geometry.ny as i64, self.geometry.nz as i64);

		let offsets = neighborhood_offsets(radius);
		let count = offsets.len() as f64;
		let mut out = vec![0.0f32; self.geometry.total_voxels];
		let mut values = vec![0.0f64; offsets.len()];
		let mut min = f32::INFINITY;
		let mut max = f32::NEG_INFINITY;

		let pb = voxel_progress(nz as usize, "Roughness");
		for z in 0..nz {
			for y in 0..ny {
				for x in 0..nx {
					for (slot, [di, dj, dk]) in values.iter_mut().zip(&offsets) {
						let i = (x + di).rem_euclid(nx);
						let j = (y + dj).rem_euclid(ny);
						let k = (z + dk).rem_euclid(nz);
						*slot = data[(i + j * nx + k * nx * ny) as usize] as f64;
					}
					let mean = values.iter().sum::<f64>() / count;
					let squares: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
					let rough = squares.sqrt() as f32;

					if rough < min {
						min = rough;
					}
					if rough > max {
						max = rough;
					}
					out[(x + y * nx + z * nx * ny) as usize] = rough;
				}
			}
			pb.inc(1);
		}
		pb.finish_with_message("Roughness complete!");

		self.map_mut(dst)?.copy_from_slice(&out);
		info!("Roughness over {} neighbours: min {:.6} max {:.6}", offsets.len(), min, max);
		Ok(RoughnessReport {
			radius,
			neighbors: offsets.len(),
			min,
			max,
		})
	}
}
