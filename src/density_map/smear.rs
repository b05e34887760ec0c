use log::{debug, info};

use crate::density_map::error::{MapError, Result, SlotKind};
use crate::density_map::utils::voxel_progress;
use crate::density_map::workspace::Workspace;

/// Triangular taper `w[d] = (n - d) / S` for `d` in `0..n`, with
/// `S = n + 2 * (1 + 2 + ... + (n - 1))`.
pub fn taper_weights(n: usize) -> Vec<f64> {
	let norm = n as f64 + 2.0 * ((1..n).sum::<usize>() as f64);
	(0..n).map(|d| (n - d) as f64 / norm).collect()
}

impl Workspace {
	/// Separable triangular smoothing of `src` into `dst` with periodic wraparound.
	///
	/// Each axis pass spreads every voxel over `radius - 1` neighbours either
	/// side into `scratch`, which then feeds the next axis. `src` may equal
	/// `dst`; `scratch` must differ from `dst`.
	pub fn smear(&mut self, src: usize, dst: usize, scratch: usize, radius: usize) -> Result<()> {
		if radius == 0 {
			return Err(MapError::InvalidRadius(radius));
		}
		let d = self.maps.offset(dst)?;
		let t = self.maps.offset(scratch)?;
		self.maps.check(src)?;
		if dst == scratch {
			return Err(MapError::SlotConflict {
				kind: SlotKind::Map,
				slot: dst,
			});
		}

		let weights = taper_weights(radius);
		info!("Smearing map {} into {} with radius {}", src, dst, radius);
		for (i, w) in weights.iter().enumerate() {
			debug!("  weight[{}] = {:.6}", i, w);
		}

		self.copy_map(src, dst)?;
		self.invalidate_map(scratch);

		let (nx, ny, nz) = (self.geometry.nx, self.geometry.ny, self.geometry.nz);
		let voxels = self.geometry.total_voxels;
		let reach = radius as i64 - 1;
		let lens = [nx, ny, nz];
		let strides = [1, nx, nx * ny];

		let data = self.maps.data_mut();
		data[t..t + voxels].fill(0.0);

		let pb = voxel_progress(3 * nz, "Smearing");
		for axis in 0..3 {
			let len = lens[axis] as i64;
			let stride = strides[axis];
			for z in 0..nz {
				for y in 0..ny {
					for x in 0..nx {
						let v = x + y * nx + z * nx * ny;
						let coord = [x, y, z][axis] as i64;
						let base = v - coord as usize * stride;
						let value = data[d + v] as f64;
						if value == 0.0 {
							continue;
						}
						for off in -reach..=reach {
							let target = (coord + off).rem_euclid(len) as usize;
							let w = weights[off.unsigned_abs() as usize];
							let spread = (w * value) as f32;
							data[t + base + target * stride] += spread;
						}
					}
				}
				pb.inc(1);
			}
			data.copy_within(t..t + voxels, d);
			data[t..t + voxels].fill(0.0);
		}
		pb.finish_with_message("Smearing complete!");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::density_map::header::MapHeader;
	use crate::density_map::workspace::StoreConfig;

	fn workspace(dims: [usize; 3]) -> Workspace {
		let cell = [dims[0] as f32, dims[1] as f32, dims[2] as f32, 90.0, 90.0, 90.0];
		Workspace::new(MapHeader::new(dims, cell), StoreConfig { map_slots: 3, mask_slots: 1 }).unwrap()
	}

	#[test]
	fn weights_sum_to_one_over_both_sides() {
		for n in 1..8 {
			let w = taper_weights(n);
			let total = w[0] + 2.0 * w[1..].iter().sum::<f64>();
			assert!((total - 1.0).abs() < 1e-12);
		}
		assert_eq!(taper_weights(1), vec![1.0]);
		assert_eq!(taper_weights(2), vec![2.0 / 4.0, 1.0 / 4.0]);
	}

	#[test]
	fn constant_field_is_preserved() {
		let mut ws = workspace([6, 5, 4]);
		ws.map_mut(0).unwrap().fill(3.5);
		for radius in [1, 2, 4, 7] {
			ws.smear(0, 1, 2, radius).unwrap();
			for &v in ws.map(1).unwrap() {
				assert!((v - 3.5).abs() < 1e-4, "radius {} gave {}", radius, v);
			}
		}
	}

	#[test]
	fn spike_spreads_with_wraparound() {
		let mut ws = workspace([5, 3, 3]);
		ws.set_voxel(0, 0, 0, 0, 16.0).unwrap();
		ws.smear(0, 1, 2, 2).unwrap();
		// Per axis the spike keeps half and gives a quarter to each side.
		assert!((ws.voxel(1, 0, 0, 0).unwrap() - 2.0).abs() < 1e-5);
		assert!((ws.voxel(1, 4, 0, 0).unwrap() - 1.0).abs() < 1e-5);
		assert!((ws.voxel(1, 1, 2, 2).unwrap() - 0.25).abs() < 1e-5);
		assert_eq!(ws.voxel(1, 2, 0, 0).unwrap(), 0.0);
		let total: f32 = ws.map(1).unwrap().iter().sum();
		assert!((total - 16.0).abs() < 1e-4);
	}

	#[test]
	fn scratch_must_differ_from_destination() {
		let mut ws = workspace([4, 4, 4]);
		assert!(matches!(ws.smear(0, 1, 1, 2), Err(MapError::SlotConflict { .. })));
		assert!(matches!(ws.smear(0, 1, 2, 0), Err(MapError::InvalidRadius(0))));
	}

	#[test]
	fn in_place_smoothing() {
		let mut ws = workspace([4, 4, 4]);
		ws.map_mut(0).unwrap().fill(1.0);
		ws.smear(0, 0, 1, 3).unwrap();
		assert!(ws.map(0).unwrap().iter().all(|&v| (v - 1.0).abs() < 1e-5));
	}
}
