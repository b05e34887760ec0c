use log::debug;

use crate::density_map::error::Result;
use crate::density_map::workspace::Workspace;

/// An atom position in grid coordinates with its radius in Angstrom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomSite {
	pub grid: [f64; 3],
	pub radius: f64,
}

impl Workspace {
	/// Density of map `slot` inside a sphere of `radius` Angstrom around
	/// `center`, times the voxel volume.
	///
	/// Distances go through the unit-cell metric; the search box is clamped
	/// to the grid without wraparound.
	pub fn integrate(&self, center: [f64; 3], radius: f64, slot: usize) -> Result<f64> {
		let data = self.maps.slot(slot)?;
		let g = &self.geometry;
		let dims = g.dims();

		let mut lo = [0usize; 3];
		let mut hi = [0usize; 3];
		for axis in 0..3 {
			let reach = radius / g.spacing[axis];
			let max = dims[axis] as f64 - 1.0;
			let from = (center[axis] - reach - 1.0).floor().clamp(0.0, max);
			let to = (center[axis] + reach + 1.0).floor().clamp(0.0, max);
			lo[axis] = from as usize;
			hi[axis] = to as usize;
		}

		let mut sum = 0.0f64;
		let mut used = 0usize;
		for z in lo[2]..=hi[2] {
			for y in lo[1]..=hi[1] {
				for x in lo[0]..=hi[0] {
					let dist = g.metric_distance(
						x as f64 - center[0],
						y as f64 - center[1],
						z as f64 - center[2],
					);
					if dist <= radius {
						sum += data[g.index(x, y, z)] as f64;
						used += 1;
					}
				}
			}
		}
		debug!("Integrated {} voxels around {:?} (r = {:.2})", used, center, radius);
		Ok(sum * g.voxel_volume)
	}

	/// Integrate every site against map `slot`, in order.
	pub fn integrate_sites(&self, sites: &[AtomSite], slot: usize) -> Result<Vec<f64>> {
		sites
			.iter()
			.map(|site| self.integrate(site.grid, site.radius, slot))
			.collect()
	}
}
