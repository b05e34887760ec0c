use log::info;

use crate::density_map::error::{MapError, Result, SlotKind};
use crate::density_map::utils::voxel_progress;
use crate::density_map::workspace::Workspace;

/// Largest cycle count accepted by `shape_fit`.
pub const MAX_SHAPE_CYCLES: usize = 100;

/// Growth and constriction events of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeCycle {
	pub cycle: usize,
	pub grown: usize,
	pub constrictions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeReport {
	pub cycles: Vec<ShapeCycle>,
	pub total_grown: usize,
	pub total_constrictions: usize,
}

/// Parameters of the frontier growth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
	/// Minimum drop from a mask voxel to the neighbour it grows into.
	pub min_dif: f32,
	/// Cycles to run, capped at 100.
	pub cycles: usize,
	/// Minimum mask voxels in the 3x3x3 block for growth to proceed.
	pub min_connect: usize,
}

impl Workspace {
	/// Grow mask `seed` into `out` toward declining values of map `map_ref`.
	///
	/// Each cycle visits every mask voxel at least two voxels away from the
	/// grid faces. A voxel whose 3x3x3 block holds fewer than `min_connect`
	/// mask voxels counts as a constriction. Otherwise its lowest unmasked
	/// block neighbour joins the mask when it lies more than `min_dif` below
	/// the voxel. Additions made during a cycle only take effect in the next.
	/// Exactly `cycles` cycles run.
	pub fn shape_fit(
		&mut self,
		seed: usize,
		out: usize,
		scratch: usize,
		map_ref: usize,
		params: ShapeParams,
	) -> Result<ShapeReport> {
		self.masks.check(seed)?;
		let o = self.masks.offset(out)?;
		let s = self.masks.offset(scratch)?;
		self.maps.check(map_ref)?;
		if out == scratch {
			return Err(MapError::SlotConflict {
				kind: SlotKind::Mask,
				slot: out,
			});
		}
		let n1 = params.cycles.min(MAX_SHAPE_CYCLES);

		self.copy_mask(seed, out)?;
		self.copy_mask(seed, scratch)?;

		let (nx, ny, nz) = (self.geometry.nx, self.geometry.ny, self.geometry.nz);
		let voxels = self.geometry.total_voxels;
		let map = self.maps.slot(map_ref)?;
		let bits = self.masks.bits_mut();

		let mut report = ShapeReport {
			cycles: Vec::with_capacity(n1),
			total_grown: 0,
			total_constrictions: 0,
		};

		let pb = voxel_progress(n1, "Shape cycles");
		for cycle in 1..=n1 {
			let mut grown = 0usize;
			let mut constrictions = 0usize;

			for z in 2..nz.saturating_sub(2) {
				for y in 2..ny.saturating_sub(2) {
					for x in 2..nx.saturating_sub(2) {
						let v = x + y * nx + z * nx * ny;
						if !bits[o + v] {
							continue;
						}

						let mut connected = 0usize;
						let mut lowest: Option<(usize, f32)> = None;
						for k in z - 1..=z + 1 {
							for j in y - 1..=y + 1 {
								for i in x - 1..=x + 1 {
									let n = i + j * nx + k * nx * ny;
									if bits[o + n] {
										connected += 1;
									} else if lowest.is_none_or(|(_, low)| map[n] < low) {
										lowest = Some((n, map[n]));
									}
								}
							}
						}

						if connected < params.min_connect {
							constrictions += 1;
							continue;
						}
						match lowest {
							Some((n, low)) if low < map[v] - params.min_dif => {
								if !bits[s + n] {
									grown += 1;
								}
								bits.set(s + n, true);
							}
							_ => {}
						}
					}
				}
			}

			bits.copy_within(s..s + voxels, o);
			info!("Cycle {}: {} voxels added, {} constrictions", cycle, grown, constrictions);
			report.cycles.push(ShapeCycle {
				cycle,
				grown,
				constrictions,
			});
			report.total_grown += grown;
			report.total_constrictions += constrictions;
			pb.inc(1);
		}
		pb.finish_with_message("Shape fitting complete!");

		self.invalidate_mask(out);
		self.invalidate_mask(scratch);
		info!(
			"Shape fitting: {} voxels added, {} constrictions over {} cycles",
			report.total_grown, report.total_constrictions, n1
		);
		Ok(report)
	}
}
