use log::debug;

use crate::density_map::error::{MapError, Result};
use crate::density_map::workspace::Workspace;
use crate::density_map::zone::Zone;

/// Single-pass extrema, sum and mean over one zone of one map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneParms {
	pub max: f32,
	pub min: f32,
	pub sum: f64,
	pub count: usize,
	pub mean: f64,
	/// Sum scaled by map volume over total voxel count.
	pub total: f64,
}

/// Full statistics of one (slot, zone) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneStats {
	pub max: f32,
	pub min: f32,
	pub sum: f64,
	pub count: usize,
	pub mean: f64,
	pub total: f64,
	pub variance: f64,
	pub rms: f64,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct StatsEntry {
	parms: ZoneParms,
	spread: Option<(f64, f64)>,
}

impl Workspace {
	/// Max, min, sum, count, mean and integrated total of `slot` over `zone`.
	///
	/// For `Zone::Total` the slot header's amax/amin/amean are updated.
	pub fn find_parms(&mut self, slot: usize, zone: Zone) -> Result<ZoneParms> {
		if let Some(entry) = self.stats.get(&(slot, zone)) {
			return Ok(entry.parms);
		}

		let filter = self.masks.filter(zone)?;
		let data = self.maps.slot(slot)?;

		let mut max = f32::NEG_INFINITY;
		let mut min = f32::INFINITY;
		let mut sum = 0.0f64;
		let mut count = 0usize;
		for (v, &value) in data.iter().enumerate() {
			if !filter.contains(v) {
				continue;
			}
			if value > max {
				max = value;
			}
			if value < min {
				min = value;
			}
			sum += value as f64;
			count += 1;
		}
		if count == 0 {
			return Err(MapError::DegenerateZone { slot, zone });
		}

		let mean = sum / count as f64;
		let total = sum * self.geometry.map_volume / self.geometry.total_voxels as f64;
		let parms = ZoneParms {
			max,
			min,
			sum,
			count,
			mean,
			total,
		};
		debug!("Map {} in {}: max {} min {} mean {} over {} voxels", slot, zone, max, min, mean, count);

		if zone == Zone::Total {
			let header = &mut self.map_headers[slot];
			header.amax = max;
			header.amin = min;
			header.amean = mean as f32;
		}
		self.stats.insert((slot, zone), StatsEntry { parms, spread: None });
		Ok(parms)
	}

	/// Variance and rms of `slot` over `zone`, around the mean of `find_parms`.
	///
	/// For `Zone::Total` the slot header's rms field is updated.
	pub fn find_rms(&mut self, slot: usize, zone: Zone) -> Result<(f64, f64)> {
		let parms = self.find_parms(slot, zone)?;
		if let Some((variance, rms)) = self.stats.get(&(slot, zone)).and_then(|e| e.spread) {
			return Ok((variance, rms));
		}

		let filter = self.masks.filter(zone)?;
		let data = self.maps.slot(slot)?;
		let mut squares = 0.0f64;
		for (v, &value) in data.iter().enumerate() {
			if filter.contains(v) {
				let dev = value as f64 - parms.mean;
				squares += dev * dev;
			}
		}
		let variance = squares / parms.count as f64;
		let rms = variance.sqrt();

		if zone == Zone::Total {
			self.map_headers[slot].set_rms(rms as f32);
		}
		self.stats.insert(
			(slot, zone),
			StatsEntry {
				parms,
				spread: Some((variance, rms)),
			},
		);
		Ok((variance, rms))
	}

	/// Everything `find_parms` and `find_rms` compute, in one record.
	pub fn statistics(&mut self, slot: usize, zone: Zone) -> Result<ZoneStats> {
		let p = self.find_parms(slot, zone)?;
		let (variance, rms) = self.find_rms(slot, zone)?;
		Ok(ZoneStats {
			max: p.max,
			min: p.min,
			sum: p.sum,
			count: p.count,
			mean: p.mean,
			total: p.total,
			variance,
			rms,
		})
	}

	/// Mean density of `slot` over `zone`.
	pub fn mean(&mut self, slot: usize, zone: Zone) -> Result<f64> {
		Ok(self.find_parms(slot, zone)?.mean)
	}
}
