use crate::density_map::error::Result;
use crate::density_map::workspace::Workspace;
use crate::density_map::zone::Zone;

impl Workspace {
	/// Set every selected voxel of `slot` to zero. Returns the number selected.
	pub fn zero(&mut self, slot: usize, zone: Zone) -> Result<usize> {
		self.maps.check(slot)?;
		self.invalidate_map(slot);
		let filter = self.masks.filter(zone)?;
		let data = self.maps.slot_mut(slot)?;

		let mut total = 0usize;
		for (v, value) in data.iter_mut().enumerate() {
			if !filter.contains(v) {
				continue;
			}
			*value = 0.0;
			total += 1;
		}
		Ok(total)
	}

	/// Clamp selected voxels into `[min, max]`. Returns the number of voxels changed.
	pub fn clip(&mut self, slot: usize, zone: Zone, min: f32, max: f32) -> Result<usize> {
		self.maps.check(slot)?;
		self.invalidate_map(slot);
		let filter = self.masks.filter(zone)?;
		let data = self.maps.slot_mut(slot)?;

		let mut changed = 0usize;
		for (v, value) in data.iter_mut().enumerate() {
			if !filter.contains(v) {
				continue;
			}
			let before = *value;
			if *value < min {
				*value = min;
			}
			if *value > max {
				*value = max;
			}
			if *value != before {
				changed += 1;
			}
		}
		Ok(changed)
	}

	/// `dst += factor * src` over the zone. `factor` of +1 adds, -1 subtracts.
	pub fn combine(&mut self, dst: usize, src: usize, zone: Zone, factor: f32) -> Result<usize> {
		let d = self.maps.offset(dst)?;
		let s = self.maps.offset(src)?;
		self.invalidate_map(dst);
		let voxels = self.maps.voxels();
		let filter = self.masks.filter(zone)?;
		let data = self.maps.data_mut();

		let mut total = 0usize;
		for v in 0..voxels {
			if !filter.contains(v) {
				continue;
			}
			let delta = factor * data[s + v];
			data[d + v] += delta;
			total += 1;
		}
		Ok(total)
	}

	/// Add map `src` to `dst` over the zone.
	pub fn add_map(&mut self, dst: usize, src: usize, zone: Zone) -> Result<usize> {
		self.combine(dst, src, zone, 1.0)
	}

	/// Subtract map `src` from `dst` over the zone.
	pub fn subtract_map(&mut self, dst: usize, src: usize, zone: Zone) -> Result<usize> {
		self.combine(dst, src, zone, -1.0)
	}

	/// Multiply selected voxels by `factor`.
	pub fn scale(&mut self, slot: usize, zone: Zone, factor: f32) -> Result<usize> {
		self.maps.check(slot)?;
		self.invalidate_map(slot);
		let filter = self.masks.filter(zone)?;
		let data = self.maps.slot_mut(slot)?;

		let mut total = 0usize;
		for (v, value) in data.iter_mut().enumerate() {
			if filter.contains(v) {
				*value *= factor;
				total += 1;
			}
		}
		Ok(total)
	}

	/// Add a constant to selected voxels.
	pub fn add_constant(&mut self, slot: usize, zone: Zone, value: f32) -> Result<usize> {
		self.maps.check(slot)?;
		self.invalidate_map(slot);
		let filter = self.masks.filter(zone)?;
		let data = self.maps.slot_mut(slot)?;

		let mut total = 0usize;
		for (v, voxel) in data.iter_mut().enumerate() {
			if filter.contains(v) {
				*voxel += value;
				total += 1;
			}
		}
		Ok(total)
	}

	/// `dst = max(a, b)` voxel by voxel over the whole grid.
	pub fn max_of(&mut self, dst: usize, a: usize, b: usize) -> Result<()> {
		let d = self.maps.offset(dst)?;
		let oa = self.maps.offset(a)?;
		let ob = self.maps.offset(b)?;
		self.invalidate_map(dst);
		let voxels = self.maps.voxels();
		let data = self.maps.data_mut();
		for v in 0..voxels {
			let (va, vb) = (data[oa + v], data[ob + v]);
			data[d + v] = if va < vb { vb } else { va };
		}
		Ok(())
	}

	/// `dst = a OR b` over the whole grid.
	pub fn max_mask(&mut self, dst: usize, a: usize, b: usize) -> Result<()> {
		let d = self.masks.offset(dst)?;
		let oa = self.masks.offset(a)?;
		let ob = self.masks.offset(b)?;
		self.invalidate_mask(dst);
		let voxels = self.masks.voxels();
		let bits = self.masks.bits_mut();
		for v in 0..voxels {
			let set = bits[oa + v] || bits[ob + v];
			bits.set(d + v, set);
		}
		Ok(())
	}

	/// `dst = 0` where either input is 0, else 1.
	pub fn min_mask(&mut self, dst: usize, a: usize, b: usize) -> Result<()> {
		let d = self.masks.offset(dst)?;
		let oa = self.masks.offset(a)?;
		let ob = self.masks.offset(b)?;
		self.invalidate_mask(dst);
		let voxels = self.masks.voxels();
		let bits = self.masks.bits_mut();
		for v in 0..voxels {
			let set = bits[oa + v] && bits[ob + v];
			bits.set(d + v, set);
		}
		Ok(())
	}

	/// `dst = 1 - src` over the whole grid.
	pub fn flip(&mut self, dst: usize, src: usize) -> Result<()> {
		let d = self.masks.offset(dst)?;
		let s = self.masks.offset(src)?;
		self.invalidate_mask(dst);
		let voxels = self.masks.voxels();
		let bits = self.masks.bits_mut();
		for v in 0..voxels {
			let set = !bits[s + v];
			bits.set(d + v, set);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use crate::density_map::header::MapHeader;
	use crate::density_map::workspace::{StoreConfig, Workspace};
	use crate::density_map::zone::Zone;

	fn workspace() -> Workspace {
		let header = MapHeader::new([4, 2, 2], [4.0, 2.0, 2.0, 90.0, 90.0, 90.0]);
		Workspace::new(header, StoreConfig { map_slots: 3, mask_slots: 3 }).unwrap()
	}

	fn ramp(ws: &mut Workspace, slot: usize) {
		for (i, v) in ws.map_mut(slot).unwrap().iter_mut().enumerate() {
			*v = i as f32;
		}
	}

	/// Mask 0 covers the first half of the voxels.
	fn half_mask(ws: &mut Workspace) {
		let bits = ws.mask_mut(0).unwrap();
		for i in 0..8 {
			bits.set(i, true);
		}
	}

	#[test]
	fn zero_inside_leaves_outside_untouched() {
		let mut ws = workspace();
		ramp(&mut ws, 0);
		half_mask(&mut ws);
		assert_eq!(ws.zero(0, Zone::Inside(0)).unwrap(), 8);
		let map = ws.map(0).unwrap();
		assert!(map[..8].iter().all(|&v| v == 0.0));
		assert_eq!(map[8], 8.0);
		assert_eq!(map[15], 15.0);
	}

	#[test]
	fn inside_and_outside_counts_cover_the_grid() {
		let mut ws = workspace();
		half_mask(&mut ws);
		ws.set_mask_voxel(0, 3, 1, 1, true).unwrap();
		let inside = ws.zero(1, Zone::Inside(0)).unwrap();
		let outside = ws.zero(1, Zone::Outside(0)).unwrap();
		assert_eq!(inside + outside, 16);
		assert_eq!(inside, 9);
	}

	#[test]
	fn clip_counts_changed_voxels() {
		let mut ws = workspace();
		ramp(&mut ws, 0);
		let changed = ws.clip(0, Zone::Total, 2.0, 12.0).unwrap();
		assert_eq!(changed, 2 + 3);
		let map = ws.map(0).unwrap();
		assert_eq!(map[0], 2.0);
		assert_eq!(map[5], 5.0);
		assert_eq!(map[15], 12.0);
	}

	#[test]
	fn combine_blends_only_within_zone() {
		let mut ws = workspace();
		ramp(&mut ws, 1);
		ws.map_mut(0).unwrap().fill(1.0);
		half_mask(&mut ws);
		ws.combine(0, 1, Zone::Outside(0), 0.5).unwrap();
		let map = ws.map(0).unwrap();
		assert_eq!(map[0], 1.0);
		assert_eq!(map[10], 1.0 + 5.0);

		ws.subtract_map(0, 1, Zone::Total).unwrap();
		assert_eq!(ws.map(0).unwrap()[2], 1.0 - 2.0);
	}

	#[test]
	fn combine_with_itself_doubles() {
		let mut ws = workspace();
		ramp(&mut ws, 0);
		ws.add_map(0, 0, Zone::Total).unwrap();
		assert_eq!(ws.map(0).unwrap()[7], 14.0);
	}

	#[test]
	fn scale_and_add_constant() {
		let mut ws = workspace();
		ramp(&mut ws, 0);
		half_mask(&mut ws);
		assert_eq!(ws.scale(0, Zone::Inside(0), 2.0).unwrap(), 8);
		assert_eq!(ws.add_constant(0, Zone::Total, -1.0).unwrap(), 16);
		let map = ws.map(0).unwrap();
		assert_eq!(map[3], 5.0);
		assert_eq!(map[9], 8.0);
	}

	#[test]
	fn max_of_takes_larger_value() {
		let mut ws = workspace();
		ramp(&mut ws, 0);
		ws.map_mut(1).unwrap().fill(7.5);
		ws.max_of(2, 0, 1).unwrap();
		let map = ws.map(2).unwrap();
		assert_eq!(map[0], 7.5);
		assert_eq!(map[12], 12.0);
	}

	#[test]
	fn mask_algebra() {
		let mut ws = workspace();
		half_mask(&mut ws);
		{
			let bits = ws.mask_mut(1).unwrap();
			for i in (0..16).step_by(2) {
				bits.set(i, true);
			}
		}
		ws.max_mask(2, 0, 1).unwrap();
		for v in 0..16 {
			let k0 = ws.mask(0).unwrap()[v];
			let k1 = ws.mask(1).unwrap()[v];
			assert_eq!(ws.mask(2).unwrap()[v], k0 || k1);
		}
		ws.min_mask(2, 0, 1).unwrap();
		for v in 0..16 {
			let k0 = ws.mask(0).unwrap()[v];
			let k1 = ws.mask(1).unwrap()[v];
			assert_eq!(!ws.mask(2).unwrap()[v], !k0 || !k1);
		}
		ws.flip(2, 0).unwrap();
		for v in 0..16 {
			assert_eq!(ws.mask(2).unwrap()[v], !ws.mask(0).unwrap()[v]);
		}
	}

	#[test]
	fn zone_ops_reject_unknown_mask() {
		let mut ws = workspace();
		assert!(ws.zero(0, Zone::Inside(9)).is_err());
		assert!(ws.zero(5, Zone::Total).is_err());
	}
}
