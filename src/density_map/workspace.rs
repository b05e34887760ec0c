use std::collections::HashMap;

use bitvec::slice::BitSlice;
use log::info;

use crate::density_map::error::{MapError, Result, SlotKind};
use crate::density_map::geometry::GridGeometry;
use crate::density_map::header::MapHeader;
use crate::density_map::stats::StatsEntry;
use crate::density_map::store::{MapStore, MaskStore};
use crate::density_map::zone::Zone;

/// Slot capacities for the two stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
	pub map_slots: usize,
	pub mask_slots: usize,
}

impl Default for StoreConfig {
	fn default() -> Self {
		Self {
			map_slots: 3,
			mask_slots: 1,
		}
	}
}

/// Owns the reference geometry, every map and mask slot, and their headers.
///
/// Map slot 0 holds the reference map once one has been loaded; its header is
/// the one written in front of every saved map.
pub struct Workspace {
	pub(crate) geometry: GridGeometry,
	pub(crate) map_headers: Vec<MapHeader>,
	pub(crate) mask_headers: Vec<Option<MapHeader>>,
	pub(crate) maps: MapStore,
	pub(crate) masks: MaskStore,
	pub(crate) stats: HashMap<(usize, Zone), StatsEntry>,
}

impl Workspace {
	/// Establish geometry from `reference` and allocate zeroed stores.
	///
	/// Map slot 0 receives `reference` as its header; its voxels stay zero
	/// until something is written into them.
	pub fn new(reference: MapHeader, config: StoreConfig) -> Result<Self> {
		let geometry = GridGeometry::from_header(&reference)?;
		if config.map_slots == 0 {
			return Err(MapError::Allocation {
				kind: SlotKind::Map,
				slots: 0,
				voxels: geometry.total_voxels,
			});
		}

		info!("Assigning memory for {} maps and {} masks", config.map_slots, config.mask_slots);
		let maps = MapStore::allocate(config.map_slots, geometry.total_voxels)?;
		let masks = MaskStore::allocate(config.mask_slots, geometry.total_voxels)?;

		Ok(Self {
			map_headers: vec![reference; config.map_slots],
			mask_headers: vec![None; config.mask_slots],
			geometry,
			maps,
			masks,
			stats: HashMap::new(),
		})
	}

	pub fn geometry(&self) -> &GridGeometry {
		&self.geometry
	}

	pub fn map_capacity(&self) -> usize {
		self.maps.capacity()
	}

	pub fn mask_capacity(&self) -> usize {
		self.masks.capacity()
	}

	/// Header of the reference map (slot 0).
	pub fn reference_header(&self) -> &MapHeader {
		&self.map_headers[0]
	}

	pub fn map_header(&self, slot: usize) -> Result<&MapHeader> {
		self.maps.check(slot)?;
		Ok(&self.map_headers[slot])
	}

	/// Header last loaded into mask `slot`, if any.
	pub fn mask_header(&self, slot: usize) -> Result<Option<&MapHeader>> {
		self.masks.check(slot)?;
		Ok(self.mask_headers[slot].as_ref())
	}

	pub fn map(&self, slot: usize) -> Result<&[f32]> {
		self.maps.slot(slot)
	}

	/// Mutable voxels of a map slot; drops any cached statistics for it.
	pub fn map_mut(&mut self, slot: usize) -> Result<&mut [f32]> {
		self.maps.check(slot)?;
		self.invalidate_map(slot);
		self.maps.slot_mut(slot)
	}

	pub fn mask(&self, slot: usize) -> Result<&BitSlice> {
		self.masks.slot(slot)
	}

	/// Mutable bits of a mask slot; drops cached statistics of zones using it.
	pub fn mask_mut(&mut self, slot: usize) -> Result<&mut BitSlice> {
		self.masks.check(slot)?;
		self.invalidate_mask(slot);
		self.masks.slot_mut(slot)
	}

	/// Value of map `slot` at grid point (x, y, z), zero-based.
	pub fn voxel(&self, slot: usize, x: usize, y: usize, z: usize) -> Result<f32> {
		self.maps.get(slot, self.geometry.checked_index(x, y, z)?)
	}

	pub fn set_voxel(&mut self, slot: usize, x: usize, y: usize, z: usize, value: f32) -> Result<()> {
		let index = self.geometry.checked_index(x, y, z)?;
		self.maps.check(slot)?;
		self.invalidate_map(slot);
		self.maps.set(slot, index, value)
	}

	pub fn mask_voxel(&self, slot: usize, x: usize, y: usize, z: usize) -> Result<bool> {
		self.masks.get(slot, self.geometry.checked_index(x, y, z)?)
	}

	pub fn set_mask_voxel(&mut self, slot: usize, x: usize, y: usize, z: usize, value: bool) -> Result<()> {
		let index = self.geometry.checked_index(x, y, z)?;
		self.masks.check(slot)?;
		self.invalidate_mask(slot);
		self.masks.set(slot, index, value)
	}

	/// Copy map `src` into `dst`; the two are independent afterwards.
	pub fn copy_map(&mut self, src: usize, dst: usize) -> Result<()> {
		self.maps.copy(src, dst)?;
		self.invalidate_map(dst);
		Ok(())
	}

	/// Copy mask `src` into `dst`.
	pub fn copy_mask(&mut self, src: usize, dst: usize) -> Result<()> {
		self.masks.copy(src, dst)?;
		self.invalidate_mask(dst);
		Ok(())
	}

	pub(crate) fn invalidate_map(&mut self, slot: usize) {
		self.stats.retain(|(s, _), _| *s != slot);
	}

	pub(crate) fn invalidate_mask(&mut self, mask: usize) {
		self.stats.retain(|(_, zone), _| zone.mask() != Some(mask));
	}
}
