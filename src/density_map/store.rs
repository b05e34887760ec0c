use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;

use crate::density_map::error::{MapError, Result, SlotKind};
use crate::density_map::zone::Zone;

/// Fixed-capacity map slots sharing one contiguous f32 allocation.
///
/// Voxel `v` of slot `s` lives at `v + s * voxels`.
#[derive(Clone)]
pub struct MapStore {
	capacity: usize,
	voxels: usize,
	data: Vec<f32>,
}

impl MapStore {
	/// Allocate `capacity` zeroed slots of `voxels` values each.
	pub fn allocate(capacity: usize, voxels: usize) -> Result<Self> {
		let fail = || MapError::Allocation {
			kind: SlotKind::Map,
			slots: capacity,
			voxels,
		};
		let len = capacity.checked_mul(voxels).ok_or_else(fail)?;
		let mut data: Vec<f32> = Vec::new();
		data.try_reserve_exact(len).map_err(|_| fail())?;
		data.resize(len, 0.0);
		Ok(Self { capacity, voxels, data })
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn voxels(&self) -> usize {
		self.voxels
	}

	pub fn check(&self, slot: usize) -> Result<()> {
		if slot < self.capacity {
			Ok(())
		} else {
			Err(MapError::SlotOutOfRange {
				kind: SlotKind::Map,
				slot,
				capacity: self.capacity,
			})
		}
	}

	/// Linear offset of the first voxel of `slot`.
	pub fn offset(&self, slot: usize) -> Result<usize> {
		self.check(slot)?;
		Ok(slot * self.voxels)
	}

	pub fn slot(&self, slot: usize) -> Result<&[f32]> {
		let start = self.offset(slot)?;
		Ok(&self.data[start..start + self.voxels])
	}

	pub fn slot_mut(&mut self, slot: usize) -> Result<&mut [f32]> {
		let start = self.offset(slot)?;
		Ok(&mut self.data[start..start + self.voxels])
	}

	#[inline]
	pub fn get(&self, slot: usize, index: usize) -> Result<f32> {
		let voxels = self.voxels;
		self.slot(slot)?
			.get(index)
			.copied()
			.ok_or_else(|| out_of_range(SlotKind::Map, index, voxels))
	}

	#[inline]
	pub fn set(&mut self, slot: usize, index: usize, value: f32) -> Result<()> {
		let voxels = self.voxels;
		let voxel = self
			.slot_mut(slot)?
			.get_mut(index)
			.ok_or_else(|| out_of_range(SlotKind::Map, index, voxels))?;
		*voxel = value;
		Ok(())
	}

	/// Duplicate the full payload of `src` into `dst`.
	pub fn copy(&mut self, src: usize, dst: usize) -> Result<()> {
		let from = self.offset(src)?;
		let to = self.offset(dst)?;
		if from != to {
			self.data.copy_within(from..from + self.voxels, to);
		}
		Ok(())
	}

	/// The whole backing allocation, all slots back to back.
	pub fn data(&self) -> &[f32] {
		&self.data
	}

	pub fn data_mut(&mut self) -> &mut [f32] {
		&mut self.data
	}

	pub fn memory_bytes(&self) -> usize {
		self.data.capacity() * std::mem::size_of::<f32>()
	}
}

/// Fixed-capacity mask slots sharing one bit-packed allocation.
#[derive(Clone)]
pub struct MaskStore {
	capacity: usize,
	voxels: usize,
	bits: BitVec,
}

/// Voxel filter for one `Zone` over a borrowed mask slot.
pub struct ZoneFilter<'a> {
	mask: Option<(&'a BitSlice, bool)>,
}

impl ZoneFilter<'_> {
	/// Filter that selects every voxel.
	pub fn everything() -> Self {
		Self { mask: None }
	}

	#[inline]
	pub fn contains(&self, index: usize) -> bool {
		match self.mask {
			None => true,
			Some((bits, wanted)) => bits[index] == wanted,
		}
	}

	/// Number of selected voxels out of `voxels`.
	pub fn count(&self, voxels: usize) -> usize {
		match self.mask {
			None => voxels,
			Some((bits, true)) => bits.count_ones(),
			Some((bits, false)) => bits.count_zeros(),
		}
	}
}

impl MaskStore {
	/// Allocate `capacity` zeroed mask slots of `voxels` bits each.
	pub fn allocate(capacity: usize, voxels: usize) -> Result<Self> {
		let fail = || MapError::Allocation {
			kind: SlotKind::Mask,
			slots: capacity,
			voxels,
		};
		let len = capacity.checked_mul(voxels).ok_or_else(fail)?;
		let words = len.div_ceil(usize::BITS as usize);
		let mut backing: Vec<usize> = Vec::new();
		backing.try_reserve_exact(words).map_err(|_| fail())?;
		backing.resize(words, 0);
		let mut bits = BitVec::from_vec(backing);
		bits.truncate(len);
		Ok(Self { capacity, voxels, bits })
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn voxels(&self) -> usize {
		self.voxels
	}

	pub fn check(&self, slot: usize) -> Result<()> {
		if slot < self.capacity {
			Ok(())
		} else {
			Err(MapError::SlotOutOfRange {
				kind: SlotKind::Mask,
				slot,
				capacity: self.capacity,
			})
		}
	}

	pub fn offset(&self, slot: usize) -> Result<usize> {
		self.check(slot)?;
		Ok(slot * self.voxels)
	}

	pub fn slot(&self, slot: usize) -> Result<&BitSlice> {
		let start = self.offset(slot)?;
		Ok(&self.bits[start..start + self.voxels])
	}

	pub fn slot_mut(&mut self, slot: usize) -> Result<&mut BitSlice> {
		let start = self.offset(slot)?;
		let voxels = self.voxels;
		Ok(&mut self.bits[start..start + voxels])
	}

	#[inline]
	pub fn get(&self, slot: usize, index: usize) -> Result<bool> {
		self.slot(slot)?
			.get(index)
			.map(|bit| *bit)
			.ok_or_else(|| out_of_range(SlotKind::Mask, index, self.voxels))
	}

	#[inline]
	pub fn set(&mut self, slot: usize, index: usize, value: bool) -> Result<()> {
		if index >= self.voxels {
			return Err(out_of_range(SlotKind::Mask, index, self.voxels));
		}
		self.slot_mut(slot)?.set(index, value);
		Ok(())
	}

	pub fn copy(&mut self, src: usize, dst: usize) -> Result<()> {
		let from = self.offset(src)?;
		let to = self.offset(dst)?;
		if from != to {
			self.bits.copy_within(from..from + self.voxels, to);
		}
		Ok(())
	}

	/// Count the number of set voxels in `slot`
	pub fn count_filled(&self, slot: usize) -> Result<usize> {
		Ok(self.slot(slot)?.count_ones())
	}

	/// Build the voxel filter for `zone`; `Total` never touches the mask store.
	pub fn filter(&self, zone: Zone) -> Result<ZoneFilter<'_>> {
		match (zone.mask(), zone.required_bit()) {
			(Some(mask), Some(wanted)) => Ok(ZoneFilter {
				mask: Some((self.slot(mask)?, wanted)),
			}),
			_ => Ok(ZoneFilter::everything()),
		}
	}

	pub fn bits(&self) -> &BitSlice {
		self.bits.as_bitslice()
	}

	pub fn bits_mut(&mut self) -> &mut BitSlice {
		self.bits.as_mut_bitslice()
	}

	pub fn memory_bytes(&self) -> usize {
		self.bits.capacity() / 8
	}
}

fn out_of_range(kind: SlotKind, index: usize, voxels: usize) -> MapError {
	MapError::VoxelOutOfRange { kind, index, voxels }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn map_slots_start_zeroed_and_are_independent() {
		let mut store = MapStore::allocate(3, 8).unwrap();
		assert!(store.data().iter().all(|&v| v == 0.0));
		store.set(1, 4, 2.5).unwrap();
		store.copy(1, 2).unwrap();
		store.set(1, 4, -1.0).unwrap();
		assert_eq!(store.get(2, 4).unwrap(), 2.5);
		assert_eq!(store.get(1, 4).unwrap(), -1.0);
		assert_eq!(store.get(0, 4).unwrap(), 0.0);
	}

	#[test]
	fn slot_index_beyond_capacity_is_an_error() {
		let store = MapStore::allocate(2, 8).unwrap();
		assert!(matches!(
			store.slot(2),
			Err(MapError::SlotOutOfRange { kind: SlotKind::Map, slot: 2, capacity: 2 })
		));
		let masks = MaskStore::allocate(1, 8).unwrap();
		assert!(masks.get(1, 0).is_err());
	}

	#[test]
	fn oversized_allocation_is_reported() {
		assert!(matches!(
			MapStore::allocate(usize::MAX, 2),
			Err(MapError::Allocation { kind: SlotKind::Map, .. })
		));
	}

	#[test]
	fn mask_copy_and_count() {
		let mut masks = MaskStore::allocate(2, 10).unwrap();
		assert_eq!(masks.bits().len(), 20);
		masks.set(0, 3, true).unwrap();
		masks.set(0, 7, true).unwrap();
		masks.copy(0, 1).unwrap();
		assert_eq!(masks.count_filled(1).unwrap(), 2);
		masks.set(0, 3, false).unwrap();
		assert!(masks.get(1, 3).unwrap());
	}

	#[test]
	fn zone_filters_partition_the_grid() {
		let mut masks = MaskStore::allocate(1, 6).unwrap();
		masks.set(0, 0, true).unwrap();
		masks.set(0, 5, true).unwrap();
		let inside = masks.filter(Zone::Inside(0)).unwrap();
		let outside = masks.filter(Zone::Outside(0)).unwrap();
		assert_eq!(inside.count(6) + outside.count(6), 6);
		assert!(inside.contains(5) && !outside.contains(5));
		assert!(!inside.contains(2) && outside.contains(2));
		assert_eq!(masks.filter(Zone::Total).unwrap().count(6), 6);
	}

	#[test]
	fn total_zone_does_not_need_a_valid_mask() {
		let masks = MaskStore::allocate(0, 6).unwrap();
		assert!(masks.filter(Zone::Total).is_ok());
		assert!(masks.filter(Zone::Inside(0)).is_err());
	}

	#[test]
	fn voxel_index_past_the_slot_is_an_error() {
		let mut maps = MapStore::allocate(2, 8).unwrap();
		// index 8 of slot 0 would otherwise reach slot 1
		assert!(matches!(
			maps.set(0, 8, 1.0),
			Err(MapError::VoxelOutOfRange { kind: SlotKind::Map, index: 8, voxels: 8 })
		));
		assert!(maps.get(1, 8).is_err());
		assert!(maps.data().iter().all(|&v| v == 0.0));

		let mut masks = MaskStore::allocate(2, 8).unwrap();
		assert!(matches!(
			masks.set(0, 8, true),
			Err(MapError::VoxelOutOfRange { kind: SlotKind::Mask, .. })
		));
		assert!(masks.get(0, 8).is_err());
		assert_eq!(masks.count_filled(1).unwrap(), 0);
	}
}
