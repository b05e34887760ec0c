use std::mem::size_of;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use crate::density_map::store::{MapStore, MaskStore};
use crate::density_map::workspace::Workspace;

/// Format large numbers with KB, MB, GB, TB suffixes
pub fn format_bytes(bytes: usize) -> String {
	const KB: usize = 1024;
	const MB: usize = KB * 1024;
	const GB: usize = MB * 1024;
	const TB: usize = GB * 1024;

	if bytes >= TB {
		format!("{:.2} TB", bytes as f64 / TB as f64)
	} else if bytes >= GB {
		format!("{:.2} GB", bytes as f64 / GB as f64)
	} else if bytes >= MB {
		format!("{:.2} MB", bytes as f64 / MB as f64)
	} else if bytes >= KB {
		format!("{:.2} KB", bytes as f64 / KB as f64)
	} else {
		format!("{} bytes", bytes)
	}
}

/// Progress bar over `len` steps, prefixed with `label`.
pub(crate) fn voxel_progress(len: usize, label: &str) -> ProgressBar {
	let pb = ProgressBar::new(len as u64);
	let style = ProgressStyle::with_template("{prefix}: [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
		.unwrap_or_else(|_| ProgressStyle::default_bar())
		.progress_chars("#>-");
	pb.set_style(style);
	pb.set_prefix(label.to_string());
	pb
}

impl Workspace {
	/// Bytes held by both stores.
	pub fn memory_bytes(&self) -> usize {
		self.maps.memory_bytes() + self.masks.memory_bytes()
	}

	/// Report memory usage and print a detailed breakdown
	pub fn report_memory(&self) {
		let struct_overhead = size_of::<Self>() - size_of::<MapStore>() - size_of::<MaskStore>();
		let map_bytes = self.maps.memory_bytes();
		let mask_bytes = self.masks.memory_bytes();

		info!("Workspace Memory Report:");
		info!("-------------------------");
		info!("  Dimensions: {} x {} x {}", self.geometry.nx, self.geometry.ny, self.geometry.nz);
		info!("  Total Voxels: {:e}", self.geometry.total_voxels as f64);
		info!("  Map Slots: {} ({})", self.maps.capacity(), format_bytes(map_bytes));
		info!("  Mask Slots: {} ({})", self.masks.capacity(), format_bytes(mask_bytes));
		info!("  Struct Overhead: {}", format_bytes(struct_overhead));
		info!("  Total Memory Used: {}", format_bytes(struct_overhead + map_bytes + mask_bytes));
		info!("-------------------------");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::density_map::header::MapHeader;
	use crate::density_map::workspace::StoreConfig;

	#[test]
	fn byte_suffixes() {
		assert_eq!(format_bytes(512), "512 bytes");
		assert_eq!(format_bytes(2048), "2.00 KB");
		assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
	}

	#[test]
	fn memory_counts_both_stores() {
		let header = MapHeader::new([8, 8, 8], [8.0, 8.0, 8.0, 90.0, 90.0, 90.0]);
		let ws = Workspace::new(header, StoreConfig { map_slots: 2, mask_slots: 1 }).unwrap();
		// 2 * 512 floats plus at least 512 bits
		assert!(ws.memory_bytes() >= 2 * 512 * 4 + 64);
	}
}
