use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use log::info;

use crate::density_map::error::{MapError, Result};
use crate::density_map::header::MapHeader;
use crate::density_map::mrc_input::MaskSummary;
use crate::density_map::workspace::Workspace;

fn write_file(path: &Path, header: &MapHeader, payload: &[u8]) -> Result<()> {
	let start_time = Instant::now();
	let file = File::create(path).map_err(|e| MapError::io(path, e))?;
	let mut writer = BufWriter::new(file);

	header.write_to(&mut writer).map_err(|e| MapError::io(path, e))?;
	writer.write_all(payload).map_err(|e| MapError::io(path, e))?;
	writer.flush().map_err(|e| MapError::io(path, e))?;

	info!("MRC file saved: {}", path.display());
	info!("Save Time: {:.3} seconds", start_time.elapsed().as_secs_f64());
	Ok(())
}

impl Workspace {
	/// Save map `slot` behind the reference map's header.
	pub fn write_map(&self, path: impl AsRef<Path>, slot: usize) -> Result<()> {
		let values = self.maps.slot(slot)?;
		let mut payload = Vec::with_capacity(values.len() * 4);
		for v in values {
			payload.extend_from_slice(&v.to_le_bytes());
		}
		write_file(path.as_ref(), self.reference_header(), &payload)
	}

	/// Save mask `slot` as one byte per voxel.
	///
	/// Uses the header of mask slot 0 if a mask was loaded there, otherwise
	/// the reference map header.
	pub fn write_mask(&self, path: impl AsRef<Path>, slot: usize) -> Result<MaskSummary> {
		let bits = self.masks.slot(slot)?;
		let payload: Vec<u8> = bits.iter().map(|b| if *b { 1u8 } else { 0u8 }).collect();

		let header = self
			.mask_headers
			.first()
			.and_then(|h| h.as_ref())
			.unwrap_or_else(|| self.reference_header());
		write_file(path.as_ref(), header, &payload)?;

		let summary = MaskSummary {
			total: bits.len(),
			ones: bits.count_ones(),
		};
		summary.report("MASKO");
		Ok(summary)
	}
}
