use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use log::{info, warn};

use crate::density_map::error::{MapError, Result};
use crate::density_map::header::{HeaderError, MapHeader};
use crate::density_map::workspace::{StoreConfig, Workspace};

/// Pixel tally of a mask read from or written to disk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskSummary {
	pub total: usize,
	pub ones: usize,
}

impl MaskSummary {
	/// Fraction of voxels equal to 1.
	pub fn fraction(&self) -> f64 {
		if self.total == 0 {
			0.0
		} else {
			self.ones as f64 / self.total as f64
		}
	}

	pub(crate) fn report(&self, tag: &str) {
		info!("{} => Total pixels in mask are {}", tag, self.total);
		info!("{} => Pixels with value 1 =>   {}", tag, self.ones);
		info!("{} => Pixels with value 0 =>   {}", tag, self.total - self.ones);
	}
}

fn open(path: &Path) -> Result<BufReader<File>> {
	File::open(path)
		.map(BufReader::new)
		.map_err(|e| MapError::io(path, e))
}

fn read_header(path: &Path, reader: &mut impl Read) -> Result<MapHeader> {
	MapHeader::read_from(reader).map_err(|e| match e {
		HeaderError::Io(source) => MapError::io(path, source),
		other => MapError::InvalidHeader(other.to_string()),
	})
}

/// Read `voxels` little-endian f32 values.
fn read_map_payload(path: &Path, reader: &mut impl Read, voxels: usize) -> Result<Vec<f32>> {
	let mut raw = vec![0u8; voxels * 4];
	reader.read_exact(&mut raw).map_err(|e| MapError::io(path, e))?;
	Ok(raw
		.chunks_exact(4)
		.map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
		.collect())
}

impl Workspace {
	/// Load the reference map into slot 0 and allocate every store from it.
	pub fn load_reference(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self> {
		let path = path.as_ref();
		let start_time = Instant::now();
		let mut reader = open(path)?;
		let header = read_header(path, &mut reader)?;

		let mut ws = Workspace::new(header, config)?;
		ws.geometry.report();

		let values = read_map_payload(path, &mut reader, ws.geometry.total_voxels)?;
		ws.maps.slot_mut(0)?.copy_from_slice(&values);

		info!(
			"Reference map {} loaded in {:.3} seconds",
			path.display(),
			start_time.elapsed().as_secs_f64()
		);
		Ok(ws)
	}

	/// Load a map into `slot`, overwriting it.
	///
	/// The header is checked against the reference grid before any voxel is
	/// touched, and the whole payload is read before it is committed.
	pub fn load_map(&mut self, path: impl AsRef<Path>, slot: usize) -> Result<()> {
		let path = path.as_ref();
		self.maps.check(slot)?;
		let mut reader = open(path)?;
		let header = read_header(path, &mut reader)?;
		self.check_dims(&header)?;

		let values = read_map_payload(path, &mut reader, self.geometry.total_voxels)?;
		self.maps.slot_mut(slot)?.copy_from_slice(&values);
		self.map_headers[slot] = header;
		self.invalidate_map(slot);
		info!("Map {} stored in memory location {}", path.display(), slot);
		Ok(())
	}

	/// Load a mask into `slot`. Any nonzero byte is stored as 1.
	pub fn load_mask(&mut self, path: impl AsRef<Path>, slot: usize) -> Result<MaskSummary> {
		let path = path.as_ref();
		self.masks.check(slot)?;
		let mut reader = open(path)?;
		let header = read_header(path, &mut reader)?;
		self.check_dims(&header)?;

		let voxels = self.geometry.total_voxels;
		let mut raw = vec![0u8; voxels];
		reader.read_exact(&mut raw).map_err(|e| MapError::io(path, e))?;

		let nonbinary = raw.iter().filter(|&&b| b > 1).count();
		if nonbinary > 0 {
			warn!("{} mask bytes in {} are neither 0 nor 1; stored as 1", nonbinary, path.display());
		}

		let bits = self.masks.slot_mut(slot)?;
		for (i, &b) in raw.iter().enumerate() {
			bits.set(i, b != 0);
		}
		let summary = MaskSummary {
			total: voxels,
			ones: bits.count_ones(),
		};
		self.mask_headers[slot] = Some(header);
		self.invalidate_mask(slot);

		summary.report("MASKI");
		Ok(summary)
	}

	fn check_dims(&self, header: &MapHeader) -> Result<()> {
		let found = header.dims()?;
		if !self.geometry.matches(found) {
			warn!(
				"Map sizes do not match: columns {} / {}, rows {} / {}, sections {} / {}",
				self.geometry.nx, found[0], self.geometry.ny, found[1], self.geometry.nz, found[2]
			);
			return Err(MapError::DimensionMismatch {
				expected: self.geometry.dims(),
				found,
			});
		}
		Ok(())
	}
}
