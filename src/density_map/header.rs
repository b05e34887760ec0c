use std::io::{self, Read, Write};

use thiserror::Error;

use crate::density_map::error::{MapError, Result};

/// Bytes of label text carried in every header.
pub const LABEL_LEN: usize = 800;
/// Number of reserved 32-bit floats following the symmetry length.
pub const RESERVED_LEN: usize = 32;
/// Reserved float that holds the rms deviation.
pub const RMS_FIELD: usize = 30;
/// Size of the fixed part of the header (before the symmetry block).
pub const FIXED_HEADER_LEN: usize = 4 * (10 + 6 + 3 + 3 + 2 + RESERVED_LEN) + LABEL_LEN;

/// Map/mask file header.
///
/// Field order and widths are fixed by the on-disk format; every number is a
/// 4-byte little-endian value. `amin`, `amax` and `amean` hold densities but
/// sit in int-sized slots, so they are stored as raw f32 bit patterns there.
#[derive(Debug, Clone, PartialEq)]
pub struct MapHeader {
	pub columns: i32,
	pub rows: i32,
	pub sections: i32,
	pub mode: i32,
	pub start: [i32; 3],
	pub cell_grid: [i32; 3],
	pub cell: [f32; 6],
	pub axis_order: [i32; 3],
	pub amin: f32,
	pub amax: f32,
	pub amean: f32,
	pub space_group: i32,
	pub reserved: [f32; RESERVED_LEN],
	pub label: Vec<u8>,
	pub symmetry: Vec<u8>,
}

/// Failure while parsing a header from a byte stream.
#[derive(Debug, Error)]
pub enum HeaderError {
	#[error(transparent)]
	Io(#[from] io::Error),

	#[error("negative symmetry record length {0}")]
	NegativeSymmetry(i32),
}

struct FieldReader<'a> {
	buf: &'a [u8],
	pos: usize,
}

impl<'a> FieldReader<'a> {
	fn new(buf: &'a [u8]) -> Self {
		Self { buf, pos: 0 }
	}

	fn word(&mut self) -> [u8; 4] {
		let mut w = [0u8; 4];
		w.copy_from_slice(&self.buf[self.pos..self.pos + 4]);
		self.pos += 4;
		w
	}

	fn i32(&mut self) -> i32 {
		i32::from_le_bytes(self.word())
	}

	fn f32(&mut self) -> f32 {
		f32::from_le_bytes(self.word())
	}

	fn bytes(&mut self, len: usize) -> &'a [u8] {
		let out = &self.buf[self.pos..self.pos + len];
		self.pos += len;
		out
	}
}

impl MapHeader {
	/// A fresh float-mode header for a grid covering exactly one unit cell.
	pub fn new(dims: [usize; 3], cell: [f32; 6]) -> Self {
		let dims_i32 = [dims[0] as i32, dims[1] as i32, dims[2] as i32];
		Self {
			columns: dims_i32[0],
			rows: dims_i32[1],
			sections: dims_i32[2],
			mode: 2,
			start: [0; 3],
			cell_grid: dims_i32,
			cell,
			axis_order: [1, 2, 3],
			amin: 0.0,
			amax: 0.0,
			amean: 0.0,
			space_group: 1,
			reserved: [0.0; RESERVED_LEN],
			label: vec![0; LABEL_LEN],
			symmetry: Vec::new(),
		}
	}

	/// Parse the fixed header plus the trailing symmetry block.
	pub fn read_from<R: Read>(reader: &mut R) -> std::result::Result<Self, HeaderError> {
		let mut buf = [0u8; FIXED_HEADER_LEN];
		reader.read_exact(&mut buf)?;
		let mut f = FieldReader::new(&buf);

		let columns = f.i32();
		let rows = f.i32();
		let sections = f.i32();
		let mode = f.i32();
		let start = [f.i32(), f.i32(), f.i32()];
		let cell_grid = [f.i32(), f.i32(), f.i32()];
		let mut cell = [0f32; 6];
		for v in cell.iter_mut() {
			*v = f.f32();
		}
		let axis_order = [f.i32(), f.i32(), f.i32()];
		let amin = f.f32();
		let amax = f.f32();
		let amean = f.f32();
		let space_group = f.i32();
		let symmetry_len = f.i32();
		let mut reserved = [0f32; RESERVED_LEN];
		for v in reserved.iter_mut() {
			*v = f.f32();
		}
		let label = f.bytes(LABEL_LEN).to_vec();

		if symmetry_len < 0 {
			return Err(HeaderError::NegativeSymmetry(symmetry_len));
		}
		// The buffer grows with the bytes actually present, not the claimed length.
		let mut symmetry = Vec::new();
		reader.by_ref().take(symmetry_len as u64).read_to_end(&mut symmetry)?;
		if symmetry.len() < symmetry_len as usize {
			return Err(io::Error::new(
				io::ErrorKind::UnexpectedEof,
				format!("symmetry record claims {} bytes, found {}", symmetry_len, symmetry.len()),
			)
			.into());
		}

		Ok(Self {
			columns,
			rows,
			sections,
			mode,
			start,
			cell_grid,
			cell,
			axis_order,
			amin,
			amax,
			amean,
			space_group,
			reserved,
			label,
			symmetry,
		})
	}

	/// Serialize the header in the same field order it was read.
	pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
		let mut buf: Vec<u8> = Vec::with_capacity(FIXED_HEADER_LEN + self.symmetry.len());
		let put_i32 = |buf: &mut Vec<u8>, v: i32| buf.extend_from_slice(&v.to_le_bytes());

		put_i32(&mut buf, self.columns);
		put_i32(&mut buf, self.rows);
		put_i32(&mut buf, self.sections);
		put_i32(&mut buf, self.mode);
		for &v in &self.start {
			put_i32(&mut buf, v);
		}
		for &v in &self.cell_grid {
			put_i32(&mut buf, v);
		}
		for &v in &self.cell {
			buf.extend_from_slice(&v.to_le_bytes());
		}
		for &v in &self.axis_order {
			put_i32(&mut buf, v);
		}
		for v in [self.amin, self.amax, self.amean] {
			buf.extend_from_slice(&v.to_le_bytes());
		}
		put_i32(&mut buf, self.space_group);
		put_i32(&mut buf, self.symmetry.len() as i32);
		for &v in &self.reserved {
			buf.extend_from_slice(&v.to_le_bytes());
		}

		// Label block is always exactly LABEL_LEN bytes on disk.
		let mut label = self.label.clone();
		label.resize(LABEL_LEN, 0);
		buf.extend_from_slice(&label);
		buf.extend_from_slice(&self.symmetry);

		writer.write_all(&buf)
	}

	/// Grid extent (columns, rows, sections), rejecting non-positive counts.
	pub fn dims(&self) -> Result<[usize; 3]> {
		let dims = [self.columns, self.rows, self.sections];
		if dims.iter().any(|&d| d <= 0) {
			return Err(MapError::InvalidHeader(format!(
				"grid extent {:?} must be positive",
				dims
			)));
		}
		Ok([dims[0] as usize, dims[1] as usize, dims[2] as usize])
	}

	pub fn rms(&self) -> f32 {
		self.reserved[RMS_FIELD]
	}

	pub fn set_rms(&mut self, rms: f32) {
		self.reserved[RMS_FIELD] = rms;
	}

	/// Label text up to the last printable alphanumeric character.
	pub fn label_text(&self) -> String {
		let end = self
			.label
			.iter()
			.rposition(|b| b.is_ascii_alphanumeric())
			.map(|i| i + 1)
			.unwrap_or(0);
		String::from_utf8_lossy(&self.label[..end]).into_owned()
	}

	pub fn set_label(&mut self, text: &str) {
		let mut label = text.as_bytes().to_vec();
		label.resize(LABEL_LEN, 0);
		self.label = label;
	}

	pub fn symmetry_text(&self) -> String {
		String::from_utf8_lossy(&self.symmetry).trim_end().to_string()
	}

	/// Human-readable header summary, one line per field group.
	pub fn summary(&self) -> Vec<String> {
		vec![
			format!("Map label:          {}", self.label_text()),
			format!("Mode:               {}", self.mode),
			format!("Columns (X grid):   {}", self.columns),
			format!("Rows (Y grid):      {}", self.rows),
			format!("Sections (Z grid):  {}", self.sections),
			format!("First column/row/section: {} {} {}", self.start[0], self.start[1], self.start[2]),
			format!("Axis order:         {} {} {}", self.axis_order[0], self.axis_order[1], self.axis_order[2]),
			format!("Space group number: {}", self.space_group),
			format!(
				"Unit cell:          {:.4} {:.4} {:.4}  {:.4} {:.4} {:.4}",
				self.cell[0], self.cell[1], self.cell[2], self.cell[3], self.cell[4], self.cell[5]
			),
			format!("Cell grid:          {} {} {}", self.cell_grid[0], self.cell_grid[1], self.cell_grid[2]),
			format!("Density minimum:    {:.4}", self.amin),
			format!("Density maximum:    {:.4}", self.amax),
			format!("Density average:    {:.4}", self.amean),
			format!("RMS deviation:      {:.4}", self.rms()),
		]
	}
}
