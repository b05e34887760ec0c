use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::density_map::zone::{Zone, ZoneMode};

/// Which of the two slot stores an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
	Map,
	Mask,
}

impl fmt::Display for SlotKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SlotKind::Map => write!(f, "map"),
			SlotKind::Mask => write!(f, "mask"),
		}
	}
}

#[derive(Debug, Error)]
pub enum MapError {
	#[error("I/O on '{}' failed: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("grid {found:?} does not match the reference grid {expected:?}")]
	DimensionMismatch {
		expected: [usize; 3],
		found: [usize; 3],
	},

	#[error("cannot allocate {slots} {kind} slots of {voxels} voxels each")]
	Allocation {
		kind: SlotKind,
		slots: usize,
		voxels: usize,
	},

	#[error("{zone} selects no voxels of map slot {slot}; statistics are undefined")]
	DegenerateZone { slot: usize, zone: Zone },

	#[error("{kind} slot {slot} is outside the store capacity of {capacity}")]
	SlotOutOfRange {
		kind: SlotKind,
		slot: usize,
		capacity: usize,
	},

	#[error("voxel ({}, {}, {}) lies outside the {dims:?} grid", coords[0], coords[1], coords[2])]
	CoordinateOutOfRange { coords: [usize; 3], dims: [usize; 3] },

	#[error("voxel index {index} is outside the {voxels} voxels of a {kind} slot")]
	VoxelOutOfRange {
		kind: SlotKind,
		index: usize,
		voxels: usize,
	},

	#[error("{kind} slot {slot} is used for two roles that must be distinct")]
	SlotConflict { kind: SlotKind, slot: usize },

	#[error("zone '{0}' needs a mask slot")]
	MissingMask(ZoneMode),

	#[error("invalid map header: {0}")]
	InvalidHeader(String),

	#[error("radius must be at least 1, got {0}")]
	InvalidRadius(usize),

	#[error("mean density of map slot {slot} is zero in {zone}; no scale factor exists")]
	ZeroMean { slot: usize, zone: Zone },
}

impl MapError {
	pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
		Self::Io {
			path: path.into(),
			source,
		}
	}
}

pub type Result<T> = std::result::Result<T, MapError>;
