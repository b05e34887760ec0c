use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::density_map::error::{MapError, Result};

/// Where an operation applies relative to a mask.
///
/// This is the only place user-facing keywords are mapped onto voxel
/// selection: `IN` keeps voxels whose mask bit is 1, `OUT` keeps voxels whose
/// mask bit is 0, `TOTAL` keeps every voxel and never reads a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneMode {
	Inside,
	Outside,
	Total,
}

impl fmt::Display for ZoneMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ZoneMode::Inside => write!(f, "in"),
			ZoneMode::Outside => write!(f, "out"),
			ZoneMode::Total => write!(f, "total"),
		}
	}
}

#[derive(Debug, Clone, Error)]
#[error("unknown zone '{0}', expected IN, OUT or TOTAL")]
pub struct ParseZoneError(String);

impl FromStr for ZoneMode {
	type Err = ParseZoneError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.trim().to_ascii_uppercase().as_str() {
			"IN" | "INSIDE" => Ok(ZoneMode::Inside),
			"OUT" | "OUTSIDE" => Ok(ZoneMode::Outside),
			"TOTAL" | "ALL" => Ok(ZoneMode::Total),
			_ => Err(ParseZoneError(s.to_string())),
		}
	}
}

/// A voxel selector: inside or outside a given mask slot, or the whole map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
	Inside(usize),
	Outside(usize),
	Total,
}

impl Zone {
	/// Build a zone from a mode and an optional mask slot. `Total` ignores the mask.
	pub fn new(mode: ZoneMode, mask: Option<usize>) -> Result<Self> {
		match (mode, mask) {
			(ZoneMode::Total, _) => Ok(Zone::Total),
			(ZoneMode::Inside, Some(m)) => Ok(Zone::Inside(m)),
			(ZoneMode::Outside, Some(m)) => Ok(Zone::Outside(m)),
			(mode, None) => Err(MapError::MissingMask(mode)),
		}
	}

	pub fn mode(&self) -> ZoneMode {
		match self {
			Zone::Inside(_) => ZoneMode::Inside,
			Zone::Outside(_) => ZoneMode::Outside,
			Zone::Total => ZoneMode::Total,
		}
	}

	pub fn mask(&self) -> Option<usize> {
		match self {
			Zone::Inside(m) | Zone::Outside(m) => Some(*m),
			Zone::Total => None,
		}
	}

	/// Mask bit value that a selected voxel must carry, `None` for `Total`.
	pub fn required_bit(&self) -> Option<bool> {
		match self {
			Zone::Inside(_) => Some(true),
			Zone::Outside(_) => Some(false),
			Zone::Total => None,
		}
	}
}

impl fmt::Display for Zone {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Zone::Inside(m) => write!(f, "inside mask {}", m),
			Zone::Outside(m) => write!(f, "outside mask {}", m),
			Zone::Total => write!(f, "the total map"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keywords_map_to_modes() {
		assert_eq!("in".parse::<ZoneMode>().unwrap(), ZoneMode::Inside);
		assert_eq!("OUT".parse::<ZoneMode>().unwrap(), ZoneMode::Outside);
		assert_eq!(" Total ".parse::<ZoneMode>().unwrap(), ZoneMode::Total);
		assert!("sideways".parse::<ZoneMode>().is_err());
	}

	#[test]
	fn total_never_carries_a_mask() {
		assert_eq!(Zone::new(ZoneMode::Total, Some(4)).unwrap(), Zone::Total);
		assert_eq!(Zone::Total.mask(), None);
		assert_eq!(Zone::Total.required_bit(), None);
	}

	#[test]
	fn inside_and_outside_need_a_mask() {
		assert!(matches!(
			Zone::new(ZoneMode::Inside, None),
			Err(MapError::MissingMask(ZoneMode::Inside))
		));
		let z = Zone::new(ZoneMode::Outside, Some(2)).unwrap();
		assert_eq!(z, Zone::Outside(2));
		assert_eq!(z.required_bit(), Some(false));
		assert_eq!(Zone::Inside(0).required_bit(), Some(true));
	}
}
