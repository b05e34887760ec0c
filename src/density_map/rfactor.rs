use std::fmt;
use std::str::FromStr;

use log::info;
use thiserror::Error;

use crate::density_map::error::{MapError, Result};
use crate::density_map::workspace::Workspace;
use crate::density_map::zone::Zone;

/// Denominator applied to the mean absolute difference of two maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RFactorNorm {
	/// Mean absolute difference, unnormalised.
	#[default]
	Difference,
	Mean1,
	Mean2,
	MeanBoth,
	Rms1,
	Rms2,
	RmsBoth,
}

impl RFactorNorm {
	pub const ALL: [RFactorNorm; 7] = [
		RFactorNorm::Difference,
		RFactorNorm::Mean1,
		RFactorNorm::Mean2,
		RFactorNorm::MeanBoth,
		RFactorNorm::Rms1,
		RFactorNorm::Rms2,
		RFactorNorm::RmsBoth,
	];

	/// Legacy numeric selector, 0 through 6.
	pub fn from_code(code: u32) -> Option<Self> {
		Self::ALL.get(code as usize).copied()
	}
}

impl fmt::Display for RFactorNorm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			RFactorNorm::Difference => "diff",
			RFactorNorm::Mean1 => "mean1",
			RFactorNorm::Mean2 => "mean2",
			RFactorNorm::MeanBoth => "mean",
			RFactorNorm::Rms1 => "rms1",
			RFactorNorm::Rms2 => "rms2",
			RFactorNorm::RmsBoth => "rms",
		};
		write!(f, "{}", s)
	}
}

#[derive(Debug, Clone, Error)]
#[error("unknown R-factor normalisation '{0}'")]
pub struct ParseNormError(String);

impl FromStr for RFactorNorm {
	type Err = ParseNormError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		let key = s.trim().to_ascii_lowercase();
		if let Ok(code) = key.parse::<u32>() {
			return Self::from_code(code).ok_or_else(|| ParseNormError(s.to_string()));
		}
		Self::ALL
			.into_iter()
			.find(|n| n.to_string() == key)
			.ok_or_else(|| ParseNormError(s.to_string()))
	}
}

/// Absolute-difference agreement between two maps over one zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RFactor {
	pub count: usize,
	pub abs_diff_sum: f64,
	pub mean1: f64,
	pub mean2: f64,
	pub rms1: f64,
	pub rms2: f64,
}

impl RFactor {
	/// Mean absolute difference divided by the chosen denominator.
	pub fn value(&self, norm: RFactorNorm) -> f64 {
		let diff = self.abs_diff_sum / self.count as f64;
		match norm {
			RFactorNorm::Difference => diff,
			RFactorNorm::Mean1 => diff / self.mean1,
			RFactorNorm::Mean2 => diff / self.mean2,
			RFactorNorm::MeanBoth => diff / ((self.mean1 + self.mean2) / 2.0),
			RFactorNorm::Rms1 => diff / self.rms1,
			RFactorNorm::Rms2 => diff / self.rms2,
			RFactorNorm::RmsBoth => diff / ((self.rms1 + self.rms2) / 2.0),
		}
	}

	pub fn report(&self) {
		info!("Number of points used     = {}", self.count);
		info!("Sum of |map1 - map2|      = {:.6}", self.abs_diff_sum);
		for norm in RFactorNorm::ALL {
			info!("R-factor ({:>5})          = {:.6}", norm, self.value(norm));
		}
	}
}

impl Workspace {
	/// Multiply all of map `slot1` so that its mean over `zone` equals that of `slot2`.
	///
	/// Returns the applied factor.
	pub fn scale_to(&mut self, slot1: usize, slot2: usize, zone: Zone) -> Result<f64> {
		let mean1 = self.mean(slot1, zone)?;
		let mean2 = self.mean(slot2, zone)?;
		if mean1 == 0.0 {
			return Err(MapError::ZeroMean { slot: slot1, zone });
		}
		let factor = mean2 / mean1;
		info!("Scale factor = {:.6} (mean {:.6} -> {:.6})", factor, mean1, mean2);
		self.scale(slot1, Zone::Total, factor as f32)?;
		Ok(factor)
	}

	/// Compare `slot1` against `slot2` over `zone`.
	pub fn r_factor(&mut self, slot1: usize, slot2: usize, zone: Zone) -> Result<RFactor> {
		let s1 = self.statistics(slot1, zone)?;
		let s2 = self.statistics(slot2, zone)?;

		let filter = self.masks.filter(zone)?;
		let m1 = self.maps.slot(slot1)?;
		let m2 = self.maps.slot(slot2)?;
		let abs_diff_sum: f64 = m1
			.iter()
			.zip(m2)
			.enumerate()
			.filter(|(v, _)| filter.contains(*v))
			.map(|(_, (a, b))| (*a as f64 - *b as f64).abs())
			.sum();

		Ok(RFactor {
			count: s1.count,
			abs_diff_sum,
			mean1: s1.mean,
			mean2: s2.mean,
			rms1: s1.rms,
			rms2: s2.rms,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::density_map::header::MapHeader;
	use crate::density_map::workspace::StoreConfig;

	fn workspace() -> Workspace {
		let header = MapHeader::new([4, 4, 2], [4.0, 4.0, 2.0, 90.0, 90.0, 90.0]);
		Workspace::new(header, StoreConfig { map_slots: 2, mask_slots: 1 }).unwrap()
	}

	#[test]
	fn norm_keywords_and_codes() {
		assert_eq!("0".parse::<RFactorNorm>().unwrap(), RFactorNorm::Difference);
		assert_eq!("6".parse::<RFactorNorm>().unwrap(), RFactorNorm::RmsBoth);
		assert_eq!("Mean2".parse::<RFactorNorm>().unwrap(), RFactorNorm::Mean2);
		assert!("7".parse::<RFactorNorm>().is_err());
		assert!("median".parse::<RFactorNorm>().is_err());
	}

	#[test]
	fn scale_to_matches_means_in_zone() {
		let mut ws = workspace();
		for (i, v) in ws.map_mut(0).unwrap().iter_mut().enumerate() {
			*v = 1.0 + i as f32;
		}
		for (i, v) in ws.map_mut(1).unwrap().iter_mut().enumerate() {
			*v = 3.0 * (i % 5) as f32;
		}
		for i in 0..10 {
			ws.mask_mut(0).unwrap().set(i, true);
		}
		let zone = Zone::Inside(0);
		ws.scale_to(0, 1, zone).unwrap();
		let m1 = ws.mean(0, zone).unwrap();
		let m2 = ws.mean(1, zone).unwrap();
		assert!((m1 - m2).abs() < 1e-5 * m2.abs().max(1.0));
	}

	#[test]
	fn scale_to_zero_mean_is_rejected() {
		let mut ws = workspace();
		ws.map_mut(1).unwrap().fill(1.0);
		assert!(matches!(ws.scale_to(0, 1, Zone::Total), Err(MapError::ZeroMean { slot: 0, .. })));
	}

	#[test]
	fn r_factor_of_offset_maps() {
		let mut ws = workspace();
		ws.map_mut(0).unwrap().fill(2.0);
		ws.map_mut(1).unwrap().fill(4.0);
		let r = ws.r_factor(0, 1, Zone::Total).unwrap();
		assert_eq!(r.count, 32);
		assert_eq!(r.value(RFactorNorm::Difference), 2.0);
		assert_eq!(r.value(RFactorNorm::Mean1), 1.0);
		assert_eq!(r.value(RFactorNorm::Mean2), 0.5);
		assert!((r.value(RFactorNorm::MeanBoth) - 2.0 / 3.0).abs() < 1e-12);
	}
}
