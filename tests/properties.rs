use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rsrf::density_map::header::MapHeader;
use rsrf::density_map::shape::ShapeParams;
use rsrf::{StoreConfig, Workspace, Zone};
use tempfile::{TempDir, tempdir};

/// Write a float map of `dims` with values from `fill(x, y, z)`.
fn map_file(dir: &TempDir, name: &str, dims: [usize; 3], cell: [f32; 6], fill: impl Fn(usize, usize, usize) -> f32) -> PathBuf {
	let path = dir.path().join(name);
	let mut file = File::create(&path).unwrap();
	MapHeader::new(dims, cell).write_to(&mut file).unwrap();
	for z in 0..dims[2] {
		for y in 0..dims[1] {
			for x in 0..dims[0] {
				file.write_all(&fill(x, y, z).to_le_bytes()).unwrap();
			}
		}
	}
	path
}

fn mask_file(path: &Path, dims: [usize; 3], bit: impl Fn(usize) -> bool) {
	let mut file = File::create(path).unwrap();
	MapHeader::new(dims, [1.0, 1.0, 1.0, 90.0, 90.0, 90.0]).write_to(&mut file).unwrap();
	let total = dims[0] * dims[1] * dims[2];
	let bytes: Vec<u8> = (0..total).map(|v| bit(v) as u8).collect();
	file.write_all(&bytes).unwrap();
}

const CUBIC: [f32; 6] = [6.0, 6.0, 6.0, 90.0, 90.0, 90.0];

#[test]
fn inside_and_outside_counts_cover_the_grid() {
	let dir = tempdir().unwrap();
	let reference = map_file(&dir, "ref.map", [6, 6, 6], CUBIC, |x, y, z| (x * y + z) as f32);
	let mask = dir.path().join("k.msk");
	mask_file(&mask, [6, 6, 6], |v| v % 3 == 0 || v % 7 == 1);

	let mut ws = Workspace::load_reference(&reference, StoreConfig::default()).unwrap();
	ws.load_mask(&mask, 0).unwrap();
	let inside = ws.find_parms(0, Zone::Inside(0)).unwrap().count;
	let outside = ws.find_parms(0, Zone::Outside(0)).unwrap().count;
	assert_eq!(inside + outside, 216);

	let sum_in = ws.find_parms(0, Zone::Inside(0)).unwrap().sum;
	let sum_out = ws.find_parms(0, Zone::Outside(0)).unwrap().sum;
	let sum_all = ws.find_parms(0, Zone::Total).unwrap().sum;
	assert!((sum_in + sum_out - sum_all).abs() < 1e-9);
}

#[test]
fn mask_algebra_on_loaded_masks() {
	let dir = tempdir().unwrap();
	let reference = map_file(&dir, "ref.map", [4, 5, 3], [4.0, 5.0, 3.0, 90.0, 90.0, 90.0], |_, _, _| 0.0);
	let k2 = dir.path().join("k2.msk");
	let k3 = dir.path().join("k3.msk");
	mask_file(&k2, [4, 5, 3], |v| v % 2 == 0);
	mask_file(&k3, [4, 5, 3], |v| v % 5 < 2);

	let config = StoreConfig { map_slots: 1, mask_slots: 3 };
	let mut ws = Workspace::load_reference(&reference, config).unwrap();
	ws.load_mask(&k2, 0).unwrap();
	ws.load_mask(&k3, 1).unwrap();

	ws.max_mask(2, 0, 1).unwrap();
	for v in 0..60 {
		assert_eq!(ws.mask(2).unwrap()[v], v % 2 == 0 || v % 5 < 2);
	}
	ws.min_mask(2, 0, 1).unwrap();
	for v in 0..60 {
		assert_eq!(!ws.mask(2).unwrap()[v], v % 2 != 0 || v % 5 >= 2);
	}
	ws.flip(2, 1).unwrap();
	for v in 0..60 {
		assert_eq!(ws.mask(2).unwrap()[v], v % 5 >= 2);
	}
}

#[test]
fn scaling_matches_zone_means() {
	let dir = tempdir().unwrap();
	let dims = [5, 4, 6];
	let cell = [5.0, 4.0, 6.0, 90.0, 90.0, 90.0];
	let reference = map_file(&dir, "m1.map", dims, cell, |x, y, z| 1.0 + (x + 2 * y + 3 * z) as f32);
	let target = map_file(&dir, "m2.map", dims, cell, |x, y, z| 0.5 * ((x * z) % 4) as f32 + y as f32);
	let mask = dir.path().join("zone.msk");
	mask_file(&mask, dims, |v| v > 30 && v < 90);

	let mut ws = Workspace::load_reference(&reference, StoreConfig::default()).unwrap();
	ws.load_map(&target, 1).unwrap();
	ws.load_mask(&mask, 0).unwrap();

	for zone in [Zone::Inside(0), Zone::Outside(0), Zone::Total] {
		ws.scale_to(0, 1, zone).unwrap();
		let m1 = ws.mean(0, zone).unwrap();
		let m2 = ws.mean(1, zone).unwrap();
		assert!((m1 - m2).abs() < 1e-4 * m2.abs(), "{}: {} vs {}", zone, m1, m2);
	}
}

#[test]
fn smoothing_a_constant_field_keeps_it_constant() {
	let dir = tempdir().unwrap();
	let reference = map_file(&dir, "flat.map", [7, 5, 4], [7.0, 5.0, 4.0, 90.0, 90.0, 90.0], |_, _, _| -2.5);
	let mut ws = Workspace::load_reference(&reference, StoreConfig::default()).unwrap();
	for radius in 1..=6 {
		ws.smear(0, 1, 2, radius).unwrap();
		assert!(ws.map(1).unwrap().iter().all(|&v| (v + 2.5).abs() < 1e-4));
	}
}

#[test]
fn all_ones_cube_statistics() {
	let dir = tempdir().unwrap();
	let reference = map_file(&dir, "ones.map", [4, 4, 4], [4.0, 4.0, 4.0, 90.0, 90.0, 90.0], |_, _, _| 1.0);
	let mut ws = Workspace::load_reference(&reference, StoreConfig::default()).unwrap();

	let parms = ws.find_parms(0, Zone::Total).unwrap();
	assert_eq!(parms.max, 1.0);
	assert_eq!(parms.min, 1.0);
	assert_eq!(parms.mean, 1.0);
	assert_eq!(parms.count, 64);
	let (variance, rms) = ws.find_rms(0, Zone::Total).unwrap();
	assert_eq!(variance, 0.0);
	assert_eq!(rms, 0.0);
}

#[test]
fn single_seed_grows_toward_its_lower_neighbour() {
	let dir = tempdir().unwrap();
	let dims = [5, 5, 5];
	let reference = map_file(&dir, "shape.map", dims, [5.0, 5.0, 5.0, 90.0, 90.0, 90.0], |x, y, z| match (x, y, z) {
		(2, 2, 2) => 5.0,
		(1, 2, 2) => 1.0,
		_ => 10.0,
	});
	let seed = dir.path().join("seed.msk");
	mask_file(&seed, dims, |v| v == 2 + 2 * 5 + 2 * 25);

	let out = dir.path().join("grown.msk");
	let config = StoreConfig { map_slots: 1, mask_slots: 3 };
	let mut ws = Workspace::load_reference(&reference, config).unwrap();
	ws.load_mask(&seed, 0).unwrap();
	let params = ShapeParams {
		min_dif: 0.0,
		cycles: 1,
		min_connect: 1,
	};
	let report = ws.shape_fit(0, 1, 2, 0, params).unwrap();
	assert_eq!(report.total_grown, 1);
	assert_eq!(report.total_constrictions, 0);

	let summary = ws.write_mask(&out, 1).unwrap();
	assert_eq!(summary.ones, 2);
	assert!(ws.mask_voxel(1, 2, 2, 2).unwrap());
	assert!(ws.mask_voxel(1, 1, 2, 2).unwrap());
}

#[test]
fn integration_matches_reference_volume() {
	let dir = tempdir().unwrap();
	let reference = map_file(&dir, "unit.map", [10, 10, 10], [10.0, 10.0, 10.0, 90.0, 90.0, 90.0], |_, _, _| 1.0);
	let ws = Workspace::load_reference(&reference, StoreConfig::default()).unwrap();
	let value = ws.integrate([5.0, 5.0, 5.0], 1.5, 0).unwrap();
	// centre, 6 faces and 12 edges lie within 1.5 grid points
	assert!((value - 19.0).abs() < 1e-9);
}
