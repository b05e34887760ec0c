pub mod density_map {
	pub mod info;
	pub mod error;
	pub mod zone;
	pub mod geometry;
	pub mod header;
	pub mod store;
	pub mod workspace;
	pub mod mrc_input;
	pub mod mrc_output;
	pub mod manip;
	pub mod stats;
	pub mod rfactor;
	pub mod smear;
	pub mod rough;
	pub mod shape;
	pub mod transform;
	pub mod integrate;
	pub mod utils;
}

pub use density_map::error::{MapError, Result};
pub use density_map::workspace::{StoreConfig, Workspace};
pub use density_map::zone::{Zone, ZoneMode};
