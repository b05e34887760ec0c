use log::LevelFilter;

/// Level chosen by the `-v`/`-q` flags.
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
	if quiet {
		LevelFilter::Error
	} else {
		match verbosity {
			0 => LevelFilter::Info,
			1 => LevelFilter::Debug,
			_ => LevelFilter::Trace,
		}
	}
}

/// Install `env_logger` on stderr. `RUST_LOG`, when set, overrides the flags.
pub fn setup_logging(verbosity: u8, quiet: bool) {
	let level = level_for(verbosity, quiet);
	let filter = format!("rsrf={}", level.as_str().to_ascii_lowercase());

	if std::env::var("RUST_LOG").is_err() {
		env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&filter))
			.format_target(false)
			.format_timestamp(None)
			.init();
	} else {
		env_logger::init();
	}
}
