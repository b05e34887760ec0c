use std::process::Command;

/// Run `date` with the given format, falling back to "unknown".
fn date(format: &str) -> String {
	Command::new("date")
	.arg(format)
	.output()
	.ok()
	.filter(|out| out.status.success())
	.map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
	.unwrap_or_else(|| "unknown".to_string())
}

fn main() {
	println!("cargo:rustc-env=COMPILE_DATE={}", date("+%Y-%m-%d"));
	println!("cargo:rustc-env=COMPILE_TIME={}", date("+%H:%M:%S"));
}
