use std::env;

fn main() {
	println!("cargo:rerun-if-env-changed=SQLITE3_LIB_DIR");

	// the bundled amalgamation is compiled and linked by libsqlite3-sys
	if env::var_os("CARGO_FEATURE_BUNDLED_SQLITE").is_some() {
		return;
	}

	link_system();
}

fn link_system() {
	if let Some(dir) = env::var_os("SQLITE3_LIB_DIR") {
		println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
		println!("cargo:rustc-link-lib=dylib=sqlite3");
		return;
	}

	let linked = pkg_config::Config::new()
		.atleast_version("3.37.0")
		.print_system_libs(false)
		.probe("sqlite3")
		.is_ok();

	if !linked {
		println!("cargo:rustc-link-lib=dylib=sqlite3");
	}
}
