use std::ffi::CStr;

#[cfg(feature = "bundled-sqlite")]
use libsqlite3_sys as _;

pub mod ffi;

pub fn sqlite_lib_version_number() -> i32 {
	unsafe { ffi::sqlite3_libversion_number() }
}

pub fn sqlite_lib_version() -> String {
	unsafe { CStr::from_ptr(ffi::sqlite3_libversion()).to_string_lossy().into_owned() }
}

pub fn sqlite_source_id() -> String {
	unsafe { CStr::from_ptr(ffi::sqlite3_sourceid()).to_string_lossy().into_owned() }
}

/// The engine's static description of a result code, e.g. `"database is locked"`.
pub fn sqlite_errstr(code: i32) -> String {
	let ptr = unsafe { ffi::sqlite3_errstr(code) };
	if ptr.is_null() {
		return "unknown error".to_string();
	}
	unsafe { CStr::from_ptr(ptr).to_string_lossy().into_owned() }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn has_sqlite_version_number() {
		assert!(sqlite_lib_version_number() >= 3_037_000);
	}

	#[test]
	fn has_sqlite_version_text() {
		assert!(!sqlite_lib_version().is_empty());
		assert!(!sqlite_source_id().is_empty());
	}

	#[test]
	fn describes_result_codes() {
		assert_eq!(sqlite_errstr(ffi::SQLITE_BUSY), "database is locked");
		assert_eq!(sqlite_errstr(ffi::SQLITE_OK), "not an error");
	}

	#[test]
	fn extended_unique_code_matches_engine() {
		assert_eq!(ffi::SQLITE_CONSTRAINT_UNIQUE, 2067);
	}
}
