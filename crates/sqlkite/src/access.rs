//! Row-level access control functions.
//!
//! Four scalar functions are registered on every connection. `current_user_id()` and
//! `current_user_role()` read the first row of the connection's `sqlkite_user` temp table;
//! `assert_user_id(text)` and `assert_user_role(text)` raise [`ACCESS_DENIED_MESSAGE`] unless the
//! stored value matches their argument, ignoring ASCII case. Trigger bodies call the assertions to
//! guard writes:
//!
//! ```sql
//! create trigger products_owner before insert on products for each row
//! begin
//!     select assert_user_id(new.owner_id);
//! end
//! ```
//!
//! The functions never write to `sqlkite_user`; populating it is up to the application.

use core::ffi::{c_char, c_int};
use std::ffi::{CStr, CString};

use tracing::debug;

use crate::connection::Connection;
use crate::error::{ACCESS_DENIED_MESSAGE, Result, check_ok, db_error_message};
use crate::ffi;
use crate::statement::sqlite_transient;

/// Schema of the per-connection user context read by the access functions.
pub const CREATE_USER_CONTEXT_SQL: &str =
	"create temp table if not exists sqlkite_user (user_id text default '', role text default '')";

const USER_ID_SQL: &CStr = c"select user_id from sqlkite_user";
const ROLE_SQL: &CStr = c"select role from sqlkite_user";

type ScalarFunction = unsafe extern "C" fn(*mut ffi::Sqlite3Context, c_int, *mut *mut ffi::Sqlite3Value);

struct AccessFunction {
	name: &'static CStr,
	args: c_int,
	callback: ScalarFunction,
}

const FUNCTIONS: [AccessFunction; 4] = [
	AccessFunction { name: c"current_user_id", args: 0, callback: current_user_id },
	AccessFunction { name: c"current_user_role", args: 0, callback: current_user_role },
	AccessFunction { name: c"assert_user_id", args: 1, callback: assert_user_id },
	AccessFunction { name: c"assert_user_role", args: 1, callback: assert_user_role },
];

pub(crate) fn register(conn: &Connection) -> Result<()> {
	let db = conn.as_ptr();
	for function in &FUNCTIONS {
		let code = unsafe {
			ffi::sqlite3_create_function_v2(
				db,
				function.name.as_ptr(),
				function.args,
				c_int::from(ffi::SQLITE_UTF8),
				std::ptr::null_mut(),
				Some(function.callback),
				None,
				None,
				None,
			)
		};
		check_ok(db, code)?;
	}
	Ok(())
}

unsafe extern "C" fn current_user_id(
	context: *mut ffi::Sqlite3Context,
	_argc: c_int,
	_argv: *mut *mut ffi::Sqlite3Value,
) {
	result_context_value(context, USER_ID_SQL);
}

unsafe extern "C" fn current_user_role(
	context: *mut ffi::Sqlite3Context,
	_argc: c_int,
	_argv: *mut *mut ffi::Sqlite3Value,
) {
	result_context_value(context, ROLE_SQL);
}

unsafe extern "C" fn assert_user_id(
	context: *mut ffi::Sqlite3Context,
	argc: c_int,
	argv: *mut *mut ffi::Sqlite3Value,
) {
	unsafe { assert_context_value(context, "assert_user_id", USER_ID_SQL, argc, argv) };
}

unsafe extern "C" fn assert_user_role(
	context: *mut ffi::Sqlite3Context,
	argc: c_int,
	argv: *mut *mut ffi::Sqlite3Value,
) {
	unsafe { assert_context_value(context, "assert_user_role", ROLE_SQL, argc, argv) };
}

fn result_context_value(context: *mut ffi::Sqlite3Context, sql: &CStr) {
	match context_value(context, sql) {
		Ok(Some(value)) => unsafe {
			ffi::sqlite3_result_text64(
				context,
				value.as_ptr().cast(),
				value.len() as u64,
				Some(sqlite_transient()),
				ffi::SQLITE_UTF8,
			);
		},
		Ok(None) => unsafe { ffi::sqlite3_result_null(context) },
		Err(message) => callback_error(context, &message),
	}
}

/// # Safety
/// `argv` must point to `argc` values owned by the engine for the duration of the call.
unsafe fn assert_context_value(
	context: *mut ffi::Sqlite3Context,
	name: &str,
	sql: &CStr,
	argc: c_int,
	argv: *mut *mut ffi::Sqlite3Value,
) {
	let Some(candidate) = (unsafe { text_argument(argc, argv) }) else {
		callback_error(context, &format!("{name} requires a text argument"));
		return;
	};

	match context_value(context, sql) {
		Err(message) => callback_error(context, &message),
		// an empty value is treated as no user at all
		Ok(Some(actual)) if !actual.is_empty() && actual.eq_ignore_ascii_case(&candidate) => {}
		Ok(_) => {
			debug!(function = name, "row access denied");
			callback_error(context, ACCESS_DENIED_MESSAGE);
		}
	}
}

/// Runs `sql` against the calling connection and copies the first column of its first row.
///
/// `Ok(None)` means the context table is empty or the column is NULL.
fn context_value(
	context: *mut ffi::Sqlite3Context,
	sql: &CStr,
) -> std::result::Result<Option<Vec<u8>>, String> {
	let db = unsafe { ffi::sqlite3_context_db_handle(context) };

	let mut stmt: *mut ffi::Sqlite3Stmt = std::ptr::null_mut();
	let code = unsafe {
		ffi::sqlite3_prepare_v3(db, sql.as_ptr(), -1, 0, &raw mut stmt, std::ptr::null_mut())
	};
	if code != ffi::SQLITE_OK {
		return Err(format!("sqlkite_user.prepare - {}", db_error_message(db, code)));
	}

	let code = unsafe { ffi::sqlite3_step(stmt) };
	let value = match code {
		ffi::SQLITE_ROW => Ok(unsafe { copy_text_column(stmt) }),
		ffi::SQLITE_DONE => Ok(None),
		_ => Err(format!("sqlkite_user.step - {}", db_error_message(db, code))),
	};

	let _ = unsafe { ffi::sqlite3_finalize(stmt) };
	value
}

/// # Safety
/// `stmt` must be positioned on a row.
unsafe fn copy_text_column(stmt: *mut ffi::Sqlite3Stmt) -> Option<Vec<u8>> {
	let ptr = unsafe { ffi::sqlite3_column_text(stmt, 0) };
	if ptr.is_null() {
		return None;
	}
	let len = usize::try_from(unsafe { ffi::sqlite3_column_bytes(stmt, 0) }).unwrap_or_default();
	Some(unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec())
}

/// Copies the single text argument, or `None` when it is missing or not text.
///
/// # Safety
/// `argv` must point to `argc` values owned by the engine.
unsafe fn text_argument(argc: c_int, argv: *mut *mut ffi::Sqlite3Value) -> Option<Vec<u8>> {
	if argc < 1 || argv.is_null() {
		return None;
	}

	let value = unsafe { *argv };
	if unsafe { ffi::sqlite3_value_type(value) } != ffi::SQLITE_TEXT {
		return None;
	}

	let ptr = unsafe { ffi::sqlite3_value_text(value) };
	if ptr.is_null() {
		return Some(Vec::new());
	}
	let len = usize::try_from(unsafe { ffi::sqlite3_value_bytes(value) }).unwrap_or_default();
	Some(unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec())
}

fn callback_error(context: *mut ffi::Sqlite3Context, message: &str) {
	let fallback: *const c_char = c"access function error".as_ptr();
	match CString::new(message) {
		Ok(message) => unsafe { ffi::sqlite3_result_error(context, message.as_ptr(), -1) },
		Err(_) => unsafe { ffi::sqlite3_result_error(context, fallback, -1) },
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use crate::params;

	fn db() -> Connection {
		let db = Connection::memory().expect("open memory database");
		db.create_user_context().expect("create user context");
		db
	}

	#[test]
	fn current_user_is_null_without_context_rows() {
		let db = db();
		let (id, role): (Option<String>, Option<String>) =
			db.row("select current_user_id(), current_user_role()", &params![]).scan().expect("row");
		assert_eq!(id, None);
		assert_eq!(role, None);
	}

	#[test]
	fn current_user_reads_the_first_context_row() {
		let db = db();
		db.execute("insert into sqlkite_user (user_id, role) values ('teg', 'special')", &params![])
			.expect("insert user");
		db.execute("insert into sqlkite_user (user_id, role) values ('leto', 'other')", &params![])
			.expect("insert second user");

		let (id, role): (String, String) =
			db.row("select current_user_id(), current_user_role()", &params![]).scan().expect("row");
		assert_eq!(id, "teg");
		assert_eq!(role, "special");
	}

	#[test]
	fn defaulted_context_columns_are_empty_text() {
		let db = db();
		db.execute("insert into sqlkite_user (user_id) values ('teg')", &params![]).expect("insert user");
		let role: Option<String> =
			db.row("select current_user_role()", &params![]).get().expect("role");
		assert_eq!(role.as_deref(), Some(""));
	}

	#[test]
	fn missing_context_table_fails_the_statement() {
		let db = Connection::memory().expect("open memory database");
		let err = db.row("select current_user_id()", &params![]).get::<Option<String>>().expect_err("no table");
		assert!(err.to_string().contains("sqlkite_user.prepare - no such table: sqlkite_user"), "{err}");
	}

	#[test]
	fn assertions_compare_ignoring_ascii_case() {
		let db = db();
		db.execute("insert into sqlkite_user (user_id, role) values ('teg', 'ADMIN')", &params![])
			.expect("insert user");

		db.execute("select assert_user_id('TEG'), assert_user_role('admin')", &params![])
			.expect("matching user passes");

		let err = db.execute("select assert_user_id('leto')", &params![]).expect_err("other user");
		assert!(err.is_access_denied());
		assert_eq!(err.to_string(), "sqlite: sqlkite_row_access (code: 1)");
	}

	#[test]
	fn empty_user_id_never_matches() {
		let db = db();
		db.execute("insert into sqlkite_user (role) values ('admin')", &params![]).expect("insert role");
		let err = db.execute("select assert_user_id('')", &params![]).expect_err("empty user id");
		assert!(err.is_access_denied());
	}

	#[test]
	fn assertions_require_one_text_argument() {
		let db = db();

		let err = db.execute("select assert_user_id()", &params![]).expect_err("no arguments");
		assert!(
			err.to_string().contains("wrong number of arguments to function assert_user_id()"),
			"{err}"
		);

		let err = db.execute("select assert_user_id(32)", &params![]).expect_err("integer argument");
		assert!(err.to_string().contains("assert_user_id requires a text argument"), "{err}");
		assert!(!err.is_access_denied());

		let err = db.execute("select assert_user_role(9000.1)", &params![]).expect_err("real argument");
		assert!(matches!(err, Error::Sqlite(_)));
		assert!(err.to_string().contains("assert_user_role requires a text argument"), "{err}");
	}
}
