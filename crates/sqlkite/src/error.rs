use core::ffi::c_int;
use std::ffi::CStr;

use thiserror::Error;

use crate::ffi;
use crate::value::{ColumnType, Value};

/// Message raised by the `assert_user_*` functions when the current user does not match.
pub const ACCESS_DENIED_MESSAGE: &str = "sqlkite_row_access";

// "UNIQUE constraint failed: "
const UNIQUE_MESSAGE_PREFIX_LEN: usize = 26;

/// A result code and message reported by the engine.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("sqlite: {message} (code: {code})")]
pub struct SqliteError {
	pub code: c_int,
	pub message: String,
}

impl SqliteError {
	pub(crate) fn misuse(message: impl Into<String>) -> Self {
		Self { code: ffi::SQLITE_MISUSE, message: message.into() }
	}

	/// The primary result code, with any extended bits masked off.
	#[must_use]
	pub const fn primary_code(&self) -> c_int {
		self.code & 0xff
	}
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ScanFailure {
	#[error("null into non-nullable {target}")]
	NullIntoNonNullable { target: &'static str },

	#[error("{found} value out of range for {target}")]
	OutOfRange { target: &'static str, found: ColumnType },

	#[error("cannot scan {found} into {target}")]
	TypeMismatch { target: &'static str, found: ColumnType },

	#[error("text is not valid UTF-8")]
	InvalidUtf8,

	#[error("column index out of range (columns: {count})")]
	ColumnOutOfRange { count: usize },

	#[error("statement is not positioned on a row")]
	NoCurrentRow,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
	/// The database does not exist and the connection was not allowed to create it.
	#[error("database not found: {path}")]
	NotFound { path: String },

	#[error(transparent)]
	Sqlite(#[from] SqliteError),

	#[error("{source} - {sql}")]
	Prepare { source: SqliteError, sql: String, args: Vec<Value> },

	#[error("{source} (bind index: {index})")]
	Bind { index: usize, source: SqliteError },

	#[error("sqlite: {reason} (index: {index}) (code: {code})", code = ffi::SQLITE_MISUSE)]
	Scan { index: usize, reason: ScanFailure },

	#[error("sqlite: {0} (code: {code})", code = ffi::SQLITE_MISUSE)]
	Misuse(String),

	#[error("no rows in result set")]
	NoRows,

	/// A row-level access check raised by `assert_user_id` or `assert_user_role` aborted the statement.
	#[error(transparent)]
	AccessDenied(SqliteError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	/// The engine result code carried by this error, if any.
	#[must_use]
	pub const fn code(&self) -> Option<c_int> {
		match self {
			Self::NotFound { .. } => Some(ffi::SQLITE_CANTOPEN),
			Self::Sqlite(source)
			| Self::AccessDenied(source)
			| Self::Prepare { source, .. }
			| Self::Bind { source, .. } => Some(source.code),
			Self::Scan { .. } | Self::Misuse(_) => Some(ffi::SQLITE_MISUSE),
			Self::NoRows => None,
		}
	}

	#[must_use]
	pub const fn engine_error(&self) -> Option<&SqliteError> {
		match self {
			Self::Sqlite(source)
			| Self::AccessDenied(source)
			| Self::Prepare { source, .. }
			| Self::Bind { source, .. } => Some(source),
			_ => None,
		}
	}

	#[must_use]
	pub fn is_unique_violation(&self) -> bool {
		self.engine_error().is_some_and(|source| source.code == ffi::SQLITE_CONSTRAINT_UNIQUE)
	}

	/// The `table.column` named by a unique constraint violation.
	///
	/// Relies on the engine's fixed `UNIQUE constraint failed: ` message prefix.
	#[must_use]
	pub fn unique_constraint_name(&self) -> Option<&str> {
		let source = self.engine_error()?;
		if source.code != ffi::SQLITE_CONSTRAINT_UNIQUE {
			return None;
		}
		source.message.get(UNIQUE_MESSAGE_PREFIX_LEN..).filter(|name| !name.is_empty())
	}

	#[must_use]
	pub const fn is_access_denied(&self) -> bool {
		matches!(self, Self::AccessDenied(_))
	}

	#[must_use]
	pub const fn is_busy(&self) -> bool {
		match self.engine_error() {
			Some(source) => {
				let code = source.primary_code();
				code == ffi::SQLITE_BUSY || code == ffi::SQLITE_LOCKED
			}
			None => false,
		}
	}
}

/// Builds an error from the connection's most recent failure.
pub(crate) fn sqlite_error(db: *mut ffi::Sqlite3, code: c_int) -> Error {
	classify(SqliteError { code, message: db_error_message(db, code) })
}

pub(crate) fn engine_error(db: *mut ffi::Sqlite3, code: c_int) -> SqliteError {
	SqliteError { code, message: db_error_message(db, code) }
}

pub(crate) fn check_ok(db: *mut ffi::Sqlite3, code: c_int) -> Result<()> {
	if code == ffi::SQLITE_OK { Ok(()) } else { Err(sqlite_error(db, code)) }
}

fn classify(source: SqliteError) -> Error {
	if source.message == ACCESS_DENIED_MESSAGE {
		Error::AccessDenied(source)
	} else {
		Error::Sqlite(source)
	}
}

pub(crate) fn db_error_message(db: *mut ffi::Sqlite3, code: c_int) -> String {
	if db.is_null() {
		return sqlkite_sqlite_ffi::sqlite_errstr(code);
	}

	let message_ptr = unsafe { ffi::sqlite3_errmsg(db) };
	if message_ptr.is_null() {
		return sqlkite_sqlite_ffi::sqlite_errstr(code);
	}

	unsafe { CStr::from_ptr(message_ptr).to_string_lossy().into_owned() }
}
