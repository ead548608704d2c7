use core::ffi::c_int;
use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::ptr::NonNull;
use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::access;
use crate::cursor::{Row, Rows};
use crate::error::{Error, Result, check_ok, engine_error};
use crate::ffi;
use crate::statement::Statement;
use crate::value::BindValue;

static BOOTSTRAP: OnceLock<c_int> = OnceLock::new();

const DB_CONFIG: [(c_int, c_int); 4] = [
	(ffi::SQLITE_DBCONFIG_DEFENSIVE, 1),
	(ffi::SQLITE_DBCONFIG_DQS_DML, 0),
	(ffi::SQLITE_DBCONFIG_DQS_DDL, 0),
	(ffi::SQLITE_DBCONFIG_ENABLE_LOAD_EXTENSION, 0),
];

const LIMITS: [(c_int, c_int); 11] = [
	(ffi::SQLITE_LIMIT_LENGTH, 1_000_000),
	(ffi::SQLITE_LIMIT_SQL_LENGTH, 5000),
	(ffi::SQLITE_LIMIT_COLUMN, 200),
	(ffi::SQLITE_LIMIT_EXPR_DEPTH, 50),
	(ffi::SQLITE_LIMIT_COMPOUND_SELECT, 10),
	(ffi::SQLITE_LIMIT_VDBE_OP, 25000),
	(ffi::SQLITE_LIMIT_FUNCTION_ARG, 16),
	(ffi::SQLITE_LIMIT_ATTACHED, 0),
	(ffi::SQLITE_LIMIT_LIKE_PATTERN_LENGTH, 100),
	(ffi::SQLITE_LIMIT_VARIABLE_NUMBER, 200),
	(ffi::SQLITE_LIMIT_TRIGGER_DEPTH, 10),
];

/// Settings applied when a connection is opened.
///
/// ```
/// let options: sqlkite::OpenOptions =
/// 	serde_json::from_str(r#"{"create_if_missing": true, "busy_timeout_ms": 250}"#).unwrap();
/// assert!(options.create_if_missing);
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct OpenOptions {
	/// Create the database when it does not exist. When false, a missing database is
	/// reported as [`Error::NotFound`].
	pub create_if_missing: bool,
	/// How long a blocked write waits for its lock, in milliseconds. Zero disables waiting.
	pub busy_timeout_ms: u64,
}

impl OpenOptions {
	#[must_use]
	pub const fn new() -> Self {
		Self { create_if_missing: false, busy_timeout_ms: 0 }
	}

	#[must_use]
	pub const fn create_if_missing(mut self, create: bool) -> Self {
		self.create_if_missing = create;
		self
	}

	#[must_use]
	pub fn busy_timeout(mut self, timeout: Duration) -> Self {
		self.busy_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
		self
	}
}

/// An open database handle.
///
/// Every connection runs in defensive mode with the engine's limits lowered and the access
/// control functions registered. A connection is driven by one thread at a time.
pub struct Connection {
	db: NonNull<ffi::Sqlite3>,
}

impl Connection {
	/// Opens `name` read-write. `name` may be a path, `:memory:` or a `file:` URI.
	pub fn open(name: &str, create: bool) -> Result<Self> {
		Self::open_with(name, &OpenOptions::new().create_if_missing(create))
	}

	pub fn open_with(name: &str, options: &OpenOptions) -> Result<Self> {
		bootstrap()?;

		let name_c = CString::new(name)
			.map_err(|_| Error::Misuse("database name contains a NUL byte".to_string()))?;

		let mut flags = ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_URI | ffi::SQLITE_OPEN_EXRESCODE;
		if options.create_if_missing {
			flags |= ffi::SQLITE_OPEN_CREATE;
		}

		let mut db: *mut ffi::Sqlite3 = std::ptr::null_mut();
		let code = unsafe { ffi::sqlite3_open_v2(name_c.as_ptr(), &raw mut db, flags, std::ptr::null()) };
		if code != ffi::SQLITE_OK {
			let source = engine_error(db, code);
			let _ = unsafe { ffi::sqlite3_close_v2(db) };
			if !options.create_if_missing && source.primary_code() == ffi::SQLITE_CANTOPEN {
				debug!(name, "database not found");
				return Err(Error::NotFound { path: name.to_string() });
			}
			return Err(source.into());
		}

		let db = NonNull::new(db)
			.ok_or_else(|| Error::Misuse("sqlite returned a null connection handle".to_string()))?;

		// from here on, dropping `conn` closes the handle
		let conn = Self { db };
		conn.harden()?;
		access::register(&conn)?;
		if options.busy_timeout_ms > 0 {
			conn.busy_timeout(Duration::from_millis(options.busy_timeout_ms))?;
		}

		debug!(name, create = options.create_if_missing, "opened connection");
		Ok(conn)
	}

	/// Opens a private in-memory database.
	pub fn memory() -> Result<Self> {
		Self::open(":memory:", true)
	}

	/// Closes the connection, reporting any failure from the engine.
	pub fn close(self) -> Result<()> {
		let conn = ManuallyDrop::new(self);
		let db = conn.db.as_ptr();
		let code = unsafe { ffi::sqlite3_close_v2(db) };
		if code != ffi::SQLITE_OK {
			return Err(engine_error(db, code).into());
		}
		debug!("closed connection");
		Ok(())
	}

	/// Bounds how long a blocked write waits for its lock before failing as busy.
	pub fn busy_timeout(&self, timeout: Duration) -> Result<()> {
		let ms = c_int::try_from(timeout.as_millis()).unwrap_or(c_int::MAX);
		let code = unsafe { ffi::sqlite3_busy_timeout(self.as_ptr(), ms) };
		check_ok(self.as_ptr(), code)
	}

	/// Runs `sql` for its effects.
	///
	/// Without parameters the text may hold several statements. With parameters only the first
	/// statement runs, bound positionally.
	pub fn execute(&self, sql: &str, params: &[BindValue<'_>]) -> Result<()> {
		if params.is_empty() {
			return self.execute_batch(sql);
		}

		let Some(mut stmt) = self.prepare_with(sql, params)? else {
			return Ok(());
		};
		stmt.step_to_completion()?;
		stmt.close()
	}

	/// Runs every statement in `sql`, discarding any rows.
	pub fn execute_batch(&self, sql: &str) -> Result<()> {
		let sql_c = CString::new(sql).map_err(|_| Error::Misuse("SQL contains a NUL byte".to_string()))?;
		let code = unsafe {
			ffi::sqlite3_exec(
				self.as_ptr(),
				sql_c.as_ptr(),
				None,
				std::ptr::null_mut(),
				std::ptr::null_mut(),
			)
		};
		check_ok(self.as_ptr(), code)
	}

	/// Compiles the first statement in `sql`; `Ok(None)` when the text holds no statement.
	pub fn prepare(&self, sql: &str) -> Result<Option<Statement<'_>>> {
		Statement::prepare(self, sql)
	}

	/// Compiles `sql` and binds `params` positionally.
	///
	/// A statement whose binding fails is finalized before the error is returned.
	pub fn prepare_with(&self, sql: &str, params: &[BindValue<'_>]) -> Result<Option<Statement<'_>>> {
		let stmt = Statement::prepare(self, sql).map_err(|err| match err {
			Error::Prepare { source, sql, .. } => {
				Error::Prepare { source, sql, args: params.iter().map(BindValue::to_value).collect() }
			}
			other => other,
		})?;

		let Some(mut stmt) = stmt else {
			return Ok(None);
		};
		stmt.bind_all(params)?;
		Ok(Some(stmt))
	}

	/// A one-shot cursor over the first row of `sql`.
	pub fn row(&self, sql: &str, params: &[BindValue<'_>]) -> Row<'_> {
		Row::new(self.prepare_with(sql, params))
	}

	/// A cursor over every row of `sql`. Preparation errors surface through [`Rows::last_error`].
	pub fn rows(&self, sql: &str, params: &[BindValue<'_>]) -> Rows<'_> {
		Rows::new(self.prepare_with(sql, params))
	}

	#[must_use]
	pub fn last_insert_rowid(&self) -> i64 {
		unsafe { ffi::sqlite3_last_insert_rowid(self.as_ptr()) }
	}

	/// Rows changed by the most recent insert, update or delete.
	#[must_use]
	pub fn changes(&self) -> i64 {
		unsafe { ffi::sqlite3_changes64(self.as_ptr()) }
	}

	/// Creates the `sqlkite_user` temp table read by the access control functions.
	pub fn create_user_context(&self) -> Result<()> {
		self.execute_batch(access::CREATE_USER_CONTEXT_SQL)
	}

	#[must_use]
	pub const fn as_ptr(&self) -> *mut ffi::Sqlite3 {
		self.db.as_ptr()
	}

	fn harden(&self) -> Result<()> {
		let db = self.as_ptr();
		let _ = unsafe { ffi::sqlite3_extended_result_codes(db, 1) };

		for (op, value) in DB_CONFIG {
			let code =
				unsafe { ffi::sqlite3_db_config(db, op, value, std::ptr::null_mut::<c_int>()) };
			check_ok(db, code)?;
		}

		for (limit, value) in LIMITS {
			unsafe { ffi::sqlite3_limit(db, limit, value) };
		}
		Ok(())
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		let _ = unsafe { ffi::sqlite3_close_v2(self.db.as_ptr()) };
	}
}

/// Quotes `value` as a SQL string literal, doubling any single quotes.
///
/// For the few places a parameter cannot be bound, such as pragma arguments.
///
/// ```
/// assert_eq!(sqlkite::escape_literal("it's over 9000"), "'it''s over 9000'");
/// ```
#[must_use]
pub fn escape_literal(value: &str) -> String {
	let mut escaped = String::with_capacity(value.len() + 2);
	escaped.push('\'');
	for ch in value.chars() {
		if ch == '\'' {
			escaped.push('\'');
		}
		escaped.push(ch);
	}
	escaped.push('\'');
	escaped
}

fn bootstrap() -> Result<()> {
	let code = *BOOTSTRAP.get_or_init(|| {
		let code = unsafe { ffi::sqlite3_initialize() };
		if code == ffi::SQLITE_OK {
			info!(
				version = %sqlkite_sqlite_ffi::sqlite_lib_version(),
				version_number = sqlkite_sqlite_ffi::sqlite_lib_version_number(),
				source_id = %sqlkite_sqlite_ffi::sqlite_source_id(),
				"sqlite initialized"
			);
		}
		code
	});
	check_ok(std::ptr::null_mut(), code)
}
