use core::ffi::c_int;
use std::ffi::{CStr, CString};
use std::ptr::NonNull;

use tracing::trace;

use crate::column::{FromColumn, FromRow};
use crate::connection::Connection;
use crate::error::{Error, Result, ScanFailure, SqliteError, check_ok, engine_error, sqlite_error};
use crate::ffi;
use crate::value::{BindValue, ColumnType, Value, ValueRef};

/// Where a statement is in its step cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StatementState {
	/// Freshly prepared or reset; parameters may be bound.
	Prepared,
	/// Positioned on a result row.
	Row,
	/// Ran to completion, or failed; must be reset before it runs again.
	Done,
}

/// A prepared statement owned by one [`Connection`].
///
/// Dropping the statement finalizes it; [`Statement::close`] does the same and reports the result.
pub struct Statement<'conn> {
	conn: &'conn Connection,
	stmt: NonNull<ffi::Sqlite3Stmt>,
	state: StatementState,
	column_types: Vec<ColumnType>,
	finalized: bool,
}

impl<'conn> Statement<'conn> {
	/// Compiles the first statement in `sql`.
	///
	/// Text containing no statement (empty, whitespace or comments only) yields `Ok(None)`.
	pub(crate) fn prepare(conn: &'conn Connection, sql: &str) -> Result<Option<Self>> {
		let prepare_error =
			|source| Error::Prepare { source, sql: sql.to_string(), args: Vec::new() };

		let len = c_int::try_from(sql.len())
			.map_err(|_| prepare_error(SqliteError::misuse("SQL text is too large")))?;

		let mut stmt: *mut ffi::Sqlite3Stmt = std::ptr::null_mut();
		let code = unsafe {
			ffi::sqlite3_prepare_v3(
				conn.as_ptr(),
				sql.as_ptr().cast(),
				len,
				0,
				&raw mut stmt,
				std::ptr::null_mut(),
			)
		};
		if code != ffi::SQLITE_OK {
			return Err(prepare_error(engine_error(conn.as_ptr(), code)));
		}

		let Some(stmt) = NonNull::new(stmt) else {
			trace!(sql, "statement text is empty");
			return Ok(None);
		};

		trace!(sql, "prepared statement");
		let count = unsafe { ffi::sqlite3_column_count(stmt.as_ptr()) };
		let column_types = vec![ColumnType::Null; usize::try_from(count).unwrap_or_default()];

		Ok(Some(Self { conn, stmt, state: StatementState::Prepared, column_types, finalized: false }))
	}

	#[must_use]
	pub const fn state(&self) -> StatementState {
		self.state
	}

	#[must_use]
	pub fn parameter_count(&self) -> usize {
		let n = unsafe { ffi::sqlite3_bind_parameter_count(self.stmt.as_ptr()) };
		usize::try_from(n).unwrap_or_default()
	}

	/// Binds `value` to the 1-based parameter `index`.
	///
	/// A statement that has completed is reset first. Binding while positioned on a row is a
	/// misuse; reset the statement before rebinding.
	pub fn bind<'v>(&mut self, index: usize, value: impl Into<BindValue<'v>>) -> Result<()> {
		self.bind_value(index, &value.into())
	}

	pub fn bind_value(&mut self, index: usize, value: &BindValue<'_>) -> Result<()> {
		self.ready_for_binding()?;

		let position = c_int::try_from(index)
			.map_err(|_| Error::Misuse(format!("bind index {index} is out of range")))?;
		let stmt = self.stmt.as_ptr();

		let code = match value {
			BindValue::Null => unsafe { ffi::sqlite3_bind_null(stmt, position) },
			BindValue::Integer(v) => unsafe { ffi::sqlite3_bind_int64(stmt, position, *v) },
			BindValue::Float(v) => unsafe { ffi::sqlite3_bind_double(stmt, position, *v) },
			BindValue::Bool(v) => unsafe { ffi::sqlite3_bind_int64(stmt, position, i64::from(*v)) },
			BindValue::Timestamp(v) => unsafe {
				ffi::sqlite3_bind_int64(stmt, position, v.timestamp())
			},
			// a non-null pointer with zero length binds empty text, never NULL
			BindValue::Text(v) => unsafe {
				ffi::sqlite3_bind_text64(
					stmt,
					position,
					v.as_ptr().cast(),
					v.len() as u64,
					Some(sqlite_transient()),
					ffi::SQLITE_UTF8,
				)
			},
			BindValue::Blob(v) => unsafe {
				ffi::sqlite3_bind_blob64(
					stmt,
					position,
					v.as_ptr().cast(),
					v.len() as u64,
					Some(sqlite_transient()),
				)
			},
		};

		if code == ffi::SQLITE_OK {
			Ok(())
		} else {
			Err(Error::Bind { index, source: engine_error(self.conn.as_ptr(), code) })
		}
	}

	/// Binds `values` positionally, starting at parameter 1.
	pub fn bind_all(&mut self, values: &[BindValue<'_>]) -> Result<()> {
		for (offset, value) in values.iter().enumerate() {
			self.bind_value(offset + 1, value)?;
		}
		Ok(())
	}

	pub fn bind_named<'v>(&mut self, name: &str, value: impl Into<BindValue<'v>>) -> Result<()> {
		let value = value.into();
		for candidate in binding_name_candidates(name) {
			let candidate = CString::new(candidate)
				.map_err(|_| Error::Misuse("binding name contains a NUL byte".to_string()))?;

			let index =
				unsafe { ffi::sqlite3_bind_parameter_index(self.stmt.as_ptr(), candidate.as_ptr()) };
			if index > 0 {
				return self.bind_value(usize::try_from(index).unwrap_or_default(), &value);
			}
		}

		Err(Error::Misuse(format!("unknown named parameter: {name}")))
	}

	pub fn clear_bindings(&mut self) -> Result<()> {
		let code = unsafe { ffi::sqlite3_clear_bindings(self.stmt.as_ptr()) };
		check_ok(self.conn.as_ptr(), code)
	}

	/// Advances to the next row, returning whether one is available.
	///
	/// The column type cache is refreshed on every row. Once the statement is done, further
	/// calls return `false` without touching the engine until it is reset.
	pub fn step(&mut self) -> Result<bool> {
		if self.state == StatementState::Done {
			return Ok(false);
		}

		let code = unsafe { ffi::sqlite3_step(self.stmt.as_ptr()) };
		match code {
			ffi::SQLITE_ROW => {
				self.state = StatementState::Row;
				self.refresh_column_types();
				Ok(true)
			}
			ffi::SQLITE_DONE => {
				self.state = StatementState::Done;
				Ok(false)
			}
			_ => {
				self.state = StatementState::Done;
				Err(sqlite_error(self.conn.as_ptr(), code))
			}
		}
	}

	/// Steps until the statement completes, discarding any rows.
	pub fn step_to_completion(&mut self) -> Result<()> {
		while self.step()? {}
		Ok(())
	}

	pub fn reset(&mut self) -> Result<()> {
		self.state = StatementState::Prepared;
		let code = unsafe { ffi::sqlite3_reset(self.stmt.as_ptr()) };
		check_ok(self.conn.as_ptr(), code)
	}

	/// Binds `values`, runs the statement to completion and resets it for reuse.
	///
	/// The statement is reset on every path, including failures.
	pub fn execute(&mut self, values: &[BindValue<'_>]) -> Result<()> {
		let result = self.bind_all(values).and_then(|()| self.step_to_completion());
		let reset = self.reset();
		result.and(reset)
	}

	/// Finalizes the statement.
	pub fn close(mut self) -> Result<()> {
		self.finalized = true;
		let code = unsafe { ffi::sqlite3_finalize(self.stmt.as_ptr()) };
		check_ok(self.conn.as_ptr(), code)
	}

	/// The storage class of each column in the current row.
	///
	/// Only meaningful while positioned on a row; it is overwritten by every step.
	#[must_use]
	pub fn column_types(&self) -> &[ColumnType] {
		&self.column_types
	}

	#[must_use]
	pub fn column_count(&self) -> usize {
		self.column_types.len()
	}

	#[must_use]
	pub fn column_name(&self, index: usize) -> Option<String> {
		let index = c_int::try_from(index).ok()?;
		let ptr = unsafe { ffi::sqlite3_column_name(self.stmt.as_ptr(), index) };
		if ptr.is_null() {
			None
		} else {
			Some(unsafe { CStr::from_ptr(ptr).to_string_lossy().into_owned() })
		}
	}

	#[must_use]
	pub fn column_names(&self) -> Vec<String> {
		(0..self.column_count()).filter_map(|i| self.column_name(i)).collect()
	}

	/// Reads column `index` of the current row into `T`.
	pub fn get<'stmt, T: FromColumn<'stmt>>(&'stmt self, index: usize) -> Result<T> {
		self.value(index).and_then(|value| {
			T::from_column(value).map_err(|reason| Error::Scan { index, reason })
		})
	}

	/// Reads the whole current row into `T`.
	pub fn scan<'stmt, T: FromRow<'stmt>>(&'stmt self) -> Result<T> {
		T::from_row(self)
	}

	/// Borrows column `index` of the current row.
	pub fn value(&self, index: usize) -> Result<ValueRef<'_>> {
		if self.state != StatementState::Row {
			return Err(Error::Scan { index, reason: ScanFailure::NoCurrentRow });
		}

		let Some(kind) = self.column_types.get(index).copied() else {
			return Err(Error::Scan {
				index,
				reason: ScanFailure::ColumnOutOfRange { count: self.column_count() },
			});
		};

		// index < column count, which came from a c_int
		let column = c_int::try_from(index).unwrap_or_default();
		let stmt = self.stmt.as_ptr();

		let value = match kind {
			ColumnType::Null => ValueRef::Null,
			ColumnType::Integer => ValueRef::Integer(unsafe { ffi::sqlite3_column_int64(stmt, column) }),
			ColumnType::Float => ValueRef::Float(unsafe { ffi::sqlite3_column_double(stmt, column) }),
			ColumnType::Text => {
				let ptr = unsafe { ffi::sqlite3_column_text(stmt, column) };
				ValueRef::Text(unsafe { column_slice(ptr.cast(), stmt, column) })
			}
			ColumnType::Blob => {
				let ptr = unsafe { ffi::sqlite3_column_blob(stmt, column) };
				ValueRef::Blob(unsafe { column_slice(ptr.cast(), stmt, column) })
			}
		};

		Ok(value)
	}

	/// Copies every column of the current row.
	pub fn row_values(&self) -> Result<Vec<Value>> {
		(0..self.column_count()).map(|i| self.value(i).map(|value| value.to_owned_value())).collect()
	}

	#[must_use]
	pub fn sql(&self) -> Option<String> {
		let ptr = unsafe { ffi::sqlite3_sql(self.stmt.as_ptr()) };
		if ptr.is_null() {
			None
		} else {
			Some(unsafe { CStr::from_ptr(ptr).to_string_lossy().into_owned() })
		}
	}

	fn ready_for_binding(&mut self) -> Result<()> {
		match self.state {
			StatementState::Prepared => Ok(()),
			StatementState::Done => {
				// a failed step was already reported; reset would repeat its code
				let _ = unsafe { ffi::sqlite3_reset(self.stmt.as_ptr()) };
				self.state = StatementState::Prepared;
				Ok(())
			}
			StatementState::Row => {
				Err(Error::Misuse("statement must be reset before rebinding".to_string()))
			}
		}
	}

	fn refresh_column_types(&mut self) {
		let stmt = self.stmt.as_ptr();
		// the engine may have re-prepared after a schema change
		let count = unsafe { ffi::sqlite3_column_count(stmt) };
		self.column_types.resize(usize::try_from(count).unwrap_or_default(), ColumnType::Null);
		for (i, slot) in self.column_types.iter_mut().enumerate() {
			let Ok(column) = c_int::try_from(i) else {
				break;
			};
			*slot = ColumnType::from_code(unsafe { ffi::sqlite3_column_type(stmt, column) });
		}
	}
}

impl Drop for Statement<'_> {
	fn drop(&mut self) {
		if !self.finalized {
			let _ = unsafe { ffi::sqlite3_finalize(self.stmt.as_ptr()) };
		}
	}
}

/// Builds a slice over a column buffer owned by the engine.
///
/// # Safety
/// `ptr` must be the pointer just returned for `column` of `stmt`; the slice is only valid
/// until the statement is next stepped, reset or finalized.
unsafe fn column_slice<'a>(ptr: *const u8, stmt: *mut ffi::Sqlite3Stmt, column: c_int) -> &'a [u8] {
	let len = usize::try_from(unsafe { ffi::sqlite3_column_bytes(stmt, column) }).unwrap_or_default();
	if ptr.is_null() || len == 0 {
		return &[];
	}
	unsafe { std::slice::from_raw_parts(ptr, len) }
}

fn binding_name_candidates(name: &str) -> Vec<String> {
	if name.starts_with(':')
		|| name.starts_with('@')
		|| name.starts_with('$')
		|| name.starts_with('?')
	{
		vec![name.to_string()]
	} else {
		vec![format!(":{name}"), format!("@{name}"), format!("${name}")]
	}
}

pub(crate) fn sqlite_transient() -> unsafe extern "C" fn(*mut std::ffi::c_void) {
	unsafe { std::mem::transmute::<isize, unsafe extern "C" fn(*mut std::ffi::c_void)>(-1_isize) }
}
