use std::collections::HashMap;

use crate::column::{FromColumn, FromRow};
use crate::error::{Error, Result, ScanFailure};
use crate::statement::Statement;
use crate::value::Value;

/// A one-shot view of the first row of a query.
///
/// Consuming it steps the statement once and always finalizes it, whether or not a row was
/// found. An empty result is reported as [`Error::NoRows`]. Targets must own their data, since
/// the statement is gone by the time the value is returned.
pub struct Row<'conn> {
	stmt: Result<Option<Statement<'conn>>>,
}

impl<'conn> Row<'conn> {
	pub(crate) const fn new(stmt: Result<Option<Statement<'conn>>>) -> Self {
		Self { stmt }
	}

	/// Reads the row into `T`, typically a tuple.
	pub fn scan<T>(self) -> Result<T>
	where
		T: for<'s> FromRow<'s>,
	{
		self.consume(|stmt| stmt.scan::<T>())
	}

	/// Reads the first column of the row.
	pub fn get<T>(self) -> Result<T>
	where
		T: for<'s> FromColumn<'s>,
	{
		self.consume(|stmt| stmt.get::<T>(0))
	}

	/// Reads every column of the row, keyed by column name.
	pub fn map(self) -> Result<HashMap<String, Value>> {
		self.consume(|stmt| {
			let values = stmt.row_values()?;
			Ok(stmt.column_names().into_iter().zip(values).collect())
		})
	}

	/// Column names of the query, or empty if it failed to prepare.
	#[must_use]
	pub fn column_names(&self) -> Vec<String> {
		match &self.stmt {
			Ok(Some(stmt)) => stmt.column_names(),
			_ => Vec::new(),
		}
	}

	fn consume<T>(self, read: impl FnOnce(&Statement<'conn>) -> Result<T>) -> Result<T> {
		let Some(mut stmt) = self.stmt? else {
			return Err(Error::NoRows);
		};

		let result = match stmt.step() {
			Ok(true) => read(&stmt),
			Ok(false) => Err(Error::NoRows),
			Err(err) => Err(err),
		};
		let closed = stmt.close();

		let value = result?;
		closed?;
		Ok(value)
	}
}

/// A caller-driven cursor over every row of a query.
///
/// The first failure, from preparing, stepping or scanning, is kept in [`Rows::last_error`] and
/// stops the cursor: [`Rows::advance`] returns `false` from then on. A scan failure also
/// finalizes the statement.
///
/// ```
/// # use sqlkite::{Connection, params};
/// let db = Connection::memory().unwrap();
/// let mut rows = db.rows("select 1 union all select 2", &params![]);
/// let mut total = 0;
/// while rows.advance() {
/// 	let Ok((n,)) = rows.scan::<(i64,)>() else { break };
/// 	total += n;
/// }
/// assert!(rows.last_error().is_none());
/// assert_eq!(total, 3);
/// ```
pub struct Rows<'conn> {
	stmt: Option<Statement<'conn>>,
	error: Option<Error>,
}

impl<'conn> Rows<'conn> {
	pub(crate) fn new(stmt: Result<Option<Statement<'conn>>>) -> Self {
		match stmt {
			Ok(stmt) => Self { stmt, error: None },
			Err(err) => Self { stmt: None, error: Some(err) },
		}
	}

	/// Moves to the next row, returning whether one is available.
	pub fn advance(&mut self) -> bool {
		if self.error.is_some() {
			return false;
		}
		let Some(stmt) = self.stmt.as_mut() else {
			return false;
		};

		match stmt.step() {
			Ok(has_row) => has_row,
			Err(err) => {
				self.error = Some(err);
				false
			}
		}
	}

	/// Reads the current row into `T`.
	pub fn scan<T>(&mut self) -> Result<T>
	where
		T: for<'s> FromRow<'s>,
	{
		let result = match &self.stmt {
			Some(stmt) => stmt.scan::<T>(),
			None => Err(self.inactive()),
		};
		self.keep_failure(result)
	}

	/// Reads column `index` of the current row into `T`.
	pub fn get<T>(&mut self, index: usize) -> Result<T>
	where
		T: for<'s> FromColumn<'s>,
	{
		let result = match &self.stmt {
			Some(stmt) => stmt.get::<T>(index),
			None => Err(self.inactive()),
		};
		self.keep_failure(result)
	}

	/// The error that stopped the cursor, if any.
	#[must_use]
	pub const fn last_error(&self) -> Option<&Error> {
		self.error.as_ref()
	}

	/// The underlying statement, for reads that borrow from the current row.
	#[must_use]
	pub const fn statement(&self) -> Option<&Statement<'conn>> {
		self.stmt.as_ref()
	}

	/// Finalizes the statement. Calling it again, or on a cursor that never prepared, does
	/// nothing. A failure already kept in [`Rows::last_error`] is not reported again.
	pub fn close(&mut self) -> Result<()> {
		let Some(stmt) = self.stmt.take() else {
			return Ok(());
		};
		if self.error.is_some() {
			// finalize repeats the code of the failed step
			drop(stmt);
			return Ok(());
		}
		stmt.close()
	}

	fn inactive(&self) -> Error {
		self.error.clone().unwrap_or(Error::Scan { index: 0, reason: ScanFailure::NoCurrentRow })
	}

	fn keep_failure<T>(&mut self, result: Result<T>) -> Result<T> {
		if let Err(err) = &result {
			if self.error.is_none() {
				self.error = Some(err.clone());
			}
			let _ = self.close();
		}
		result
	}
}
