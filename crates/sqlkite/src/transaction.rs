use tracing::{debug, warn};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::statement::Statement;
use crate::value::BindValue;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransactionMode {
	Deferred,
	Immediate,
	/// Takes the write lock up front, waiting up to the busy timeout for it.
	Exclusive,
}

impl TransactionMode {
	const fn begin_sql(self) -> &'static str {
		match self {
			Self::Deferred => "begin deferred",
			Self::Immediate => "begin immediate",
			Self::Exclusive => "begin exclusive",
		}
	}
}

/// An open transaction. Dropping it without committing rolls it back.
pub struct Transaction<'conn> {
	conn: &'conn Connection,
	active: bool,
}

impl Connection {
	pub fn begin(&self, mode: TransactionMode) -> Result<Transaction<'_>> {
		self.execute_batch(mode.begin_sql())?;
		debug!(?mode, "began transaction");
		Ok(Transaction { conn: self, active: true })
	}

	/// Runs `work` inside an exclusive transaction.
	///
	/// The transaction commits when `work` succeeds and rolls back when it fails. The error from
	/// `work` is always the one returned: a failed rollback is logged and otherwise dropped. A
	/// failed commit is returned as is, after which the transaction is rolled back.
	///
	/// ```
	/// # use sqlkite::{Connection, Error, params};
	/// let db = Connection::memory()?;
	/// db.execute("create table t(v int)", &params![])?;
	/// db.transaction(|db| {
	/// 	db.execute("insert into t(v) values (?1)", &params![1])?;
	/// 	db.execute("insert into t(v) values (?1)", &params![2])
	/// })?;
	/// let count: i64 = db.row("select count(*) from t", &params![]).get()?;
	/// assert_eq!(count, 2);
	/// # Ok::<(), Error>(())
	/// ```
	pub fn transaction<T, E, F>(&self, work: F) -> std::result::Result<T, E>
	where
		F: FnOnce(&Self) -> std::result::Result<T, E>,
		E: From<Error>,
	{
		let tx = self.begin(TransactionMode::Exclusive)?;
		match work(self) {
			Ok(value) => {
				tx.commit()?;
				Ok(value)
			}
			Err(err) => {
				if let Err(rollback) = tx.rollback() {
					warn!(error = %rollback, "rollback failed");
				}
				Err(err)
			}
		}
	}
}

impl<'conn> Transaction<'conn> {
	#[must_use]
	pub const fn connection(&self) -> &'conn Connection {
		self.conn
	}

	pub fn execute(&self, sql: &str, params: &[BindValue<'_>]) -> Result<()> {
		self.conn.execute(sql, params)
	}

	pub fn prepare(&self, sql: &str) -> Result<Option<Statement<'conn>>> {
		self.conn.prepare(sql)
	}

	pub fn commit(mut self) -> Result<()> {
		if !self.active {
			return Ok(());
		}

		self.conn.execute_batch("commit")?;
		self.active = false;
		debug!("committed transaction");
		Ok(())
	}

	pub fn rollback(mut self) -> Result<()> {
		if !self.active {
			return Ok(());
		}

		self.active = false;
		self.conn.execute_batch("rollback")?;
		debug!("rolled back transaction");
		Ok(())
	}

	#[must_use]
	pub const fn is_active(&self) -> bool {
		self.active
	}
}

impl Drop for Transaction<'_> {
	fn drop(&mut self) {
		if self.active {
			if let Err(err) = self.conn.execute_batch("rollback") {
				warn!(error = %err, "rollback on drop failed");
			} else {
				debug!("rolled back dropped transaction");
			}
		}
	}
}
