//! A hardened, synchronous SQLite access layer with row-level access control.
//!
//! ```
//! use sqlkite::{Connection, params};
//!
//! let db = Connection::memory()?;
//! db.execute("create table notes(id integer primary key, body text not null)", &params![])?;
//! db.execute("insert into notes(body) values (?1)", &params!["hello"])?;
//!
//! let (id, body): (i64, String) = db.row("select id, body from notes", &params![]).scan()?;
//! assert_eq!((id, body.as_str()), (1, "hello"));
//! # Ok::<(), sqlkite::Error>(())
//! ```

mod access;
mod column;
mod connection;
mod cursor;
mod error;
mod statement;
mod transaction;
mod value;

pub use sqlkite_sqlite_ffi::ffi;

pub use access::CREATE_USER_CONTEXT_SQL;
pub use column::{FromColumn, FromRow, RawBytes};
pub use connection::{Connection, OpenOptions, escape_literal};
pub use cursor::{Row, Rows};
pub use error::{ACCESS_DENIED_MESSAGE, Error, Result, ScanFailure, SqliteError};
pub use statement::{Statement, StatementState};
pub use transaction::{Transaction, TransactionMode};
pub use value::{BindValue, ColumnType, Value, ValueRef};
