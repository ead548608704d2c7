//! Conversions from column values into Rust types.
//!
//! Non-nullable targets reject NULL columns with [`ScanFailure::NullIntoNonNullable`]; wrap the
//! target in `Option` to accept them.

use std::ops::Deref;

use chrono::{DateTime, Utc};

use crate::error::{Result, ScanFailure};
use crate::statement::Statement;
use crate::value::{ColumnType, Value, ValueRef};

/// A type a single column can be read into.
pub trait FromColumn<'stmt>: Sized {
	fn from_column(value: ValueRef<'stmt>) -> std::result::Result<Self, ScanFailure>;
}

/// A type a whole row can be read into.
pub trait FromRow<'stmt>: Sized {
	fn from_row(stmt: &'stmt Statement<'_>) -> Result<Self>;
}

/// Bytes borrowed straight from the engine's buffer for one column.
///
/// The view is tied to the statement it came from: it cannot outlive the next step, reset or
/// close. Copy it with `to_vec` (or scan into `Vec<u8>`) to keep the data.
///
/// ```compile_fail
/// # use sqlkite::{Connection, RawBytes, params};
/// let db = Connection::memory().unwrap();
/// let mut stmt = db.prepare("select 'a' union all select 'b'").unwrap().unwrap();
/// stmt.step().unwrap();
/// let first: RawBytes<'_> = stmt.get(0).unwrap();
/// stmt.step().unwrap();
/// assert_eq!(&*first, b"a");
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawBytes<'stmt>(&'stmt [u8]);

impl<'stmt> RawBytes<'stmt> {
	#[must_use]
	pub const fn as_bytes(&self) -> &'stmt [u8] {
		self.0
	}
}

impl Deref for RawBytes<'_> {
	type Target = [u8];

	fn deref(&self) -> &[u8] {
		self.0
	}
}

const fn null_into(target: &'static str) -> ScanFailure {
	ScanFailure::NullIntoNonNullable { target }
}

const fn out_of_range(target: &'static str, value: &ValueRef<'_>) -> ScanFailure {
	ScanFailure::OutOfRange { target, found: value_type(value) }
}

const fn value_type(value: &ValueRef<'_>) -> ColumnType {
	match value {
		ValueRef::Null => ColumnType::Null,
		ValueRef::Integer(_) => ColumnType::Integer,
		ValueRef::Float(_) => ColumnType::Float,
		ValueRef::Text(_) => ColumnType::Text,
		ValueRef::Blob(_) => ColumnType::Blob,
	}
}

const fn mismatch(target: &'static str, value: &ValueRef<'_>) -> ScanFailure {
	ScanFailure::TypeMismatch { target, found: value_type(value) }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_float(v: f64) -> Option<i64> {
	(v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64).then(|| v as i64)
}

fn integer(value: ValueRef<'_>, target: &'static str) -> std::result::Result<i64, ScanFailure> {
	match value {
		ValueRef::Null => Err(null_into(target)),
		ValueRef::Integer(v) => Ok(v),
		ValueRef::Float(v) => truncate_float(v).ok_or_else(|| out_of_range(target, &value)),
		ValueRef::Text(v) => std::str::from_utf8(v)
			.ok()
			.and_then(|text| text.trim().parse().ok())
			.ok_or_else(|| mismatch(target, &value)),
		ValueRef::Blob(_) => Err(mismatch(target, &value)),
	}
}

macro_rules! from_integer_column {
	($($ty:ty),*) => {
		$(
			impl FromColumn<'_> for $ty {
				fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
					let n = integer(value, stringify!($ty))?;
					<$ty>::try_from(n).map_err(|_| out_of_range(stringify!($ty), &value))
				}
			}
		)*
	};
}

from_integer_column!(i8, i16, i32, u8, u16, u32, u64, usize, isize);

impl FromColumn<'_> for i64 {
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		integer(value, "i64")
	}
}

impl FromColumn<'_> for f64 {
	#[expect(clippy::cast_precision_loss)]
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Err(null_into("f64")),
			ValueRef::Float(v) => Ok(v),
			ValueRef::Integer(v) => Ok(v as Self),
			ValueRef::Text(v) => std::str::from_utf8(v)
				.ok()
				.and_then(|text| text.trim().parse().ok())
				.ok_or_else(|| mismatch("f64", &value)),
			ValueRef::Blob(_) => Err(mismatch("f64", &value)),
		}
	}
}

impl FromColumn<'_> for f32 {
	#[expect(clippy::cast_possible_truncation)]
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Err(null_into("f32")),
			_ => f64::from_column(value).map(|v| v as Self),
		}
	}
}

impl FromColumn<'_> for bool {
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Err(null_into("bool")),
			ValueRef::Float(v) => Ok(v != 0.0),
			_ => integer(value, "bool").map(|n| n != 0),
		}
	}
}

impl FromColumn<'_> for String {
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Err(null_into("String")),
			ValueRef::Integer(v) => Ok(v.to_string()),
			ValueRef::Float(v) => Ok(v.to_string()),
			ValueRef::Text(v) | ValueRef::Blob(v) => {
				std::str::from_utf8(v).map(str::to_owned).map_err(|_| ScanFailure::InvalidUtf8)
			}
		}
	}
}

impl<'stmt> FromColumn<'stmt> for &'stmt str {
	fn from_column(value: ValueRef<'stmt>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Err(null_into("&str")),
			ValueRef::Text(v) | ValueRef::Blob(v) => {
				std::str::from_utf8(v).map_err(|_| ScanFailure::InvalidUtf8)
			}
			ValueRef::Integer(_) | ValueRef::Float(_) => Err(mismatch("&str", &value)),
		}
	}
}

/// Always copies the column's bytes out of the engine.
impl FromColumn<'_> for Vec<u8> {
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Err(null_into("Vec<u8>")),
			ValueRef::Integer(v) => Ok(v.to_string().into_bytes()),
			ValueRef::Float(v) => Ok(v.to_string().into_bytes()),
			ValueRef::Text(v) | ValueRef::Blob(v) => Ok(v.to_vec()),
		}
	}
}

impl<'stmt> FromColumn<'stmt> for RawBytes<'stmt> {
	fn from_column(value: ValueRef<'stmt>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Err(null_into("RawBytes")),
			ValueRef::Text(v) | ValueRef::Blob(v) => Ok(Self(v)),
			ValueRef::Integer(_) | ValueRef::Float(_) => Err(mismatch("RawBytes", &value)),
		}
	}
}

/// Whole seconds since the Unix epoch.
impl FromColumn<'_> for DateTime<Utc> {
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		let seconds = integer(value, "DateTime<Utc>")?;
		DateTime::from_timestamp(seconds, 0).ok_or_else(|| out_of_range("DateTime<Utc>", &value))
	}
}

impl FromColumn<'_> for Value {
	fn from_column(value: ValueRef<'_>) -> std::result::Result<Self, ScanFailure> {
		Ok(value.to_owned_value())
	}
}

impl<'stmt> FromColumn<'stmt> for ValueRef<'stmt> {
	fn from_column(value: ValueRef<'stmt>) -> std::result::Result<Self, ScanFailure> {
		Ok(value)
	}
}

impl<'stmt, T: FromColumn<'stmt>> FromColumn<'stmt> for Option<T> {
	fn from_column(value: ValueRef<'stmt>) -> std::result::Result<Self, ScanFailure> {
		match value {
			ValueRef::Null => Ok(None),
			_ => T::from_column(value).map(Some),
		}
	}
}

impl<'stmt> FromRow<'stmt> for Vec<Value> {
	fn from_row(stmt: &'stmt Statement<'_>) -> Result<Self> {
		stmt.row_values()
	}
}

macro_rules! from_row_tuple {
	($($name:ident $index:tt),+) => {
		impl<'stmt, $($name: FromColumn<'stmt>),+> FromRow<'stmt> for ($($name,)+) {
			fn from_row(stmt: &'stmt Statement<'_>) -> Result<Self> {
				Ok(($(stmt.get::<$name>($index)?,)+))
			}
		}
	};
}

from_row_tuple!(A 0);
from_row_tuple!(A 0, B 1);
from_row_tuple!(A 0, B 1, C 2);
from_row_tuple!(A 0, B 1, C 2, D 3);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
from_row_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn null_into_non_nullable_fails() {
		assert_eq!(i64::from_column(ValueRef::Null), Err(null_into("i64")));
		assert_eq!(String::from_column(ValueRef::Null), Err(null_into("String")));
		assert_eq!(Vec::<u8>::from_column(ValueRef::Null), Err(null_into("Vec<u8>")));
		assert_eq!(bool::from_column(ValueRef::Null), Err(null_into("bool")));
	}

	#[test]
	fn option_absorbs_null() {
		assert_eq!(Option::<i64>::from_column(ValueRef::Null), Ok(None));
		assert_eq!(Option::<i64>::from_column(ValueRef::Integer(4)), Ok(Some(4)));
		assert_eq!(Option::<String>::from_column(ValueRef::Text(b"")), Ok(Some(String::new())));
	}

	#[test]
	fn narrow_integers_are_range_checked() {
		assert_eq!(u16::from_column(ValueRef::Integer(9001)), Ok(9001));
		assert_eq!(
			u8::from_column(ValueRef::Integer(256)),
			Err(ScanFailure::OutOfRange { target: "u8", found: ColumnType::Integer })
		);
		assert_eq!(
			u64::from_column(ValueRef::Integer(-1)),
			Err(ScanFailure::OutOfRange { target: "u64", found: ColumnType::Integer })
		);
	}

	#[test]
	fn numbers_follow_engine_coercions() {
		assert_eq!(i64::from_column(ValueRef::Float(2.9)), Ok(2));
		assert_eq!(i64::from_column(ValueRef::Text(b" 42 ")), Ok(42));
		assert_eq!(f64::from_column(ValueRef::Integer(3)), Ok(3.0));
		assert_eq!(String::from_column(ValueRef::Integer(-7)), Ok("-7".to_string()));
		assert_eq!(
			i64::from_column(ValueRef::Blob(&[1])),
			Err(ScanFailure::TypeMismatch { target: "i64", found: ColumnType::Blob })
		);
		assert!(i64::from_column(ValueRef::Float(f64::NAN)).is_err());
	}

	#[test]
	fn text_must_be_utf8() {
		assert_eq!(String::from_column(ValueRef::Text(&[0xff, 0xfe])), Err(ScanFailure::InvalidUtf8));
		assert_eq!(<&str>::from_column(ValueRef::Text(b"ok")), Ok("ok"));
	}

	#[test]
	fn timestamps_are_whole_seconds() {
		let at = DateTime::<Utc>::from_column(ValueRef::Integer(1_700_000_000)).expect("timestamp");
		assert_eq!(at.timestamp(), 1_700_000_000);
		assert_eq!(at.timestamp_subsec_nanos(), 0);
	}

	#[test]
	fn raw_bytes_borrow_text_and_blobs() {
		let data = b"a9c".to_vec();
		let raw = RawBytes::from_column(ValueRef::Text(&data)).expect("raw bytes");
		assert_eq!(raw.len(), 3);
		assert_eq!(raw.as_bytes(), b"a9c");
		assert!(RawBytes::from_column(ValueRef::Integer(1)).is_err());
	}
}
