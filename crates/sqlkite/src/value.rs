use core::ffi::c_int;
use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::ffi;

/// The storage class the engine reports for one column of the current row.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColumnType {
	Integer,
	Float,
	Text,
	Blob,
	Null,
}

impl ColumnType {
	pub(crate) const fn from_code(code: c_int) -> Self {
		match code {
			ffi::SQLITE_INTEGER => Self::Integer,
			ffi::SQLITE_FLOAT => Self::Float,
			ffi::SQLITE_TEXT => Self::Text,
			ffi::SQLITE_BLOB => Self::Blob,
			_ => Self::Null,
		}
	}
}

impl fmt::Display for ColumnType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Integer => "integer",
			Self::Float => "real",
			Self::Text => "text",
			Self::Blob => "blob",
			Self::Null => "null",
		})
	}
}

/// An owned column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Null,
	Integer(i64),
	Float(f64),
	Text(String),
	Blob(Vec<u8>),
}

impl Value {
	#[must_use]
	pub const fn column_type(&self) -> ColumnType {
		match self {
			Self::Null => ColumnType::Null,
			Self::Integer(_) => ColumnType::Integer,
			Self::Float(_) => ColumnType::Float,
			Self::Text(_) => ColumnType::Text,
			Self::Blob(_) => ColumnType::Blob,
		}
	}
}

/// A column value borrowing the statement's buffers.
///
/// Valid until the statement is stepped, reset or closed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ValueRef<'stmt> {
	Null,
	Integer(i64),
	Float(f64),
	Text(&'stmt [u8]),
	Blob(&'stmt [u8]),
}

impl ValueRef<'_> {
	#[must_use]
	pub fn to_owned_value(&self) -> Value {
		match *self {
			Self::Null => Value::Null,
			Self::Integer(v) => Value::Integer(v),
			Self::Float(v) => Value::Float(v),
			Self::Text(v) => Value::Text(String::from_utf8_lossy(v).into_owned()),
			Self::Blob(v) => Value::Blob(v.to_vec()),
		}
	}
}

/// A value bound to a statement parameter.
///
/// Booleans bind as integer 0/1 and timestamps as whole seconds since the epoch.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue<'a> {
	Null,
	Integer(i64),
	Float(f64),
	Text(Cow<'a, str>),
	Blob(Cow<'a, [u8]>),
	Bool(bool),
	Timestamp(DateTime<Utc>),
}

impl BindValue<'_> {
	/// The value as the engine stores it.
	#[must_use]
	pub fn to_value(&self) -> Value {
		match self {
			Self::Null => Value::Null,
			Self::Integer(v) => Value::Integer(*v),
			Self::Float(v) => Value::Float(*v),
			Self::Text(v) => Value::Text(v.clone().into_owned()),
			Self::Blob(v) => Value::Blob(v.clone().into_owned()),
			Self::Bool(v) => Value::Integer(i64::from(*v)),
			Self::Timestamp(v) => Value::Integer(v.timestamp()),
		}
	}
}

/// Builds a fixed-size array of [`BindValue`]s for positional binding.
///
/// ```
/// let params = sqlkite::params![1, "two", 3.5, None::<i64>];
/// assert_eq!(params.len(), 4);
/// ```
#[macro_export]
macro_rules! params {
	() => {
		[] as [$crate::BindValue<'static>; 0]
	};
	($($value:expr),+ $(,)?) => {
		[$($crate::BindValue::from($value)),+]
	};
}

macro_rules! bind_integer {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for BindValue<'_> {
				fn from(value: $ty) -> Self {
					Self::Integer(i64::from(value))
				}
			}
		)*
	};
}

bind_integer!(i8, i16, i32, i64, u8, u16, u32);

// wider unsigned values wrap into the engine's signed 64-bit integer
macro_rules! bind_wrapping_integer {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for BindValue<'_> {
				#[expect(clippy::cast_possible_wrap)]
				fn from(value: $ty) -> Self {
					Self::Integer(value as i64)
				}
			}
		)*
	};
}

bind_wrapping_integer!(u64, usize);

impl From<isize> for BindValue<'_> {
	fn from(value: isize) -> Self {
		Self::Integer(value as i64)
	}
}

impl From<f64> for BindValue<'_> {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<f32> for BindValue<'_> {
	fn from(value: f32) -> Self {
		Self::Float(f64::from(value))
	}
}

impl From<bool> for BindValue<'_> {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl<'a> From<&'a str> for BindValue<'a> {
	fn from(value: &'a str) -> Self {
		Self::Text(Cow::Borrowed(value))
	}
}

impl<'a> From<&'a String> for BindValue<'a> {
	fn from(value: &'a String) -> Self {
		Self::Text(Cow::Borrowed(value.as_str()))
	}
}

impl From<String> for BindValue<'_> {
	fn from(value: String) -> Self {
		Self::Text(Cow::Owned(value))
	}
}

impl<'a> From<&'a [u8]> for BindValue<'a> {
	fn from(value: &'a [u8]) -> Self {
		Self::Blob(Cow::Borrowed(value))
	}
}

impl<'a, const N: usize> From<&'a [u8; N]> for BindValue<'a> {
	fn from(value: &'a [u8; N]) -> Self {
		Self::Blob(Cow::Borrowed(value.as_slice()))
	}
}

impl<'a> From<&'a Vec<u8>> for BindValue<'a> {
	fn from(value: &'a Vec<u8>) -> Self {
		Self::Blob(Cow::Borrowed(value.as_slice()))
	}
}

impl From<Vec<u8>> for BindValue<'_> {
	fn from(value: Vec<u8>) -> Self {
		Self::Blob(Cow::Owned(value))
	}
}

impl From<DateTime<Utc>> for BindValue<'_> {
	fn from(value: DateTime<Utc>) -> Self {
		Self::Timestamp(value)
	}
}

impl From<Value> for BindValue<'_> {
	fn from(value: Value) -> Self {
		match value {
			Value::Null => Self::Null,
			Value::Integer(v) => Self::Integer(v),
			Value::Float(v) => Self::Float(v),
			Value::Text(v) => Self::Text(Cow::Owned(v)),
			Value::Blob(v) => Self::Blob(Cow::Owned(v)),
		}
	}
}

impl<'a> From<&'a Value> for BindValue<'a> {
	fn from(value: &'a Value) -> Self {
		match value {
			Value::Null => Self::Null,
			Value::Integer(v) => Self::Integer(*v),
			Value::Float(v) => Self::Float(*v),
			Value::Text(v) => Self::Text(Cow::Borrowed(v.as_str())),
			Value::Blob(v) => Self::Blob(Cow::Borrowed(v.as_slice())),
		}
	}
}

impl<'a, T: Into<BindValue<'a>>> From<Option<T>> for BindValue<'a> {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn integers_widen_and_wrap() {
		assert_eq!(BindValue::from(-3_i8), BindValue::Integer(-3));
		assert_eq!(BindValue::from(9001_u16), BindValue::Integer(9001));
		assert_eq!(BindValue::from(u32::MAX), BindValue::Integer(4_294_967_295));
		assert_eq!(BindValue::from(u64::MAX), BindValue::Integer(-1));
		assert_eq!(BindValue::from(7_usize), BindValue::Integer(7));
	}

	#[test]
	fn bool_and_timestamp_store_as_integers() {
		assert_eq!(BindValue::from(true).to_value(), Value::Integer(1));
		assert_eq!(BindValue::from(false).to_value(), Value::Integer(0));

		let at = DateTime::from_timestamp(1_700_000_000, 999_000_000).expect("valid timestamp");
		assert_eq!(BindValue::from(at).to_value(), Value::Integer(1_700_000_000));
	}

	#[test]
	fn none_binds_null_and_empty_text_stays_text() {
		assert_eq!(BindValue::from(None::<&str>), BindValue::Null);
		assert_eq!(BindValue::from(Some("")), BindValue::Text(Cow::Borrowed("")));
		assert_eq!(BindValue::from(Vec::<u8>::new()).to_value(), Value::Blob(Vec::new()));
	}

	#[test]
	fn params_macro_builds_bind_values() {
		let name = String::from("teg");
		let params = crate::params![1, &name, 2.5, b"raw", None::<i64>];
		assert_eq!(
			params,
			[
				BindValue::Integer(1),
				BindValue::Text(Cow::Borrowed("teg")),
				BindValue::Float(2.5),
				BindValue::Blob(Cow::Borrowed(b"raw".as_slice())),
				BindValue::Null,
			]
		);
		assert!(crate::params![].is_empty());
	}

	#[test]
	fn value_ref_copies_into_owned_value() {
		assert_eq!(ValueRef::Text(b"abc").to_owned_value(), Value::Text("abc".to_string()));
		assert_eq!(ValueRef::Blob(&[1, 2]).to_owned_value(), Value::Blob(vec![1, 2]));
		assert_eq!(ValueRef::Null.to_owned_value().column_type(), ColumnType::Null);
	}
}
