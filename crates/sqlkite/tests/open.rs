use std::time::{Duration, Instant};

use sqlkite::{Connection, Error, OpenOptions, TransactionMode, params};

fn db_path(dir: &tempfile::TempDir, name: &str) -> String {
	dir.path().join(name).to_str().expect("utf-8 temp path").to_string()
}

#[test]
fn missing_database_is_not_found_without_create() {
	let dir = tempfile::tempdir().expect("temp dir");
	let path = db_path(&dir, "missing.db");

	let Err(err) = Connection::open(&path, false) else {
		panic!("opened a database that does not exist");
	};
	assert_eq!(err, Error::NotFound { path: path.clone() });
	assert_eq!(err.code(), Some(sqlkite::ffi::SQLITE_CANTOPEN));
	assert!(!dir.path().join("missing.db").exists());
}

#[test]
fn create_then_reopen_without_create() {
	let dir = tempfile::tempdir().expect("temp dir");
	let path = db_path(&dir, "app.db");

	let db = Connection::open(&path, true).expect("create database");
	db.execute("create table t(v text)", &params![]).expect("create table");
	db.execute("insert into t(v) values (?1)", &params!["kept"]).expect("insert");
	db.close().expect("close");

	let db = Connection::open(&path, false).expect("reopen existing database");
	let value: String = db.row("select v from t", &params![]).get().expect("value");
	assert_eq!(value, "kept");
}

#[test]
fn missing_directory_with_create_is_an_engine_error() {
	let dir = tempfile::tempdir().expect("temp dir");
	let path = db_path(&dir, "no/such/dir/app.db");

	let Err(err) = Connection::open(&path, true) else {
		panic!("opened a database in a missing directory");
	};
	assert!(matches!(err, Error::Sqlite(_)), "{err}");
	assert_eq!(err.engine_error().map(sqlkite::SqliteError::primary_code), Some(sqlkite::ffi::SQLITE_CANTOPEN));
}

#[test]
fn options_deserialize_with_defaults() {
	let options: OpenOptions = serde_json::from_str("{}").expect("empty options");
	assert_eq!(options, OpenOptions::default());

	let options: OpenOptions =
		serde_json::from_str(r#"{"create_if_missing": true, "busy_timeout_ms": 250}"#).expect("options");
	assert_eq!(options, OpenOptions::new().create_if_missing(true).busy_timeout(Duration::from_millis(250)));
}

#[test]
fn open_with_options_creates_the_database() {
	let dir = tempfile::tempdir().expect("temp dir");
	let path = db_path(&dir, "options.db");
	let options: OpenOptions = serde_json::from_str(r#"{"create_if_missing": true}"#).expect("options");

	let db = Connection::open_with(&path, &options).expect("open with options");
	db.execute("create table t(v int)", &params![]).expect("create table");
	assert!(dir.path().join("options.db").exists());
}

#[test]
fn busy_timeout_bounds_the_wait_for_a_lock() {
	let dir = tempfile::tempdir().expect("temp dir");
	let path = db_path(&dir, "busy.db");

	let writer = Connection::open(&path, true).expect("open writer");
	writer.execute("create table t(v int)", &params![]).expect("create table");

	let options = OpenOptions::new().busy_timeout(Duration::from_millis(100));
	let waiter = Connection::open_with(&path, &options).expect("open waiter");

	let tx = writer.begin(TransactionMode::Exclusive).expect("writer lock");
	let started = Instant::now();
	let Err(err) = waiter.begin(TransactionMode::Exclusive) else {
		panic!("took a lock held by another connection");
	};
	assert!(err.is_busy(), "{err}");
	assert!(started.elapsed() >= Duration::from_millis(80));

	tx.commit().expect("writer commit");
	waiter
		.transaction(|db| db.execute("insert into t(v) values (?1)", &params![1]))
		.expect("lock is free again");
	let count: i64 = writer.row("select count(*) from t", &params![]).get().expect("count");
	assert_eq!(count, 1);
}
