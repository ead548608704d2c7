#![allow(dead_code)]

use chrono::{DateTime, Utc};
use sqlkite::{Connection, Result, params};

pub type TestRow = (
	i64,
	i64,
	Option<i64>,
	f64,
	Option<f64>,
	String,
	Option<String>,
	Vec<u8>,
	Option<Vec<u8>>,
	DateTime<Utc>,
	Option<DateTime<Utc>>,
);

pub fn test_db() -> Connection {
	let db = Connection::open(":memory:", true).expect("open memory database");
	db.execute(
		"create table test (
			id integer primary key not null,
			cint integer not null default(0),
			cintn integer null,
			creal real not null default(0.0),
			crealn real null,
			ctext text not null default(''),
			ctextn text null,
			cblob blob not null default(''),
			cblobn blob null,
			ctime int not null default(0),
			ctimen int null,
			uniq int unique null
		)",
		&params![],
	)
	.expect("create test table");
	db
}

pub fn query_id(db: &Connection, id: i64) -> Result<TestRow> {
	db.row(
		"select id, cint, cintn, creal, crealn, ctext, ctextn, cblob, cblobn, ctime, ctimen from test where id = ?1",
		&params![id],
	)
	.scan()
}

pub fn product_ids(db: &Connection) -> Vec<i64> {
	let mut rows = db.rows("select id from products order by rowid", &params![]);
	let mut ids = Vec::new();
	while rows.advance() {
		ids.push(rows.get::<i64>(0).expect("product id"));
	}
	assert!(rows.last_error().is_none(), "{:?}", rows.last_error());
	ids
}
