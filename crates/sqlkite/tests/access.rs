mod common;

use common::{product_ids, test_db};
use sqlkite::{Connection, Error, params};

fn guarded_db(column: &str, function: &str) -> Connection {
	let db = test_db();
	db.create_user_context().expect("create user context");
	db.execute(&format!("create table products (id integer not null, {column} text not null)"), &params![])
		.expect("create products");
	db.execute(
		&format!(
			"create trigger products_row_control before insert on products for each row
			begin
				select {function}(new.{column});
			end"
		),
		&params![],
	)
	.expect("create trigger");
	db
}

#[test]
fn current_user_functions_read_the_context() {
	let db = test_db();
	db.create_user_context().expect("create user context");

	let user: Option<String> = db.row("select current_user_id()", &params![]).get().expect("user");
	assert_eq!(user, None);
	let role: Option<String> = db.row("select current_user_role()", &params![]).get().expect("role");
	assert_eq!(role, None);

	db.execute("insert into sqlkite_user (user_id, role) values ('teg', 'special')", &params![])
		.expect("insert user");

	let user: String = db.row("select current_user_id()", &params![]).get().expect("user");
	assert_eq!(user, "teg");
	let role: String = db.row("select current_user_role()", &params![]).get().expect("role");
	assert_eq!(role, "special");
}

#[test]
fn assert_functions_check_their_arguments() {
	let db = test_db();
	db.create_user_context().expect("create user context");

	let err = db.execute("select assert_user_id()", &params![]).expect_err("missing argument");
	assert!(err.to_string().contains("wrong number of arguments to function assert_user_id()"), "{err}");

	let err = db.execute("select assert_user_role()", &params![]).expect_err("missing argument");
	assert!(err.to_string().contains("wrong number of arguments to function assert_user_role()"), "{err}");

	let err = db.execute("select assert_user_id(32)", &params![]).expect_err("integer argument");
	assert!(err.to_string().contains("requires a text argument"), "{err}");

	let err = db.execute("select assert_user_role(?1)", &params![9000.1]).expect_err("real argument");
	assert!(err.to_string().contains("requires a text argument"), "{err}");
}

#[test]
fn assert_user_id_guards_inserts() {
	let db = guarded_db("owner_id", "assert_user_id");

	let err = db.execute("insert into products (id, owner_id) values (1, 'teg')", &params![]).expect_err("no user");
	assert!(err.is_access_denied());
	assert!(err.to_string().contains("sqlkite_row_access"));
	assert_eq!(product_ids(&db), Vec::<i64>::new());

	db.execute("insert into sqlkite_user (user_id) values ('teg')", &params![]).expect("set user");
	db.execute("insert into products (id, owner_id) values (?1, ?2)", &params![1, "Teg"])
		.expect("matching owner, ignoring case");
	assert_eq!(product_ids(&db), vec![1]);

	let err = db
		.execute("insert into products (id, owner_id) values (?1, ?2)", &params![1, "other"])
		.expect_err("other owner");
	assert!(err.is_access_denied());
	assert_eq!(product_ids(&db), vec![1]);

	let result = db.transaction(|db| {
		db.execute("update sqlkite_user set user_id = 'ghanima'", &params![])?;
		db.execute("insert into products (id, owner_id) values (2, 'ghanima')", &params![])?;
		assert_eq!(product_ids(db), vec![1, 2]);
		db.execute("insert into products (id, owner_id) values (3, 'leto')", &params![])
	});
	let err = result.expect_err("leto is not the current user");
	assert!(err.is_access_denied());
	assert_eq!(product_ids(&db), vec![1]);

	let user: String = db.row("select current_user_id()", &params![]).get().expect("user");
	assert_eq!(user, "teg");
}

#[test]
fn assert_user_role_guards_inserts() {
	let db = guarded_db("role", "assert_user_role");

	let err = db.execute("insert into products (id, role) values (1, 'public')", &params![]).expect_err("no role");
	assert!(err.is_access_denied());
	assert_eq!(product_ids(&db), Vec::<i64>::new());

	db.execute("insert into sqlkite_user (role) values ('public')", &params![]).expect("set role");
	db.execute("insert into products (id, role) values (1, 'Public')", &params![]).expect("matching role");
	assert_eq!(product_ids(&db), vec![1]);

	let err = db.execute("insert into products (id, role) values (1, 'other')", &params![]).expect_err("other role");
	assert!(err.is_access_denied());
	assert_eq!(product_ids(&db), vec![1]);

	let result = db.transaction(|db| {
		db.execute("update sqlkite_user set role = 'ADMIN'", &params![])?;
		db.execute("insert into products (id, role) values (2, 'ADmin')", &params![])?;
		db.execute("insert into products (id, role) values (3, 'guest')", &params![])
	});
	assert!(matches!(result, Err(Error::AccessDenied(_))));
	assert_eq!(product_ids(&db), vec![1]);
}

#[test]
fn denied_multi_row_insert_persists_nothing() {
	let db = guarded_db("owner_id", "assert_user_id");
	db.execute("insert into sqlkite_user (user_id) values ('teg')", &params![]).expect("set user");

	let err = db
		.execute("insert into products (id, owner_id) values (1, 'teg'), (2, 'leto')", &params![])
		.expect_err("second row denied");
	assert!(err.is_access_denied());
	assert_eq!(product_ids(&db), Vec::<i64>::new());
}
