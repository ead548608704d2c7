use sqlkite::{Connection, params};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(tracing::Level::DEBUG).init();

	let db = Connection::memory()?;
	db.create_user_context()?;
	db.execute_batch(
		"create table notes(id integer primary key, owner_id text not null, body text not null);
		create trigger notes_owner before insert on notes for each row
		begin
			select assert_user_id(new.owner_id);
		end;",
	)?;

	db.execute("insert into sqlkite_user(user_id, role) values (?1, ?2)", &params!["teg", "editor"])?;

	for (owner, body) in [("teg", "first draft"), ("leto", "not mine"), ("TEG", "second draft")] {
		match db.execute("insert into notes(owner_id, body) values (?1, ?2)", &params![owner, body]) {
			Ok(()) => println!("saved note for {owner}"),
			Err(err) if err.is_access_denied() => println!("denied note for {owner}"),
			Err(err) => return Err(err.into()),
		}
	}

	let mut rows = db.rows("select id, owner_id, body from notes order by id", &params![]);
	while rows.advance() {
		let (id, owner, body): (i64, String, String) = rows.scan()?;
		println!("{id} {owner}: {body}");
	}
	if let Some(err) = rows.last_error() {
		return Err(err.clone().into());
	}

	Ok(())
}
