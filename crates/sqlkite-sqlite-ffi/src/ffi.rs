use core::ffi::{c_char, c_int, c_uchar, c_void};

pub type Sqlite3Int64 = i64;
pub type Sqlite3UInt64 = u64;
pub type Sqlite3DestructorType = Option<unsafe extern "C" fn(*mut c_void)>;

pub type Sqlite3Callback =
	Option<unsafe extern "C" fn(*mut Sqlite3Context, c_int, *mut *mut Sqlite3Value)>;
pub type Sqlite3StepCallback = Sqlite3Callback;
pub type Sqlite3FinalCallback = Option<unsafe extern "C" fn(*mut Sqlite3Context)>;
pub type Sqlite3ExecCallback =
	Option<unsafe extern "C" fn(*mut c_void, c_int, *mut *mut c_char, *mut *mut c_char) -> c_int>;

pub const SQLITE_OK: c_int = 0;
pub const SQLITE_ERROR: c_int = 1;
pub const SQLITE_BUSY: c_int = 5;
pub const SQLITE_LOCKED: c_int = 6;
pub const SQLITE_CANTOPEN: c_int = 14;
pub const SQLITE_CONSTRAINT: c_int = 19;
pub const SQLITE_MISUSE: c_int = 21;
pub const SQLITE_RANGE: c_int = 25;
pub const SQLITE_ROW: c_int = 100;
pub const SQLITE_DONE: c_int = 101;

pub const SQLITE_CONSTRAINT_UNIQUE: c_int = SQLITE_CONSTRAINT | (8 << 8);

pub const SQLITE_INTEGER: c_int = 1;
pub const SQLITE_FLOAT: c_int = 2;
pub const SQLITE_TEXT: c_int = 3;
pub const SQLITE_BLOB: c_int = 4;
pub const SQLITE_NULL: c_int = 5;

pub const SQLITE_UTF8: c_uchar = 1;

pub const SQLITE_OPEN_READWRITE: c_int = 0x0000_0002;
pub const SQLITE_OPEN_CREATE: c_int = 0x0000_0004;
pub const SQLITE_OPEN_URI: c_int = 0x0000_0040;
pub const SQLITE_OPEN_EXRESCODE: c_int = 0x0200_0000;

pub const SQLITE_DBCONFIG_ENABLE_LOAD_EXTENSION: c_int = 1005;
pub const SQLITE_DBCONFIG_DEFENSIVE: c_int = 1010;
pub const SQLITE_DBCONFIG_DQS_DML: c_int = 1013;
pub const SQLITE_DBCONFIG_DQS_DDL: c_int = 1014;

pub const SQLITE_LIMIT_LENGTH: c_int = 0;
pub const SQLITE_LIMIT_SQL_LENGTH: c_int = 1;
pub const SQLITE_LIMIT_COLUMN: c_int = 2;
pub const SQLITE_LIMIT_EXPR_DEPTH: c_int = 3;
pub const SQLITE_LIMIT_COMPOUND_SELECT: c_int = 4;
pub const SQLITE_LIMIT_VDBE_OP: c_int = 5;
pub const SQLITE_LIMIT_FUNCTION_ARG: c_int = 6;
pub const SQLITE_LIMIT_ATTACHED: c_int = 7;
pub const SQLITE_LIMIT_LIKE_PATTERN_LENGTH: c_int = 8;
pub const SQLITE_LIMIT_VARIABLE_NUMBER: c_int = 9;
pub const SQLITE_LIMIT_TRIGGER_DEPTH: c_int = 10;

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Sqlite3 {
	_unused: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Sqlite3Stmt {
	_unused: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Sqlite3Context {
	_unused: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct Sqlite3Value {
	_unused: [u8; 0],
}

unsafe extern "C" {
	pub fn sqlite3_initialize() -> c_int;
	pub fn sqlite3_libversion_number() -> c_int;
	pub fn sqlite3_libversion() -> *const c_char;
	pub fn sqlite3_sourceid() -> *const c_char;
	pub fn sqlite3_open_v2(
		filename: *const c_char,
		pp_db: *mut *mut Sqlite3,
		flags: c_int,
		z_vfs: *const c_char,
	) -> c_int;
	pub fn sqlite3_close_v2(db: *mut Sqlite3) -> c_int;
	pub fn sqlite3_db_config(db: *mut Sqlite3, op: c_int, ...) -> c_int;
	pub fn sqlite3_limit(db: *mut Sqlite3, id: c_int, new_val: c_int) -> c_int;
	pub fn sqlite3_busy_timeout(db: *mut Sqlite3, ms: c_int) -> c_int;
	pub fn sqlite3_exec(
		db: *mut Sqlite3,
		sql: *const c_char,
		callback: Sqlite3ExecCallback,
		arg: *mut c_void,
		errmsg: *mut *mut c_char,
	) -> c_int;
	pub fn sqlite3_changes64(db: *mut Sqlite3) -> Sqlite3Int64;
	pub fn sqlite3_last_insert_rowid(db: *mut Sqlite3) -> Sqlite3Int64;
	pub fn sqlite3_errmsg(db: *mut Sqlite3) -> *const c_char;
	pub fn sqlite3_errstr(code: c_int) -> *const c_char;
	pub fn sqlite3_extended_result_codes(db: *mut Sqlite3, onoff: c_int) -> c_int;
	pub fn sqlite3_prepare_v3(
		db: *mut Sqlite3,
		z_sql: *const c_char,
		n_byte: c_int,
		prep_flags: u32,
		pp_stmt: *mut *mut Sqlite3Stmt,
		pz_tail: *mut *const c_char,
	) -> c_int;
	pub fn sqlite3_step(p_stmt: *mut Sqlite3Stmt) -> c_int;
	pub fn sqlite3_finalize(p_stmt: *mut Sqlite3Stmt) -> c_int;
	pub fn sqlite3_reset(p_stmt: *mut Sqlite3Stmt) -> c_int;
	pub fn sqlite3_clear_bindings(p_stmt: *mut Sqlite3Stmt) -> c_int;
	pub fn sqlite3_bind_parameter_count(p_stmt: *mut Sqlite3Stmt) -> c_int;
	pub fn sqlite3_bind_parameter_index(p_stmt: *mut Sqlite3Stmt, z_name: *const c_char) -> c_int;
	pub fn sqlite3_bind_null(p_stmt: *mut Sqlite3Stmt, i: c_int) -> c_int;
	pub fn sqlite3_bind_int64(p_stmt: *mut Sqlite3Stmt, i: c_int, value: Sqlite3Int64) -> c_int;
	pub fn sqlite3_bind_double(p_stmt: *mut Sqlite3Stmt, i: c_int, value: f64) -> c_int;
	pub fn sqlite3_bind_text64(
		p_stmt: *mut Sqlite3Stmt,
		i: c_int,
		value: *const c_char,
		n: Sqlite3UInt64,
		destructor: Sqlite3DestructorType,
		encoding: c_uchar,
	) -> c_int;
	pub fn sqlite3_bind_blob64(
		p_stmt: *mut Sqlite3Stmt,
		i: c_int,
		value: *const c_void,
		n: Sqlite3UInt64,
		destructor: Sqlite3DestructorType,
	) -> c_int;
	pub fn sqlite3_column_count(p_stmt: *mut Sqlite3Stmt) -> c_int;
	pub fn sqlite3_column_name(p_stmt: *mut Sqlite3Stmt, i_col: c_int) -> *const c_char;
	pub fn sqlite3_column_type(p_stmt: *mut Sqlite3Stmt, i_col: c_int) -> c_int;
	pub fn sqlite3_column_int64(p_stmt: *mut Sqlite3Stmt, i_col: c_int) -> Sqlite3Int64;
	pub fn sqlite3_column_double(p_stmt: *mut Sqlite3Stmt, i_col: c_int) -> f64;
	pub fn sqlite3_column_text(p_stmt: *mut Sqlite3Stmt, i_col: c_int) -> *const c_uchar;
	pub fn sqlite3_column_blob(p_stmt: *mut Sqlite3Stmt, i_col: c_int) -> *const c_void;
	pub fn sqlite3_column_bytes(p_stmt: *mut Sqlite3Stmt, i_col: c_int) -> c_int;
	pub fn sqlite3_sql(p_stmt: *mut Sqlite3Stmt) -> *const c_char;
	pub fn sqlite3_create_function_v2(
		db: *mut Sqlite3,
		z_function_name: *const c_char,
		n_arg: c_int,
		e_text_rep: c_int,
		p_app: *mut c_void,
		x_func: Sqlite3Callback,
		x_step: Sqlite3StepCallback,
		x_final: Sqlite3FinalCallback,
		x_destroy: Sqlite3DestructorType,
	) -> c_int;
	pub fn sqlite3_context_db_handle(context: *mut Sqlite3Context) -> *mut Sqlite3;
	pub fn sqlite3_result_null(context: *mut Sqlite3Context);
	pub fn sqlite3_result_text64(
		context: *mut Sqlite3Context,
		value: *const c_char,
		n: Sqlite3UInt64,
		destructor: Sqlite3DestructorType,
		encoding: c_uchar,
	);
	pub fn sqlite3_result_error(context: *mut Sqlite3Context, value: *const c_char, n: c_int);
	pub fn sqlite3_value_type(value: *mut Sqlite3Value) -> c_int;
	pub fn sqlite3_value_text(value: *mut Sqlite3Value) -> *const c_uchar;
	pub fn sqlite3_value_bytes(value: *mut Sqlite3Value) -> c_int;
}
