use time::Date;

use occidx_domain::{IndexEntry, ScopeTypeGroup};

#[derive(Debug, sqlx::FromRow)]
pub struct IndexEntryRow {
	pub uid: i64,
	pub pid: i64,
	pub foreign_table: String,
	pub foreign_uid: i64,
	pub unique_register_key: String,
	pub start_date: Option<Date>,
	pub start_time: i32,
	pub end_date: Option<Date>,
	pub end_time: i32,
	pub all_day: bool,
	pub sys_language_uid: i64,
}
impl From<IndexEntryRow> for IndexEntry {
	fn from(row: IndexEntryRow) -> Self {
		Self {
			uid: row.uid,
			pid: row.pid,
			foreign_table: row.foreign_table,
			foreign_uid: row.foreign_uid,
			unique_register_key: row.unique_register_key,
			start_date: row.start_date,
			start_time: row.start_time,
			end_date: row.end_date,
			end_time: row.end_time,
			all_day: row.all_day,
			sys_language_uid: row.sys_language_uid,
		}
	}
}

#[derive(Debug, sqlx::FromRow)]
pub struct ScopeTypeGroupRow {
	pub pid: i64,
	pub unique_register_key: String,
	pub foreign_table: String,
}
impl From<ScopeTypeGroupRow> for ScopeTypeGroup {
	fn from(row: ScopeTypeGroupRow) -> Self {
		Self {
			pid: row.pid,
			unique_register_key: row.unique_register_key,
			foreign_table: row.foreign_table,
		}
	}
}
