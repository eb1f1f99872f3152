use serde::{Deserialize, Serialize};
use time::Date;

/// One materialized occurrence. Dates and intra-day times are stored apart; `start_time` and
/// `end_time` are seconds after midnight.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
	pub uid: i64,
	/// Storage scope.
	pub pid: i64,
	pub foreign_table: String,
	pub foreign_uid: i64,
	/// Type tag of the domain object kind that produced the entry.
	pub unique_register_key: String,
	pub start_date: Option<Date>,
	pub start_time: i32,
	pub end_date: Option<Date>,
	pub end_time: i32,
	pub all_day: bool,
	pub sys_language_uid: i64,
}
