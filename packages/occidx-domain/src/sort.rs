use std::cmp::Ordering;

use time::Date;

use crate::entry::IndexEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortDirection {
	Ascending,
	Descending,
}
impl SortDirection {
	/// Anything that is not an ascending keyword sorts descending.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_lowercase().as_str() {
			"asc" | "ascending" => Self::Ascending,
			_ => Self::Descending,
		}
	}

	pub fn as_sql(&self) -> &'static str {
		match self {
			Self::Ascending => "ASC",
			Self::Descending => "DESC",
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortField {
	#[default]
	Start,
	End,
	/// End date first, then the start pair.
	EndThenStart,
}
impl SortField {
	/// `"withrangelast"` and `"end"` are recognized; every other value sorts by start.
	pub fn parse(raw: &str) -> Self {
		match raw.trim() {
			"withrangelast" => Self::EndThenStart,
			"end" => Self::End,
			_ => Self::Start,
		}
	}

	pub fn columns(&self) -> &'static [SortColumn] {
		match self {
			Self::Start => &[SortColumn::StartDate, SortColumn::StartTime],
			Self::End => &[SortColumn::EndDate, SortColumn::EndTime],
			Self::EndThenStart =>
				&[SortColumn::EndDate, SortColumn::StartDate, SortColumn::StartTime],
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortColumn {
	StartDate,
	StartTime,
	EndDate,
	EndTime,
}
impl SortColumn {
	pub fn column(&self) -> &'static str {
		match self {
			Self::StartDate => "start_date",
			Self::StartTime => "start_time",
			Self::EndDate => "end_date",
			Self::EndTime => "end_time",
		}
	}

	/// Ascending order with missing dates last, matching Postgres `NULLS LAST` for `ASC`.
	fn compare(&self, lhs: &IndexEntry, rhs: &IndexEntry) -> Ordering {
		match self {
			Self::StartDate => compare_dates(lhs.start_date, rhs.start_date),
			Self::StartTime => lhs.start_time.cmp(&rhs.start_time),
			Self::EndDate => compare_dates(lhs.end_date, rhs.end_date),
			Self::EndTime => lhs.end_time.cmp(&rhs.end_time),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortSpec {
	orderings: Vec<(SortColumn, SortDirection)>,
}
impl SortSpec {
	pub fn new(field: SortField, direction: SortDirection) -> Self {
		Self { orderings: field.columns().iter().map(|column| (*column, direction)).collect() }
	}

	/// Resolves loosely typed sort settings with the documented fallbacks.
	pub fn resolve(direction: &str, field: &str) -> Self {
		Self::new(SortField::parse(field), SortDirection::parse(direction))
	}

	pub fn orderings(&self) -> &[(SortColumn, SortDirection)] {
		&self.orderings
	}

	pub fn compare(&self, lhs: &IndexEntry, rhs: &IndexEntry) -> Ordering {
		for (column, direction) in &self.orderings {
			let ordering = match direction {
				SortDirection::Ascending => column.compare(lhs, rhs),
				SortDirection::Descending => column.compare(lhs, rhs).reverse(),
			};

			if ordering != Ordering::Equal {
				return ordering;
			}
		}

		Ordering::Equal
	}

	pub fn sort(&self, entries: &mut [IndexEntry]) {
		entries.sort_by(|lhs, rhs| self.compare(lhs, rhs));
	}
}
impl Default for SortSpec {
	fn default() -> Self {
		Self::new(SortField::Start, SortDirection::Ascending)
	}
}

fn compare_dates(lhs: Option<Date>, rhs: Option<Date>) -> Ordering {
	match (lhs, rhs) {
		(Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Greater,
		(Some(_), None) => Ordering::Less,
	}
}

#[cfg(test)]
mod tests {
	use time::{Date, macros::date};

	use crate::{
		entry::IndexEntry,
		sort::{SortColumn, SortDirection, SortField, SortSpec},
	};

	fn entry(uid: i64, start: Date, start_time: i32, end: Option<Date>) -> IndexEntry {
		IndexEntry {
			uid,
			pid: 1,
			foreign_table: "tx_events".to_string(),
			foreign_uid: 1,
			unique_register_key: "Event".to_string(),
			start_date: Some(start),
			start_time,
			end_date: end,
			end_time: 0,
			all_day: false,
			sys_language_uid: 0,
		}
	}

	#[test]
	fn default_is_start_ascending() {
		assert_eq!(SortSpec::default().orderings(), &[
			(SortColumn::StartDate, SortDirection::Ascending),
			(SortColumn::StartTime, SortDirection::Ascending),
		]);
	}

	#[test]
	fn with_range_last_expands_to_three_columns() {
		let spec = SortSpec::resolve("ASC", "withrangelast");

		assert_eq!(spec.orderings(), &[
			(SortColumn::EndDate, SortDirection::Ascending),
			(SortColumn::StartDate, SortDirection::Ascending),
			(SortColumn::StartTime, SortDirection::Ascending),
		]);
	}

	#[test]
	fn unknown_values_fall_back() {
		assert_eq!(SortField::parse("title"), SortField::Start);
		assert_eq!(SortField::parse("end"), SortField::End);
		assert_eq!(SortDirection::parse("sideways"), SortDirection::Descending);
		assert_eq!(SortDirection::parse(""), SortDirection::Descending);
		assert_eq!(SortDirection::parse("asc"), SortDirection::Ascending);
	}

	#[test]
	fn sorts_by_date_then_time() {
		let mut entries = vec![
			entry(1, date!(2024 - 03 - 12), 0, None),
			entry(2, date!(2024 - 03 - 11), 3_600, None),
			entry(3, date!(2024 - 03 - 11), 0, None),
		];

		SortSpec::default().sort(&mut entries);

		assert_eq!(entries.iter().map(|entry| entry.uid).collect::<Vec<_>>(), vec![3, 2, 1]);

		SortSpec::new(SortField::Start, SortDirection::Descending).sort(&mut entries);

		assert_eq!(entries.iter().map(|entry| entry.uid).collect::<Vec<_>>(), vec![1, 2, 3]);
	}

	#[test]
	fn missing_end_dates_sort_last_ascending() {
		let mut entries = vec![
			entry(1, date!(2024 - 03 - 11), 0, None),
			entry(2, date!(2024 - 03 - 11), 0, Some(date!(2024 - 03 - 20))),
		];

		SortSpec::new(SortField::End, SortDirection::Ascending).sort(&mut entries);

		assert_eq!(entries[0].uid, 2);
	}
}
