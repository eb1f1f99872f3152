use time::{Date, Duration, Month, OffsetDateTime, UtcOffset, Weekday};

use crate::{Error, Result, window::TimeWindow};

/// Named calendar span anchored on a date. Each resolves to `[first second, last second]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalendarUnit {
	Day { year: i32, month: u8, day: u8 },
	/// ISO week; `week_start` shifts the first day (0 = Sunday, 1 = Monday, ... 6 = Saturday).
	Week { year: i32, week: u8, week_start: u8 },
	Month { year: i32, month: u8 },
	Quarter { year: i32, quarter: u8 },
	Year { year: i32 },
}
impl CalendarUnit {
	pub fn window(&self, offset: UtcOffset) -> Result<TimeWindow> {
		let (first, next) = self.date_span()?;
		let start = first.midnight().assume_offset(offset);
		let end = next.midnight().assume_offset(offset) - Duration::SECOND;

		TimeWindow::make(Some(start), Some(end))
	}

	/// First day of the span and first day after it.
	fn date_span(&self) -> Result<(Date, Date)> {
		match *self {
			Self::Day { year, month, day } => {
				let first = calendar_date(year, month, day)?;

				Ok((first, next_day(first)?))
			},
			Self::Week { year, week, week_start } => {
				if week_start > 6 {
					return Err(Error::Validation {
						message: format!("week start {week_start} must be in the range 0-6."),
					});
				}

				let monday =
					Date::from_iso_week_date(year, week, Weekday::Monday).map_err(|err| {
						Error::Validation {
							message: format!("invalid ISO week {year}-W{week}: {err}."),
						}
					})?;
				let first = shift(monday, Duration::days(i64::from(week_start) - 1))?;

				Ok((first, shift(first, Duration::weeks(1))?))
			},
			Self::Month { year, month } => {
				let first = calendar_date(year, month, 1)?;

				Ok((first, first_of_following_month(first)?))
			},
			Self::Quarter { year, quarter } => {
				if !(1..=4).contains(&quarter) {
					return Err(Error::Validation {
						message: format!("quarter {quarter} must be in the range 1-4."),
					});
				}

				let first = calendar_date(year, 1 + 3 * (quarter - 1), 1)?;
				let mut next = first;

				for _ in 0..3 {
					next = first_of_following_month(next)?;
				}

				Ok((first, next))
			},
			Self::Year { year } => {
				let first = calendar_date(year, 1, 1)?;
				let next = calendar_date(year.saturating_add(1), 1, 1)?;

				Ok((first, next))
			},
		}
	}
}

/// Midnight opening `date` in `offset`.
pub fn day_start(date: Date, offset: UtcOffset) -> OffsetDateTime {
	date.midnight().assume_offset(offset)
}

/// Last second of `date` in `offset`.
pub fn day_end(date: Date, offset: UtcOffset) -> Result<OffsetDateTime> {
	let next = next_day(date)?;

	Ok(day_start(next, offset) - Duration::SECOND)
}

fn calendar_date(year: i32, month: u8, day: u8) -> Result<Date> {
	let month = Month::try_from(month).map_err(|_| Error::Validation {
		message: format!("month {month} must be in the range 1-12."),
	})?;

	Date::from_calendar_date(year, month, day).map_err(|err| Error::Validation {
		message: format!("invalid calendar date {year}-{month}-{day}: {err}."),
	})
}

fn first_of_following_month(first: Date) -> Result<Date> {
	let (year, month) = match first.month() {
		Month::December => (first.year().saturating_add(1), Month::January),
		month => (first.year(), month.next()),
	};

	Date::from_calendar_date(year, month, 1).map_err(|err| Error::Validation {
		message: format!("month after {first} is out of range: {err}."),
	})
}

fn shift(date: Date, by: Duration) -> Result<Date> {
	date.checked_add(by).ok_or_else(|| Error::Validation {
		message: format!("{date} shifted by {by} is out of range."),
	})
}

fn next_day(date: Date) -> Result<Date> {
	date.next_day()
		.ok_or_else(|| Error::Validation { message: format!("day after {date} is out of range.") })
}

#[cfg(test)]
mod tests {
	use time::{
		UtcOffset,
		macros::{date, datetime},
	};

	use crate::{
		Error,
		calendar::{self, CalendarUnit},
	};

	fn bounds(unit: CalendarUnit) -> (time::OffsetDateTime, time::OffsetDateTime) {
		let window = unit.window(UtcOffset::UTC).expect("valid unit");

		(window.start().expect("start"), window.end().expect("end"))
	}

	#[test]
	fn iso_week_starting_monday() {
		assert_eq!(
			bounds(CalendarUnit::Week { year: 2024, week: 11, week_start: 1 }),
			(datetime!(2024-03-11 00:00 UTC), datetime!(2024-03-17 23:59:59 UTC))
		);
	}

	#[test]
	fn week_start_shifts_first_day() {
		assert_eq!(
			bounds(CalendarUnit::Week { year: 2024, week: 11, week_start: 0 }),
			(datetime!(2024-03-10 00:00 UTC), datetime!(2024-03-16 23:59:59 UTC))
		);
		assert_eq!(
			bounds(CalendarUnit::Week { year: 2024, week: 11, week_start: 6 }),
			(datetime!(2024-03-16 00:00 UTC), datetime!(2024-03-22 23:59:59 UTC))
		);
	}

	#[test]
	fn month_ends_one_second_before_next_month() {
		assert_eq!(
			bounds(CalendarUnit::Month { year: 2024, month: 2 }),
			(datetime!(2024-02-01 00:00 UTC), datetime!(2024-02-29 23:59:59 UTC))
		);
		assert_eq!(
			bounds(CalendarUnit::Month { year: 2023, month: 12 }),
			(datetime!(2023-12-01 00:00 UTC), datetime!(2023-12-31 23:59:59 UTC))
		);
	}

	#[test]
	fn quarter_spans_three_months() {
		assert_eq!(
			bounds(CalendarUnit::Quarter { year: 2024, quarter: 4 }),
			(datetime!(2024-10-01 00:00 UTC), datetime!(2024-12-31 23:59:59 UTC))
		);
	}

	#[test]
	fn year_and_day() {
		assert_eq!(
			bounds(CalendarUnit::Year { year: 2024 }),
			(datetime!(2024-01-01 00:00 UTC), datetime!(2024-12-31 23:59:59 UTC))
		);
		assert_eq!(
			bounds(CalendarUnit::Day { year: 2024, month: 3, day: 10 }),
			(datetime!(2024-03-10 00:00 UTC), datetime!(2024-03-10 23:59:59 UTC))
		);
	}

	#[test]
	fn offset_anchors_local_midnight() {
		let offset = UtcOffset::from_hms(2, 0, 0).expect("valid offset");
		let window =
			CalendarUnit::Day { year: 2024, month: 3, day: 10 }.window(offset).expect("valid unit");

		assert_eq!(window.start(), Some(datetime!(2024-03-10 00:00 +2)));
		assert_eq!(window.end(), Some(datetime!(2024-03-10 23:59:59 +2)));
	}

	#[test]
	fn rejects_invalid_anchors() {
		let invalid = [
			CalendarUnit::Month { year: 2024, month: 13 },
			CalendarUnit::Quarter { year: 2024, quarter: 0 },
			CalendarUnit::Week { year: 2023, week: 53, week_start: 1 },
			CalendarUnit::Week { year: 2024, week: 11, week_start: 7 },
			CalendarUnit::Week { year: 9999, week: 52, week_start: 1 },
			CalendarUnit::Week { year: -9999, week: 1, week_start: 0 },
			CalendarUnit::Day { year: 2023, month: 2, day: 29 },
		];

		for unit in invalid {
			assert!(
				matches!(unit.window(UtcOffset::UTC), Err(Error::Validation { .. })),
				"{unit:?}"
			);
		}
	}

	#[test]
	fn day_end_is_last_second() {
		assert_eq!(
			calendar::day_end(date!(2024 - 02 - 29), UtcOffset::UTC).expect("in range"),
			datetime!(2024-02-29 23:59:59 UTC)
		);
		assert!(matches!(
			calendar::day_end(date!(9999 - 12 - 31), UtcOffset::UTC),
			Err(Error::Validation { .. })
		));
	}
}
