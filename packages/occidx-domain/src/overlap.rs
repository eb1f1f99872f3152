//! Interval overlap as a disjunction of four mutually exclusive geometries.
//!
//! With probe bounds `S` and `E` an entry `[start, end]` is selected by one of:
//!
//! - before-in: `start < S`, `S <= end < E`
//! - in-in: `start >= S`, `end < E`
//! - in-after: `S <= start < E`, `end >= E`
//! - before-after: `start < S`, `end > E`
//!
//! The upper probe is half-open in the first three cases and strict in the last one, so an entry
//! that starts before `S` and ends exactly at `E`, or starts exactly at `E`, is not selected.

use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{
	Error, Result,
	constraint::{Constraint, Field},
	window::TimeWindow,
};

/// Distance of a synthesized probe from now when the window leaves a side open.
pub const PROBE_SPAN: Duration = Duration::days(3_650);

/// How the index stores an interval: the start and end columns and the offset their dates were
/// written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntervalConvention {
	pub start: Field,
	pub end: Field,
	pub offset: UtcOffset,
}
impl IntervalConvention {
	pub fn with_offset(offset: UtcOffset) -> Self {
		Self { offset, ..Self::default() }
	}
}
impl Default for IntervalConvention {
	fn default() -> Self {
		Self { start: Field::StartDate, end: Field::EndDate, offset: UtcOffset::UTC }
	}
}

/// Finite wall-clock probes derived from a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeBounds {
	pub start: PrimitiveDateTime,
	pub end: PrimitiveDateTime,
}
impl ProbeBounds {
	/// `None` for an unbounded window; an open side is replaced by now -/+ [`PROBE_SPAN`].
	pub fn resolve(
		window: &TimeWindow,
		now: OffsetDateTime,
		offset: UtcOffset,
	) -> Result<Option<Self>> {
		let (start, end) = match (window.start(), window.end()) {
			(None, None) => return Ok(None),
			(None, Some(end)) => (synthesize(now.checked_sub(PROBE_SPAN), now)?, end),
			(Some(start), None) => (start, synthesize(now.checked_add(PROBE_SPAN), now)?),
			(Some(start), Some(end)) => (start, end),
		};

		Ok(Some(Self {
			start: crate::to_wall_clock(start, offset)?,
			end: crate::to_wall_clock(end, offset)?,
		}))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OverlapCase {
	BeforeIn,
	InIn,
	InAfter,
	BeforeAfter,
}
impl OverlapCase {
	pub const ALL: [Self; 4] = [Self::BeforeIn, Self::InIn, Self::InAfter, Self::BeforeAfter];

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::BeforeIn => "before_in",
			Self::InIn => "in_in",
			Self::InAfter => "in_after",
			Self::BeforeAfter => "before_after",
		}
	}

	pub fn constraint(&self, convention: &IntervalConvention, bounds: &ProbeBounds) -> Constraint {
		let IntervalConvention { start, end, .. } = *convention;
		let ProbeBounds { start: probe_start, end: probe_end } = *bounds;
		let nodes = match self {
			Self::BeforeIn => vec![
				Constraint::less_than(start, probe_start),
				Constraint::greater_or_equal(end, probe_start),
				Constraint::less_than(end, probe_end),
			],
			Self::InIn => vec![
				Constraint::greater_or_equal(start, probe_start),
				Constraint::less_than(end, probe_end),
			],
			Self::InAfter => vec![
				Constraint::greater_or_equal(start, probe_start),
				Constraint::less_than(start, probe_end),
				Constraint::greater_or_equal(end, probe_end),
			],
			Self::BeforeAfter => vec![
				Constraint::less_than(start, probe_start),
				Constraint::greater_than(end, probe_end),
			],
		};

		Constraint::And(nodes)
	}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OverlapPredicateBuilder {
	convention: IntervalConvention,
}
impl OverlapPredicateBuilder {
	pub fn new(convention: IntervalConvention) -> Self {
		Self { convention }
	}

	pub fn convention(&self) -> &IntervalConvention {
		&self.convention
	}

	pub fn probes(&self, window: &TimeWindow, now: OffsetDateTime) -> Result<Option<ProbeBounds>> {
		ProbeBounds::resolve(window, now, self.convention.offset)
	}

	/// Overlap constraint for `window`, or `None` when the window is unbounded on both sides.
	pub fn build(&self, window: &TimeWindow, now: OffsetDateTime) -> Result<Option<Constraint>> {
		Ok(self.probes(window, now)?.map(|bounds| self.build_for(&bounds)))
	}

	pub fn build_for(&self, bounds: &ProbeBounds) -> Constraint {
		Constraint::Or(
			OverlapCase::ALL.iter().map(|case| case.constraint(&self.convention, bounds)).collect(),
		)
	}
}

fn synthesize(probe: Option<OffsetDateTime>, now: OffsetDateTime) -> Result<OffsetDateTime> {
	probe.ok_or_else(|| Error::Validation {
		message: format!("probe {PROBE_SPAN} away from {now} is out of range."),
	})
}

#[cfg(test)]
mod tests {
	use time::{
		Date, Duration, UtcOffset,
		macros::{date, datetime},
	};

	use crate::{
		Error,
		entry::IndexEntry,
		overlap::{
			IntervalConvention, OverlapCase, OverlapPredicateBuilder, PROBE_SPAN, ProbeBounds,
		},
		window::TimeWindow,
	};

	fn entry(start: Option<Date>, end: Option<Date>) -> IndexEntry {
		IndexEntry {
			uid: 1,
			pid: 1,
			foreign_table: "tx_events".to_string(),
			foreign_uid: 1,
			unique_register_key: "Event".to_string(),
			start_date: start,
			start_time: 0,
			end_date: end,
			end_time: 0,
			all_day: true,
			sys_language_uid: 0,
		}
	}

	fn week_bounds() -> ProbeBounds {
		ProbeBounds { start: datetime!(2024-03-10 00:00), end: datetime!(2024-03-17 00:00) }
	}

	fn matching_cases(entry: &IndexEntry, bounds: &ProbeBounds) -> Vec<OverlapCase> {
		let convention = IntervalConvention::default();

		OverlapCase::ALL
			.into_iter()
			.filter(|case| case.constraint(&convention, bounds).matches(entry))
			.collect()
	}

	#[test]
	fn classifies_week_scenario() {
		let bounds = week_bounds();
		let cases = [
			(date!(2024 - 03 - 01), date!(2024 - 03 - 12), Some(OverlapCase::BeforeIn)),
			(date!(2024 - 03 - 11), date!(2024 - 03 - 13), Some(OverlapCase::InIn)),
			(date!(2024 - 03 - 15), date!(2024 - 04 - 01), Some(OverlapCase::InAfter)),
			(date!(2024 - 01 - 01), date!(2024 - 12 - 31), Some(OverlapCase::BeforeAfter)),
			(date!(2024 - 04 - 01), date!(2024 - 04 - 05), None),
		];

		for (start, end, expected) in cases {
			let matched = matching_cases(&entry(Some(start), Some(end)), &bounds);

			assert_eq!(matched, expected.into_iter().collect::<Vec<_>>(), "{start}..{end}");
		}
	}

	#[test]
	fn open_ended_entry_only_matches_after_cases() {
		let bounds = week_bounds();
		let starts_inside = entry(Some(date!(2024 - 03 - 12)), None);
		let starts_before = entry(Some(date!(2024 - 02 - 01)), None);
		let starts_after = entry(Some(date!(2024 - 05 - 01)), None);

		assert_eq!(matching_cases(&starts_inside, &bounds), vec![OverlapCase::InAfter]);
		assert_eq!(matching_cases(&starts_before, &bounds), vec![OverlapCase::BeforeAfter]);
		assert!(matching_cases(&starts_after, &bounds).is_empty());
	}

	#[test]
	fn zero_length_entry_inside_window_is_in_in() {
		let day = date!(2024 - 03 - 12);

		assert_eq!(matching_cases(&entry(Some(day), Some(day)), &week_bounds()), vec![
			OverlapCase::InIn
		]);
	}

	#[test]
	fn upper_probe_coincidence_is_preserved() {
		let bounds = week_bounds();
		let ends_at_probe = entry(Some(date!(2024 - 03 - 01)), Some(date!(2024 - 03 - 17)));
		let starts_at_probe = entry(Some(date!(2024 - 03 - 17)), Some(date!(2024 - 03 - 20)));
		let inside_ends_at_probe = entry(Some(date!(2024 - 03 - 12)), Some(date!(2024 - 03 - 17)));

		assert!(matching_cases(&ends_at_probe, &bounds).is_empty());
		assert!(matching_cases(&starts_at_probe, &bounds).is_empty());
		assert_eq!(matching_cases(&inside_ends_at_probe, &bounds), vec![OverlapCase::InAfter]);
	}

	#[test]
	fn unbounded_window_builds_nothing() {
		let builder = OverlapPredicateBuilder::default();
		let constraint = builder
			.build(&TimeWindow::unbounded(), datetime!(2024-03-10 00:00 UTC))
			.expect("in range");

		assert_eq!(constraint, None);
	}

	#[test]
	fn open_sides_use_probe_span() {
		let now = datetime!(2024-03-10 08:00 UTC);
		let open_end = ProbeBounds::resolve(
			&TimeWindow::starting_at(datetime!(2024-03-01 00:00 UTC)),
			now,
			UtcOffset::UTC,
		)
		.expect("in range")
		.expect("bounded");

		assert_eq!(open_end.start, datetime!(2024-03-01 00:00));
		assert_eq!(open_end.end, datetime!(2024-03-10 08:00) + PROBE_SPAN);

		let window =
			TimeWindow::make(None, Some(datetime!(2024-04-01 00:00 UTC))).expect("valid window");
		let open_start =
			ProbeBounds::resolve(&window, now, UtcOffset::UTC).expect("in range").expect("bounded");

		assert_eq!(open_start.start, datetime!(2024-03-10 08:00) - Duration::days(3_650));
		assert_eq!(open_start.end, datetime!(2024-04-01 00:00));
	}

	#[test]
	fn probes_follow_storage_offset() {
		let offset = UtcOffset::from_hms(1, 0, 0).expect("valid offset");
		let window = TimeWindow::make(
			Some(datetime!(2024-03-09 23:00 UTC)),
			Some(datetime!(2024-03-16 22:59:59 UTC)),
		)
		.expect("valid window");
		let bounds = ProbeBounds::resolve(&window, datetime!(2024-03-01 00:00 UTC), offset)
			.expect("in range")
			.expect("bounded");

		assert_eq!(bounds.start, datetime!(2024-03-10 00:00));
		assert_eq!(bounds.end, datetime!(2024-03-16 23:59:59));
	}

	#[test]
	fn builder_emits_four_case_disjunction() {
		let builder = OverlapPredicateBuilder::default();
		let window = TimeWindow::make(
			Some(datetime!(2024-03-10 00:00 UTC)),
			Some(datetime!(2024-03-17 00:00 UTC)),
		)
		.expect("valid window");
		let constraint = builder
			.build(&window, datetime!(2024-03-01 00:00 UTC))
			.expect("in range")
			.expect("bounded window");
		let json = constraint.to_json();
		let args = json["args"].as_array().expect("or args");

		assert_eq!(json["op"], "or");
		assert_eq!(args.len(), 4);
		assert_eq!(args[0]["args"].as_array().map(Vec::len), Some(3));
		assert_eq!(args[1]["args"].as_array().map(Vec::len), Some(2));
		assert_eq!(args[2]["args"].as_array().map(Vec::len), Some(3));
		assert_eq!(args[3]["args"].as_array().map(Vec::len), Some(2));
	}

	#[test]
	fn probes_out_of_range_in_storage_offset_are_rejected() {
		let offset = UtcOffset::from_hms(2, 0, 0).expect("valid offset");
		let builder = OverlapPredicateBuilder::new(IntervalConvention::with_offset(offset));
		let window = TimeWindow::make(
			Some(datetime!(9999-12-31 00:00 UTC)),
			Some(datetime!(9999-12-31 23:30 UTC)),
		)
		.expect("valid window");

		assert!(matches!(
			builder.build(&window, datetime!(2024-03-01 00:00 UTC)),
			Err(Error::Validation { .. })
		));
	}

	#[test]
	fn synthesized_probe_out_of_range_is_rejected() {
		let window = TimeWindow::starting_at(datetime!(9990-01-01 00:00 UTC));

		assert!(matches!(
			ProbeBounds::resolve(&window, datetime!(9995-01-01 00:00 UTC), UtcOffset::UTC),
			Err(Error::Validation { .. })
		));
	}
}
