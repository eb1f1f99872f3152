use std::{collections::BTreeMap, sync::Arc};

use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use occidx_domain::{
	CalendarUnit, Constraint, Field, IndexEntry, IntervalConvention, LanguageSelection,
	OverlapPredicateBuilder, ScopeTypeGroup, SortDirection, SortField, SortSpec, StorageQuery,
	TimeWindow, calendar,
};

use crate::{
	Error, Result,
	clock::Clock,
	filter::{ContentRecord, FilterContext, Hooks, PreFilterRequest},
	owner::{OwnerRef, TypeRegistry},
	store::IndexStore,
};

const SECONDS_PER_HOUR: i64 = 3_600;

/// Which side of the reference instant a traversal may return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Traversal {
	pub future: bool,
	pub past: bool,
}
impl Traversal {
	pub const BOTH: Self = Self { future: true, past: true };
	pub const FUTURE: Self = Self { future: true, past: false };
	pub const PAST: Self = Self { future: false, past: true };

	pub fn is_empty(&self) -> bool {
		!self.future && !self.past
	}

	/// Both directions allowed, so no reference instant is involved.
	pub fn is_unrestricted(&self) -> bool {
		self.future && self.past
	}

	fn constraint(&self, reference: PrimitiveDateTime) -> Option<Constraint> {
		let mut nodes = Vec::with_capacity(2);

		if !self.future {
			nodes.push(Constraint::less_or_equal(Field::StartDate, reference));
		}
		if !self.past {
			nodes.push(Constraint::greater_or_equal(Field::StartDate, reference));
		}

		Constraint::all(nodes)
	}
}
impl Default for Traversal {
	fn default() -> Self {
		Self::FUTURE
	}
}

/// Where an upcoming-entries list starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListStart {
	Now,
	/// Start of the current day.
	#[default]
	Day,
}
impl ListStart {
	pub fn parse(raw: &str) -> Self {
		if raw.trim() == "now" { Self::Now } else { Self::Day }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRequest {
	/// Zero returns every entry.
	pub limit: u32,
	pub start: ListStart,
	pub start_offset_hours: i64,
	/// Replaces the computed start when set.
	pub override_start: Option<OffsetDateTime>,
	/// The list is open-ended unless set.
	pub override_end: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchRequest {
	pub start_date: Option<OffsetDateTime>,
	pub end_date: Option<OffsetDateTime>,
	pub custom_search: BTreeMap<String, String>,
	pub limit: u32,
}

/// Composes overlap, categorical and directional constraints into storage queries.
pub struct IndexQuery {
	store: Arc<dyn IndexStore>,
	overlap: OverlapPredicateBuilder,
	clock: Clock,
	language: LanguageSelection,
	default_sort: SortSpec,
	hooks: Hooks,
	registry: TypeRegistry,
	content_record: Option<ContentRecord>,
}
impl IndexQuery {
	pub fn new(store: Arc<dyn IndexStore>, offset: UtcOffset) -> Self {
		Self {
			store,
			overlap: OverlapPredicateBuilder::new(IntervalConvention::with_offset(offset)),
			clock: Clock::default(),
			language: LanguageSelection::default(),
			default_sort: SortSpec::default(),
			hooks: Hooks::default(),
			registry: TypeRegistry::default(),
			content_record: None,
		}
	}

	pub fn with_clock(mut self, clock: Clock) -> Self {
		self.clock = clock;

		self
	}

	pub fn with_language(mut self, language: LanguageSelection) -> Self {
		self.language = language;

		self
	}

	pub fn with_hooks(mut self, hooks: Hooks) -> Self {
		self.hooks = hooks;

		self
	}

	pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
		self.registry = registry;

		self
	}

	pub fn with_content_record(mut self, content_record: Option<ContentRecord>) -> Self {
		self.content_record = content_record;

		self
	}

	pub fn set_default_sort(&mut self, sort: SortSpec) {
		self.default_sort = sort;
	}

	pub fn default_sort(&self) -> &SortSpec {
		&self.default_sort
	}

	pub fn language(&self) -> &LanguageSelection {
		&self.language
	}

	pub fn offset(&self) -> UtcOffset {
		self.overlap.convention().offset
	}

	pub fn now(&self) -> OffsetDateTime {
		self.clock.now()
	}

	/// Entries overlapping `window`. A `limit` of zero is unbounded; `sort` falls back to the
	/// default ordering.
	pub fn by_window(
		&self,
		window: &TimeWindow,
		filters: FilterContext,
		limit: u32,
		sort: Option<SortSpec>,
	) -> Result<IndexResult> {
		let temporal = self.overlap.build(window, self.now())?;
		let filters = self.apply_default_hooks(filters);

		Ok(self.compose(
			&filters,
			temporal.into_iter().collect(),
			sort.unwrap_or_else(|| self.default_sort.clone()),
			limit,
		))
	}

	pub fn by_calendar_unit(
		&self,
		unit: CalendarUnit,
		filters: FilterContext,
	) -> Result<IndexResult> {
		let window = unit.window(self.offset())?;

		self.by_window(&window, filters, 0, None)
	}

	/// Other occurrences of the entry's owner, never the entry itself.
	pub fn by_traversal_from(
		&self,
		entry: &IndexEntry,
		traversal: Traversal,
		limit: u32,
		sort: SortDirection,
		use_entry_time: bool,
	) -> Result<IndexResult> {
		if traversal.is_empty() {
			tracing::debug!(uid = entry.uid, "Traversal excludes both directions.");

			return Ok(self.empty());
		}

		let mut constraints = vec![
			Constraint::not_equals(Field::Uid, entry.uid),
			Constraint::equals(Field::ForeignTable, entry.foreign_table.as_str()),
			Constraint::equals(Field::ForeignUid, entry.foreign_uid),
		];

		if !traversal.is_unrestricted() {
			let reference = if use_entry_time {
				entry.start_date.map(|date| date.midnight()).ok_or_else(|| Error::Validation {
					message: format!("entry {} has no start date to traverse from.", entry.uid),
				})?
			} else {
				self.wall_clock_now()?
			};

			constraints.extend(traversal.constraint(reference));
		}

		Ok(self.compose(
			&FilterContext::new(),
			constraints,
			SortSpec::new(SortField::Start, sort),
			limit,
		))
	}

	/// Occurrences of `owner` on the requested side of now.
	pub fn by_owning_object(
		&self,
		owner: &OwnerRef,
		traversal: Traversal,
		limit: u32,
		sort: SortDirection,
	) -> Result<IndexResult> {
		if traversal.is_empty() {
			tracing::debug!(
				kind = owner.kind.as_str(),
				uid = owner.uid,
				"Traversal excludes both directions."
			);

			return Ok(self.empty());
		}

		let key = self.registry.unique_register_key(owner)?;
		let mut constraints = vec![Constraint::equals(Field::ForeignUid, owner.select_uid())];

		if !traversal.is_unrestricted() {
			constraints.extend(traversal.constraint(self.wall_clock_now()?));
		}

		Ok(self.compose(
			&FilterContext::new().with_type_keys([key]),
			constraints,
			SortSpec::new(SortField::Start, sort),
			limit,
		))
	}

	/// Every occurrence of `owner` within the filtered scopes.
	pub fn by_owner_all(&self, owner: &OwnerRef, filters: FilterContext) -> Result<IndexResult> {
		let key = self.registry.unique_register_key(owner)?;
		let filters = self.apply_default_hooks(filters.with_type_keys([key]));

		Ok(self.compose(
			&filters,
			vec![Constraint::equals(Field::ForeignUid, owner.uid)],
			self.default_sort.clone(),
			0,
		))
	}

	/// Entries that started at or before now.
	pub fn past_entries(
		&self,
		filters: FilterContext,
		limit: u32,
		sort: SortDirection,
	) -> Result<IndexResult> {
		let reference = self.wall_clock_now()?;
		let filters = self.apply_default_hooks(filters);

		Ok(self.compose(
			&filters,
			vec![Constraint::less_or_equal(Field::StartDate, reference)],
			SortSpec::new(SortField::Start, sort),
			limit,
		))
	}

	/// Upcoming entries from now or the start of today, shifted by whole hours.
	pub fn list(&self, filters: FilterContext, request: &ListRequest) -> Result<IndexResult> {
		let start = match request.override_start {
			Some(start) => start,
			None => {
				let now = self.wall_clock_now()?.assume_offset(self.offset());
				let base = match request.start {
					ListStart::Now => now,
					ListStart::Day => calendar::day_start(now.date(), self.offset()),
				};

				request
					.start_offset_hours
					.checked_mul(SECONDS_PER_HOUR)
					.and_then(|seconds| base.checked_add(Duration::seconds(seconds)))
					.ok_or_else(|| Error::Validation {
						message: format!(
							"list start offset of {} hours is out of range.",
							request.start_offset_hours
						),
					})?
			},
		};
		let window = TimeWindow::make(Some(start), request.override_end)?;

		self.by_window(&window, filters, request.limit, None)
	}

	/// Search across an optional day range. Pre-filter providers may restrict the owners or the
	/// range, or force an empty result.
	pub fn search(&self, filters: FilterContext, request: SearchRequest) -> Result<IndexResult> {
		let mut filters = filters;
		let pre_request = PreFilterRequest {
			index_ids: Vec::new(),
			start_date: request.start_date,
			end_date: request.end_date,
			custom_search: request.custom_search,
			index_types: filters.type_keys().to_vec(),
			empty_pre_result: false,
		};
		let pre = filters.run_pre_filter_hook(&self.hooks.pre_filter, pre_request);
		let filters = self.apply_default_hooks(filters);
		let offset = self.offset();
		let start = pre
			.start_date
			.map(|start| local_date(start, offset).map(|date| calendar::day_start(date, offset)))
			.transpose()?;
		let end = pre
			.end_date
			.map(|end| -> Result<OffsetDateTime> {
				Ok(calendar::day_end(local_date(end, offset)?, offset)?)
			})
			.transpose()?;
		let window = TimeWindow::make(start, end)?;
		let temporal = self.overlap.build(&window, self.now())?;

		Ok(self.compose(
			&filters,
			temporal.into_iter().collect(),
			self.default_sort.clone(),
			request.limit,
		))
	}

	/// Every entry in every language, without scope or type restrictions.
	pub fn admin_listing(&self) -> IndexResult {
		IndexResult::new(
			self.store.clone(),
			StorageQuery::new(None, self.default_sort.clone(), LanguageSelection::ignore()),
		)
	}

	pub async fn distinct_types_and_scopes(&self) -> Result<Vec<ScopeTypeGroup>> {
		self.store.distinct_scope_types().await
	}

	fn apply_default_hooks(&self, mut filters: FilterContext) -> FilterContext {
		filters.run_narrowing_hook(&self.hooks.narrowing, self.content_record.as_ref());

		filters
	}

	fn compose(
		&self,
		filters: &FilterContext,
		mut constraints: Vec<Constraint>,
		sort: SortSpec,
		limit: u32,
	) -> IndexResult {
		if filters.is_forced_empty() {
			tracing::debug!("Filter context forced an empty result.");

			return self.empty();
		}

		let mut nodes = filters.build_constraints();

		nodes.append(&mut constraints);

		let query = StorageQuery::new(Constraint::all(nodes), sort, self.language.clone())
			.with_limit(limit);

		IndexResult::new(self.store.clone(), query)
	}

	fn empty(&self) -> IndexResult {
		IndexResult { store: self.store.clone(), query: None }
	}

	fn wall_clock_now(&self) -> Result<PrimitiveDateTime> {
		Ok(occidx_domain::to_wall_clock(self.now(), self.offset())?)
	}
}

fn local_date(instant: OffsetDateTime, offset: UtcOffset) -> Result<Date> {
	Ok(occidx_domain::to_wall_clock(instant, offset)?.date())
}

/// Lazy, restartable result sequence. Nothing runs until [`IndexResult::fetch`].
#[derive(Clone)]
pub struct IndexResult {
	store: Arc<dyn IndexStore>,
	/// `None` when the result is empty by policy.
	query: Option<StorageQuery>,
}
impl IndexResult {
	fn new(store: Arc<dyn IndexStore>, query: StorageQuery) -> Self {
		Self { store, query: Some(query) }
	}

	pub fn query(&self) -> Option<&StorageQuery> {
		self.query.as_ref()
	}

	pub fn is_empty_by_policy(&self) -> bool {
		self.query.is_none()
	}

	/// Same query with another limit; zero removes it.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.query = self.query.take().map(|query| query.with_limit(limit));

		self
	}

	pub async fn fetch(&self) -> Result<Vec<IndexEntry>> {
		let Some(query) = self.query.as_ref() else {
			tracing::debug!("Index result is empty by policy. Skipping storage.");

			return Ok(Vec::new());
		};

		tracing::debug!(
			query = %query.describe(),
			limit = ?query.limit,
			language_mode = query.language.mode.as_str(),
			"Executing index query."
		);

		self.store.fetch(query).await
	}
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use occidx_domain::{Constraint, Field};

	use crate::query::{ListStart, Traversal};

	#[test]
	fn traversal_directions() {
		let reference = datetime!(2024-03-11 00:00);

		assert!(Traversal { future: false, past: false }.is_empty());
		assert!(Traversal::BOTH.is_unrestricted());
		assert!(!Traversal::PAST.is_unrestricted());
		assert_eq!(Traversal::BOTH.constraint(reference), None);
		assert_eq!(
			Traversal::FUTURE.constraint(reference),
			Some(Constraint::greater_or_equal(Field::StartDate, reference))
		);
		assert_eq!(
			Traversal::PAST.constraint(reference),
			Some(Constraint::less_or_equal(Field::StartDate, reference))
		);
	}

	#[test]
	fn list_start_only_recognizes_now() {
		assert_eq!(ListStart::parse("now"), ListStart::Now);
		assert_eq!(ListStart::parse("day"), ListStart::Day);
		assert_eq!(ListStart::parse("0"), ListStart::Day);
	}
}
