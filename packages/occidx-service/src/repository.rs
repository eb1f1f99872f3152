use std::sync::Arc;

use time::{OffsetDateTime, UtcOffset};

use occidx_config::Config;
use occidx_domain::{
	CalendarUnit, IndexEntry, LanguageSelection, ScopeTypeGroup, SortDirection, SortSpec,
	TimeWindow,
};

use crate::{
	Error, Result,
	clock::Clock,
	filter::{ContentRecord, FilterContext, Hooks},
	owner::{OwnerRef, TypeRegistry},
	query::{IndexQuery, IndexResult, ListRequest, ListStart, SearchRequest, Traversal},
	store::IndexStore,
};

/// Construction-time collaborators of an [`IndexRepository`].
#[derive(Clone, Default)]
pub struct RepositoryOptions {
	/// Takes precedence over every configured scope source when non-empty.
	pub override_scopes: Vec<i64>,
	pub clock: Clock,
	pub hooks: Hooks,
	pub registry: TypeRegistry,
	pub content_record: Option<ContentRecord>,
}

/// Retrieval API over the occurrence index. Scopes and language are resolved once, here.
pub struct IndexRepository {
	query: IndexQuery,
	scopes: Vec<i64>,
	index_types: Vec<String>,
	traversal_limit: u32,
	week_start: u8,
	list_start: ListStart,
	list_start_offset_hours: i64,
}
impl IndexRepository {
	pub fn new(
		cfg: &Config,
		store: Arc<dyn IndexStore>,
		options: RepositoryOptions,
	) -> Result<Self> {
		let offset = UtcOffset::from_whole_seconds(cfg.calendar.utc_offset_seconds).map_err(|err| {
			Error::Validation {
				message: format!(
					"calendar.utc_offset_seconds {} is not a valid offset: {err}.",
					cfg.calendar.utc_offset_seconds
				),
			}
		})?;
		let scopes = resolve_scopes(&options.override_scopes, cfg);
		let language =
			LanguageSelection::new(cfg.index.language_mode.as_str(), cfg.index.language_uid);
		let mut query = IndexQuery::new(store, offset)
			.with_clock(options.clock)
			.with_language(language)
			.with_hooks(options.hooks)
			.with_registry(options.registry)
			.with_content_record(options.content_record);

		if cfg.index.default_sort_field.is_some() || cfg.index.default_sort_direction.is_some() {
			query.set_default_sort(SortSpec::resolve(
				cfg.index.default_sort_direction.as_deref().unwrap_or("asc"),
				cfg.index.default_sort_field.as_deref().unwrap_or_default(),
			));
		}

		tracing::debug!(
			scopes = ?scopes,
			language_mode = query.language().mode.as_str(),
			"Index repository configured."
		);

		Ok(Self {
			query,
			scopes,
			index_types: Vec::new(),
			traversal_limit: cfg.index.traversal_limit,
			week_start: cfg.calendar.week_start,
			list_start: ListStart::parse(&cfg.list.start_time),
			list_start_offset_hours: cfg.list.start_offset_hours,
		})
	}

	pub fn scopes(&self) -> &[i64] {
		&self.scopes
	}

	pub fn language(&self) -> &LanguageSelection {
		self.query.language()
	}

	pub fn query(&self) -> &IndexQuery {
		&self.query
	}

	/// Type tags every filtered lookup is restricted to; empty means all types.
	pub fn set_index_types<I, S>(&mut self, types: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.index_types = types.into_iter().map(Into::into).collect();
	}

	pub fn set_default_sorting(&mut self, direction: &str, field: &str) {
		self.query.set_default_sort(SortSpec::resolve(direction, field));
	}

	pub fn find_by_window(
		&self,
		window: &TimeWindow,
		limit: u32,
		sort: Option<SortSpec>,
	) -> Result<IndexResult> {
		self.query.by_window(window, self.filters(), limit, sort)
	}

	pub fn find_by_calendar_unit(&self, unit: CalendarUnit) -> Result<IndexResult> {
		self.query.by_calendar_unit(unit, self.filters())
	}

	pub fn find_day(&self, year: i32, month: u8, day: u8) -> Result<IndexResult> {
		self.find_by_calendar_unit(CalendarUnit::Day { year, month, day })
	}

	/// ISO week shifted by the configured week start.
	pub fn find_week(&self, year: i32, week: u8) -> Result<IndexResult> {
		self.find_by_calendar_unit(CalendarUnit::Week { year, week, week_start: self.week_start })
	}

	pub fn find_month(&self, year: i32, month: u8) -> Result<IndexResult> {
		self.find_by_calendar_unit(CalendarUnit::Month { year, month })
	}

	pub fn find_quarter(&self, year: i32, quarter: u8) -> Result<IndexResult> {
		self.find_by_calendar_unit(CalendarUnit::Quarter { year, quarter })
	}

	pub fn find_year(&self, year: i32) -> Result<IndexResult> {
		self.find_by_calendar_unit(CalendarUnit::Year { year })
	}

	/// `limit` falls back to the configured traversal limit.
	pub fn find_by_traversal(
		&self,
		entry: &IndexEntry,
		traversal: Traversal,
		limit: Option<u32>,
		sort: SortDirection,
		use_entry_time: bool,
	) -> Result<IndexResult> {
		self.query.by_traversal_from(
			entry,
			traversal,
			limit.unwrap_or(self.traversal_limit),
			sort,
			use_entry_time,
		)
	}

	pub fn find_by_owner_traversal(
		&self,
		owner: &OwnerRef,
		traversal: Traversal,
		limit: Option<u32>,
		sort: SortDirection,
	) -> Result<IndexResult> {
		self.query.by_owning_object(owner, traversal, limit.unwrap_or(self.traversal_limit), sort)
	}

	pub fn find_by_owner(&self, owner: &OwnerRef) -> Result<IndexResult> {
		self.query.by_owner_all(owner, self.filters())
	}

	pub fn find_past(&self, limit: u32, sort: SortDirection) -> Result<IndexResult> {
		self.query.past_entries(self.filters(), limit, sort)
	}

	/// Upcoming entries using the configured list start.
	pub fn find_list(
		&self,
		limit: u32,
		override_start: Option<OffsetDateTime>,
		override_end: Option<OffsetDateTime>,
	) -> Result<IndexResult> {
		let request = ListRequest {
			limit,
			start: self.list_start,
			start_offset_hours: self.list_start_offset_hours,
			override_start,
			override_end,
		};

		self.query.list(self.filters(), &request)
	}

	pub fn find_by_search(&self, request: SearchRequest) -> Result<IndexResult> {
		self.query.search(self.filters(), request)
	}

	pub fn find_all_for_admin(&self) -> IndexResult {
		self.query.admin_listing()
	}

	pub async fn find_types_and_scopes(&self) -> Result<Vec<ScopeTypeGroup>> {
		self.query.distinct_types_and_scopes().await
	}

	fn filters(&self) -> FilterContext {
		FilterContext::new()
			.with_type_keys(self.index_types.iter().map(String::as_str))
			.with_scopes(self.scopes.iter().copied())
	}
}

/// Override list, then configured storage pids, then the host backend default.
pub fn resolve_scopes(override_scopes: &[i64], cfg: &Config) -> Vec<i64> {
	if !override_scopes.is_empty() {
		return override_scopes.to_vec();
	}
	if !cfg.scopes.storage_pids.is_empty() {
		return cfg.scopes.storage_pids.clone();
	}

	cfg.scopes.backend_defaults()
}
