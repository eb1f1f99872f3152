use serde::{Deserialize, Serialize};

use crate::{
	constraint::{Constraint, Field},
	entry::IndexEntry,
	sort::SortSpec,
};

pub const LANGUAGE_MODE_STRICT: &str = "strict";
pub const LANGUAGE_MODE_IGNORE: &str = "ignore";
/// Language uid of records shown in every language.
pub const LANGUAGE_UID_ALL: i64 = -1;

/// Translation visibility the storage engine applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageSelection {
	pub mode: String,
	pub language_uid: i64,
}
impl LanguageSelection {
	pub fn new(mode: impl Into<String>, language_uid: i64) -> Self {
		Self { mode: mode.into(), language_uid }
	}

	pub fn ignore() -> Self {
		Self::new(LANGUAGE_MODE_IGNORE, 0)
	}

	/// Every mode except `ignore` keeps the current language and all-language records.
	pub fn constraint(&self) -> Option<Constraint> {
		if self.mode == LANGUAGE_MODE_IGNORE {
			return None;
		}

		Some(Constraint::one_of(Field::LanguageUid, [self.language_uid, LANGUAGE_UID_ALL]))
	}
}
impl Default for LanguageSelection {
	fn default() -> Self {
		Self::new(LANGUAGE_MODE_STRICT, 0)
	}
}

/// A composed query as handed to the storage engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageQuery {
	pub constraint: Option<Constraint>,
	pub sort: SortSpec,
	/// `None` returns every matching row.
	pub limit: Option<u32>,
	pub language: LanguageSelection,
}
impl StorageQuery {
	pub fn new(
		constraint: Option<Constraint>,
		sort: SortSpec,
		language: LanguageSelection,
	) -> Self {
		Self { constraint, sort, limit: None, language }
	}

	/// A limit of zero means unbounded.
	pub fn with_limit(mut self, limit: u32) -> Self {
		self.limit = (limit > 0).then_some(limit);

		self
	}

	/// Row filter including the language restriction.
	pub fn effective_constraint(&self) -> Option<Constraint> {
		let mut nodes = Vec::with_capacity(2);

		if let Some(constraint) = self.constraint.clone() {
			nodes.push(constraint);
		}
		if let Some(language) = self.language.constraint() {
			nodes.push(language);
		}

		Constraint::all(nodes)
	}

	pub fn matches(&self, entry: &IndexEntry) -> bool {
		self.effective_constraint().is_none_or(|constraint| constraint.matches(entry))
	}

	pub fn describe(&self) -> serde_json::Value {
		serde_json::json!({
			"constraint": self.constraint.as_ref().map(Constraint::to_json),
			"sort": self
				.sort
				.orderings()
				.iter()
				.map(|(column, direction)| format!("{} {}", column.column(), direction.as_sql()))
				.collect::<Vec<_>>(),
			"limit": self.limit,
			"language_mode": self.language.mode,
		})
	}
}

/// One (scope, type) group of the administrative overview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTypeGroup {
	pub pid: i64,
	pub unique_register_key: String,
	pub foreign_table: String,
}
