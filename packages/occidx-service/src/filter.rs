//! Categorical constraints and the provider hooks that may narrow them.
//!
//! Providers run in registration order. A provider that fails is logged and skipped, and the
//! request it was handed stays as it was before the call.

use std::{collections::BTreeMap, sync::Arc};

use time::OffsetDateTime;

use occidx_domain::{Constraint, Field};

/// Failure reported by a filter provider. Never surfaces to callers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
	#[error("Lookup failed: {message}")]
	Lookup { message: String },
}

/// Arguments of the pre-filter hook run by search queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreFilterRequest {
	/// Owner uids the result must be restricted to; empty leaves the result unrestricted.
	pub index_ids: Vec<i64>,
	pub start_date: Option<OffsetDateTime>,
	pub end_date: Option<OffsetDateTime>,
	pub custom_search: BTreeMap<String, String>,
	pub index_types: Vec<String>,
	/// Set to force an empty result.
	pub empty_pre_result: bool,
}

/// Content element a query is rendered for, e.g. a plugin instance on a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRecord {
	pub uid: i64,
}

/// Arguments of the narrowing hook run while assembling the default constraints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NarrowingRequest {
	pub index_ids: Vec<i64>,
	pub index_types: Vec<String>,
	pub content_record: Option<ContentRecord>,
}

pub trait PreFilterProvider
where
	Self: Send + Sync,
{
	fn name(&self) -> &str;

	/// Returns the adjusted request, or `None` to leave it unchanged.
	fn pre_filter(
		&self,
		request: &PreFilterRequest,
	) -> Result<Option<PreFilterRequest>, ProviderError>;
}

pub trait ConstraintNarrowingProvider
where
	Self: Send + Sync,
{
	fn name(&self) -> &str;

	/// Returns the adjusted request, or `None` to leave it unchanged.
	fn narrow(&self, request: &NarrowingRequest)
	-> Result<Option<NarrowingRequest>, ProviderError>;
}

/// Registered providers, in call order.
#[derive(Clone, Default)]
pub struct Hooks {
	pub pre_filter: Vec<Arc<dyn PreFilterProvider>>,
	pub narrowing: Vec<Arc<dyn ConstraintNarrowingProvider>>,
}
impl Hooks {
	pub fn with_pre_filter(mut self, provider: Arc<dyn PreFilterProvider>) -> Self {
		self.pre_filter.push(provider);

		self
	}

	pub fn with_narrowing(mut self, provider: Arc<dyn ConstraintNarrowingProvider>) -> Self {
		self.narrowing.push(provider);

		self
	}
}

/// Per-call categorical filter state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterContext {
	type_keys: Vec<String>,
	scopes: Vec<i64>,
	explicit_ids: Option<Vec<i64>>,
	force_empty: bool,
}
impl FilterContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_type_keys<I, S>(mut self, keys: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.type_keys = keys.into_iter().map(Into::into).collect();

		self
	}

	pub fn with_scopes<I>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = i64>,
	{
		self.scopes = scopes.into_iter().collect();

		self
	}

	pub fn type_keys(&self) -> &[String] {
		&self.type_keys
	}

	pub fn scopes(&self) -> &[i64] {
		&self.scopes
	}

	pub fn explicit_ids(&self) -> Option<&[i64]> {
		self.explicit_ids.as_deref()
	}

	pub fn is_forced_empty(&self) -> bool {
		self.force_empty
	}

	pub fn force_empty(&mut self) {
		self.force_empty = true;
	}

	/// Extends the owner uid allow-list. Empty input leaves the context unrestricted.
	pub fn add_explicit_ids(&mut self, ids: &[i64]) {
		if ids.is_empty() {
			return;
		}

		let explicit = self.explicit_ids.get_or_insert_with(Vec::new);

		for id in ids {
			if !explicit.contains(id) {
				explicit.push(*id);
			}
		}
	}

	/// One set-membership constraint per non-empty set.
	pub fn build_constraints(&self) -> Vec<Constraint> {
		let mut constraints = Vec::new();

		if !self.type_keys.is_empty() {
			constraints.push(Constraint::one_of(
				Field::UniqueRegisterKey,
				self.type_keys.iter().map(String::as_str),
			));
		}
		if !self.scopes.is_empty() {
			constraints.push(Constraint::one_of(Field::Pid, self.scopes.iter().copied()));
		}
		if let Some(ids) = self.explicit_ids.as_ref() {
			constraints.push(Constraint::one_of(Field::ForeignUid, ids.iter().copied()));
		}

		constraints
	}

	/// Folds `request` through the providers, then applies the outcome to the context.
	pub fn run_pre_filter_hook(
		&mut self,
		providers: &[Arc<dyn PreFilterProvider>],
		mut request: PreFilterRequest,
	) -> PreFilterRequest {
		for provider in providers {
			match provider.pre_filter(&request) {
				Ok(Some(next)) => {
					tracing::debug!(
						provider = provider.name(),
						index_ids = next.index_ids.len(),
						empty_pre_result = next.empty_pre_result,
						"Pre-filter provider adjusted the request."
					);

					request = next;
				},
				Ok(None) => {},
				Err(err) => {
					tracing::warn!(
						provider = provider.name(),
						error = %err,
						"Pre-filter provider failed. Skipping it."
					);
				},
			}
		}

		self.add_explicit_ids(&request.index_ids);

		if request.empty_pre_result {
			self.force_empty();
		}

		request
	}

	pub fn run_narrowing_hook(
		&mut self,
		providers: &[Arc<dyn ConstraintNarrowingProvider>],
		content_record: Option<&ContentRecord>,
	) {
		let mut request = NarrowingRequest {
			index_ids: Vec::new(),
			index_types: self.type_keys.clone(),
			content_record: content_record.cloned(),
		};

		for provider in providers {
			match provider.narrow(&request) {
				Ok(Some(next)) => {
					tracing::debug!(
						provider = provider.name(),
						index_ids = next.index_ids.len(),
						"Narrowing provider adjusted the request."
					);

					request = next;
				},
				Ok(None) => {},
				Err(err) => {
					tracing::warn!(
						provider = provider.name(),
						error = %err,
						"Narrowing provider failed. Skipping it."
					);
				},
			}
		}

		self.add_explicit_ids(&request.index_ids);
	}
}
