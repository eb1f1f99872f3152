use std::sync::Arc;

use crate::filter::{
	ConstraintNarrowingProvider, NarrowingRequest, PreFilterProvider, PreFilterRequest,
	ProviderError,
};

/// Custom search key holding the full text term.
pub const FULL_TEXT_KEY: &str = "fullText";

/// Resolves full text search terms to owner uids.
pub trait EventSearch
where
	Self: Send + Sync,
{
	fn ids_by_search_term(&self, term: &str) -> Result<Vec<i64>, ProviderError>;
}

/// Category relations of content elements and owners.
pub trait CategoryLookup
where
	Self: Send + Sync,
{
	fn categories_of_content(&self, content_uid: i64) -> Result<Vec<i64>, ProviderError>;

	fn owners_in_categories(&self, category_ids: &[i64]) -> Result<Vec<i64>, ProviderError>;
}

/// Restricts searches carrying a full text term to the owners that match it.
pub struct FullTextSearchProvider {
	search: Arc<dyn EventSearch>,
}
impl FullTextSearchProvider {
	pub fn new(search: Arc<dyn EventSearch>) -> Self {
		Self { search }
	}
}
impl PreFilterProvider for FullTextSearchProvider {
	fn name(&self) -> &str {
		"full_text_search"
	}

	fn pre_filter(
		&self,
		request: &PreFilterRequest,
	) -> Result<Option<PreFilterRequest>, ProviderError> {
		let Some(term) = request.custom_search.get(FULL_TEXT_KEY) else {
			return Ok(None);
		};
		let ids = self.search.ids_by_search_term(term)?;
		let mut next = request.clone();

		// No hits means no results.
		if ids.is_empty() {
			next.empty_pre_result = true;
		}

		next.index_ids = ids;

		Ok(Some(next))
	}
}

/// Restricts listings to owners sharing a category with the rendering content element.
pub struct CategoryNarrowingProvider {
	lookup: Arc<dyn CategoryLookup>,
}
impl CategoryNarrowingProvider {
	pub fn new(lookup: Arc<dyn CategoryLookup>) -> Self {
		Self { lookup }
	}
}
impl ConstraintNarrowingProvider for CategoryNarrowingProvider {
	fn name(&self) -> &str {
		"category_narrowing"
	}

	fn narrow(
		&self,
		request: &NarrowingRequest,
	) -> Result<Option<NarrowingRequest>, ProviderError> {
		let Some(record) = request.content_record.as_ref() else {
			return Ok(None);
		};
		let categories = self.lookup.categories_of_content(record.uid)?;

		if categories.is_empty() {
			return Ok(None);
		}

		let owners = self.lookup.owners_in_categories(&categories)?;
		let mut next = request.clone();

		next.index_ids.extend(owners);

		Ok(Some(next))
	}
}
