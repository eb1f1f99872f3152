pub mod clock;
pub mod filter;
pub mod owner;
pub mod providers;
pub mod query;
pub mod repository;
pub mod store;

mod error;

pub use clock::Clock;
pub use error::{Error, Result};
pub use filter::{
	ConstraintNarrowingProvider, ContentRecord, FilterContext, Hooks, NarrowingRequest,
	PreFilterProvider, PreFilterRequest, ProviderError,
};
pub use owner::{OwnerRef, TypeRegistry};
pub use providers::{
	CategoryLookup, CategoryNarrowingProvider, EventSearch, FULL_TEXT_KEY, FullTextSearchProvider,
};
pub use query::{IndexQuery, IndexResult, ListRequest, ListStart, SearchRequest, Traversal};
pub use repository::{IndexRepository, RepositoryOptions};
pub use store::{IndexStore, MemoryIndexStore, PgIndexStore};

use std::{future::Future, pin::Pin};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
