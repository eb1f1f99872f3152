use std::{
	collections::BTreeSet,
	sync::{
		RwLock,
		atomic::{AtomicUsize, Ordering},
	},
};

use occidx_domain::{IndexEntry, ScopeTypeGroup, StorageQuery};
use occidx_storage::{db::Db, queries};

use crate::{BoxFuture, Result};

/// Storage engine boundary: executes a composed query.
pub trait IndexStore
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, query: &'a StorageQuery) -> BoxFuture<'a, Result<Vec<IndexEntry>>>;

	fn distinct_scope_types(&self) -> BoxFuture<'_, Result<Vec<ScopeTypeGroup>>>;
}

pub struct PgIndexStore {
	db: Db,
}
impl PgIndexStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl IndexStore for PgIndexStore {
	fn fetch<'a>(&'a self, query: &'a StorageQuery) -> BoxFuture<'a, Result<Vec<IndexEntry>>> {
		Box::pin(async move { Ok(queries::fetch_entries(&self.db.pool, query).await?) })
	}

	fn distinct_scope_types(&self) -> BoxFuture<'_, Result<Vec<ScopeTypeGroup>>> {
		Box::pin(async move { Ok(queries::distinct_scope_types(&self.db.pool).await?) })
	}
}

/// Evaluates constraint trees against entries held in memory.
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
	entries: RwLock<Vec<IndexEntry>>,
	fetches: AtomicUsize,
}
impl MemoryIndexStore {
	pub fn new(entries: Vec<IndexEntry>) -> Self {
		Self { entries: RwLock::new(entries), fetches: AtomicUsize::new(0) }
	}

	pub fn insert(&self, entry: IndexEntry) {
		self.entries.write().unwrap_or_else(|err| err.into_inner()).push(entry);
	}

	/// Number of executed fetches.
	pub fn fetch_count(&self) -> usize {
		self.fetches.load(Ordering::SeqCst)
	}

	fn run(&self, query: &StorageQuery) -> Vec<IndexEntry> {
		self.fetches.fetch_add(1, Ordering::SeqCst);

		let entries = self.entries.read().unwrap_or_else(|err| err.into_inner());
		let mut selected =
			entries.iter().filter(|entry| query.matches(entry)).cloned().collect::<Vec<_>>();

		selected.sort_by(|lhs, rhs| query.sort.compare(lhs, rhs).then(lhs.uid.cmp(&rhs.uid)));

		if let Some(limit) = query.limit {
			selected.truncate(limit as usize);
		}

		selected
	}

	fn groups(&self) -> Vec<ScopeTypeGroup> {
		self.entries
			.read()
			.unwrap_or_else(|err| err.into_inner())
			.iter()
			.map(|entry| {
				(entry.pid, entry.unique_register_key.clone(), entry.foreign_table.clone())
			})
			.collect::<BTreeSet<_>>()
			.into_iter()
			.map(|(pid, unique_register_key, foreign_table)| ScopeTypeGroup {
				pid,
				unique_register_key,
				foreign_table,
			})
			.collect()
	}
}
impl IndexStore for MemoryIndexStore {
	fn fetch<'a>(&'a self, query: &'a StorageQuery) -> BoxFuture<'a, Result<Vec<IndexEntry>>> {
		Box::pin(async move { Ok(self.run(query)) })
	}

	fn distinct_scope_types(&self) -> BoxFuture<'_, Result<Vec<ScopeTypeGroup>>> {
		Box::pin(async move { Ok(self.groups()) })
	}
}
