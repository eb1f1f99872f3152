use sqlx::{PgExecutor, Postgres, QueryBuilder};

use occidx_domain::{IndexEntry, ScopeTypeGroup, StorageQuery};

use crate::{
	Error, Result,
	models::{IndexEntryRow, ScopeTypeGroupRow},
	render,
};

const ENTRY_COLUMNS: &str = "\
uid, pid, foreign_table, foreign_uid, unique_register_key, start_date, start_time, end_date, \
end_time, all_day, sys_language_uid";

/// Inserts `entry` and returns the uid assigned by the database. The entry's own uid is ignored.
pub async fn insert_entry<'e, E>(executor: E, entry: &IndexEntry) -> Result<i64>
where
	E: PgExecutor<'e>,
{
	if let (Some(start), Some(end)) = (entry.start_date, entry.end_date)
		&& start > end
	{
		return Err(Error::InvalidArgument(format!(
			"Entry for {}:{} starts after it ends.",
			entry.foreign_table, entry.foreign_uid
		)));
	}

	let uid: i64 = sqlx::query_scalar(
		"\
INSERT INTO index_entries (
	pid,
	foreign_table,
	foreign_uid,
	unique_register_key,
	start_date,
	start_time,
	end_date,
	end_time,
	all_day,
	sys_language_uid
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
RETURNING uid",
	)
	.bind(entry.pid)
	.bind(entry.foreign_table.as_str())
	.bind(entry.foreign_uid)
	.bind(entry.unique_register_key.as_str())
	.bind(entry.start_date)
	.bind(entry.start_time)
	.bind(entry.end_date)
	.bind(entry.end_time)
	.bind(entry.all_day)
	.bind(entry.sys_language_uid)
	.fetch_one(executor)
	.await?;

	Ok(uid)
}

pub async fn delete_entries_for_owner<'e, E>(
	executor: E,
	foreign_table: &str,
	foreign_uid: i64,
) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result =
		sqlx::query("DELETE FROM index_entries WHERE foreign_table = $1 AND foreign_uid = $2")
			.bind(foreign_table)
			.bind(foreign_uid)
			.execute(executor)
			.await?;

	Ok(result.rows_affected())
}

pub fn build_select(query: &StorageQuery) -> QueryBuilder<'static, Postgres> {
	let mut builder = QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM index_entries"));

	if let Some(constraint) = query.effective_constraint() {
		builder.push(" WHERE ");

		render::push_constraint(&mut builder, &constraint);
	}

	render::push_order_by(&mut builder, &query.sort);

	if let Some(limit) = query.limit {
		builder.push(" LIMIT ");
		builder.push_bind(i64::from(limit));
	}

	builder
}

pub async fn fetch_entries<'e, E>(executor: E, query: &StorageQuery) -> Result<Vec<IndexEntry>>
where
	E: PgExecutor<'e>,
{
	let mut builder = build_select(query);
	let rows: Vec<IndexEntryRow> = builder.build_query_as().fetch_all(executor).await?;

	Ok(rows.into_iter().map(IndexEntry::from).collect())
}

/// Distinct (scope, type tag, owner table) groups, ignoring translations.
pub async fn distinct_scope_types<'e, E>(executor: E) -> Result<Vec<ScopeTypeGroup>>
where
	E: PgExecutor<'e>,
{
	let rows: Vec<ScopeTypeGroupRow> = sqlx::query_as(
		"\
SELECT DISTINCT pid, unique_register_key, foreign_table
FROM index_entries
ORDER BY pid ASC, unique_register_key ASC, foreign_table ASC",
	)
	.fetch_all(executor)
	.await?;

	Ok(rows.into_iter().map(ScopeTypeGroup::from).collect())
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use occidx_domain::{
		Constraint, Field, LanguageSelection, SortDirection, SortField, SortSpec, StorageQuery,
	};

	use crate::queries;

	#[test]
	fn select_combines_filter_language_order_and_limit() {
		let query = StorageQuery::new(
			Some(Constraint::greater_or_equal(Field::StartDate, datetime!(2024-03-11 00:00))),
			SortSpec::new(SortField::Start, SortDirection::Ascending),
			LanguageSelection::new("strict", 0),
		)
		.with_limit(10);
		let builder = queries::build_select(&query);

		assert_eq!(
			builder.sql(),
			"SELECT uid, pid, foreign_table, foreign_uid, unique_register_key, start_date, start_time, end_date, end_time, all_day, sys_language_uid FROM index_entries WHERE (COALESCE(start_date, '-infinity'::date)::timestamp >= $1 AND sys_language_uid IN ($2, $3)) ORDER BY start_date ASC NULLS LAST, start_time ASC NULLS LAST, uid ASC LIMIT $4"
		);
	}

	#[test]
	fn select_without_filter_has_no_where_clause() {
		let query =
			StorageQuery::new(None, SortSpec::default(), LanguageSelection::ignore());
		let builder = queries::build_select(&query);

		assert!(!builder.sql().contains("WHERE"));
		assert!(!builder.sql().contains("LIMIT"));
	}
}
