use std::sync::Arc;

use time::macros::{date, datetime};

use occidx_config::{Calendar, Config, Index, List, Postgres, Scopes, Service, Storage};
use occidx_domain::IndexEntry;
use occidx_service::{Clock, IndexRepository, PgIndexStore, RepositoryOptions};
use occidx_storage::{db::Db, queries};
use occidx_testkit::TestDatabase;

fn config(dsn: &str) -> Config {
	Config {
		service: Service { log_level: "debug".to_string() },
		storage: Storage { postgres: Postgres { dsn: dsn.to_string(), pool_max_conns: 2 } },
		scopes: Scopes { storage_pids: vec![12], backend_default_pids: None },
		index: Index::default(),
		calendar: Calendar::default(),
		list: List::default(),
	}
}

fn entry(pid: i64, foreign_uid: i64, start: time::Date, end: Option<time::Date>) -> IndexEntry {
	IndexEntry {
		uid: 0,
		pid,
		foreign_table: "tx_events".to_string(),
		foreign_uid,
		unique_register_key: "Event".to_string(),
		start_date: Some(start),
		start_time: 0,
		end_date: end,
		end_time: 0,
		all_day: true,
		sys_language_uid: 0,
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set OCCIDX_PG_DSN to run."]
async fn week_lookup_runs_against_postgres() {
	let Some(base_dsn) = occidx_testkit::env_dsn() else {
		eprintln!("Skipping week_lookup_runs_against_postgres; set OCCIDX_PG_DSN to run this test.");

		return;
	};

	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = config(test_db.dsn());

	occidx_testkit::init_tracing(&cfg.service.log_level);

	let db = Db::connect(&cfg.storage.postgres).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	for seed in [
		entry(12, 1, date!(2024 - 03 - 01), Some(date!(2024 - 03 - 12))),
		entry(12, 2, date!(2024 - 03 - 15), None),
		entry(14, 3, date!(2024 - 03 - 12), Some(date!(2024 - 03 - 12))),
		entry(12, 4, date!(2024 - 04 - 01), Some(date!(2024 - 04 - 05))),
	] {
		queries::insert_entry(&db.pool, &seed).await.expect("Failed to insert entry.");
	}

	let store = Arc::new(PgIndexStore::new(db));
	let options = RepositoryOptions {
		clock: Clock::Fixed(datetime!(2024-03-12 12:00 UTC)),
		..RepositoryOptions::default()
	};
	let repository =
		IndexRepository::new(&cfg, store, options).expect("Failed to build repository.");
	let entries = repository
		.find_week(2024, 11)
		.expect("valid week")
		.fetch()
		.await
		.expect("Failed to fetch.");

	assert_eq!(entries.iter().map(|entry| entry.foreign_uid).collect::<Vec<_>>(), vec![1, 2]);

	let groups = repository.find_types_and_scopes().await.expect("Failed to list groups.");

	assert_eq!(groups.len(), 2);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
