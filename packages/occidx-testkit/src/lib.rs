mod error;

pub use error::{Error, Result};

use std::{env, mem, str::FromStr, sync::Once, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use tokio::runtime::Builder;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DSN_ENV: &str = "OCCIDX_PG_DSN";
const ADMIN_DATABASE: &str = "postgres";

static TRACING: Once = Once::new();

/// Throwaway database on the server behind a base DSN. Removed by [`TestDatabase::cleanup`], or
/// when dropped.
pub struct TestDatabase {
	name: String,
	dsn: String,
	admin: PgConnectOptions,
	live: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn)
			.map_err(|err| Error::Message(format!("Invalid {DSN_ENV}: {err}.")))?;
		let admin = base.clone().database(ADMIN_DATABASE);
		let name = format!("occidx_test_{}", Uuid::new_v4().simple());
		let mut conn = PgConnection::connect_with(&admin).await?;

		conn.execute(format!(r#"CREATE DATABASE "{name}""#).as_str()).await?;

		let dsn = base.database(&name).to_url_lossy().to_string();

		Ok(Self { name, dsn, admin, live: true })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub async fn cleanup(mut self) -> Result<()> {
		self.live = false;

		drop_database(&self.admin, &self.name).await
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if !self.live {
			return;
		}

		let name = mem::take(&mut self.name);
		let admin = self.admin.clone();
		// Drop may run on a runtime worker; block on a private runtime instead.
		let handle = thread::spawn(move || {
			let result = Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| Error::Message(format!("Failed to build cleanup runtime: {err}.")))
				.and_then(|runtime| runtime.block_on(drop_database(&admin, &name)));

			if let Err(err) = result {
				eprintln!("Test database cleanup failed: {err}.");
			}
		});

		let _ = handle.join();
	}
}

pub fn env_dsn() -> Option<String> {
	env::var(DSN_ENV).ok()
}

/// Installs a test subscriber once per process. `RUST_LOG` wins over `log_level`; an unparsable
/// level falls back to `info`.
pub fn init_tracing(log_level: &str) {
	TRACING.call_once(|| {
		let filter = EnvFilter::try_from_default_env()
			.or_else(|_| EnvFilter::try_new(log_level))
			.unwrap_or_else(|_| EnvFilter::new("info"));
		let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
	});
}

async fn drop_database(admin: &PgConnectOptions, name: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(admin).await?;

	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE)"#).as_str()).await?;

	Ok(())
}
