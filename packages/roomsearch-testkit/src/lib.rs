mod error;
mod fixtures;

pub use error::{Error, Result};
pub use fixtures::{
	IndexedEvent, create_pg_schema, index_pg, index_sqlite, sqlite_memory_pool, store_pg_records,
	store_sqlite_records,
};

use std::{env, str::FromStr, thread};

use sqlx::{
	ConnectOptions, Connection, Executor,
	postgres::{PgConnectOptions, PgConnection},
};
use uuid::Uuid;

const DSN_VAR: &str = "ROOMSEARCH_PG_DSN";
const MAINTENANCE_DATABASES: [&str; 2] = ["postgres", "template1"];

/// A uniquely named Postgres database that lives for one test.
///
/// Call [`TestDatabase::cleanup`] to drop it and observe failures; otherwise it is dropped from a
/// helper thread when the value goes out of scope.
pub struct TestDatabase {
	database: String,
	dsn: String,
	maintenance: PgConnectOptions,
	dropped: bool,
}
impl TestDatabase {
	pub async fn new(base_dsn: &str) -> Result<Self> {
		let base = PgConnectOptions::from_str(base_dsn).map_err(Error::InvalidDsn)?;
		let (maintenance, mut conn) = open_maintenance(&base).await?;
		let database = format!("roomsearch_{}", Uuid::new_v4().simple());

		conn.execute(format!(r#"CREATE DATABASE "{database}""#).as_str()).await?;

		let dsn = base.database(&database).to_url_lossy().to_string();

		Ok(Self { database, dsn, maintenance, dropped: false })
	}

	pub fn dsn(&self) -> &str {
		&self.dsn
	}

	pub async fn cleanup(mut self) -> Result<()> {
		drop_database(&self.maintenance, &self.database).await?;

		self.dropped = true;

		Ok(())
	}
}
impl Drop for TestDatabase {
	fn drop(&mut self) {
		if self.dropped {
			return;
		}

		let database = std::mem::take(&mut self.database);
		let maintenance = self.maintenance.clone();
		// The test runtime may already be shutting down, so cleanup gets its own.
		let worker = thread::spawn(move || {
			let outcome = tokio::runtime::Builder::new_current_thread()
				.enable_all()
				.build()
				.map_err(|err| err.to_string())
				.and_then(|runtime| {
					runtime
						.block_on(drop_database(&maintenance, &database))
						.map_err(|err| err.to_string())
				});

			if let Err(err) = outcome {
				eprintln!("Could not drop test database {database}: {err}.");
			}
		});

		let _ = worker.join();
	}
}

/// Base DSN for Postgres-backed tests, unset when no server is available.
pub fn env_dsn() -> Option<String> {
	env::var(DSN_VAR).ok()
}

async fn open_maintenance(base: &PgConnectOptions) -> Result<(PgConnectOptions, PgConnection)> {
	let mut failure = None;

	for database in MAINTENANCE_DATABASES {
		let options = base.clone().database(database);

		match PgConnection::connect_with(&options).await {
			Ok(conn) => return Ok((options, conn)),
			Err(err) => failure = Some(err),
		}
	}

	Err(Error::NoMaintenanceDatabase {
		tried: MAINTENANCE_DATABASES.join(", "),
		source: failure.unwrap_or(sqlx::Error::PoolClosed),
	})
}

async fn drop_database(maintenance: &PgConnectOptions, database: &str) -> Result<()> {
	let mut conn = PgConnection::connect_with(maintenance).await?;

	// Pools held by a failed test would otherwise block DROP DATABASE.
	sqlx::query(
		"SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
		WHERE datname = $1 AND pid <> pg_backend_pid()",
	)
	.bind(database)
	.execute(&mut conn)
	.await?;
	conn.execute(format!(r#"DROP DATABASE IF EXISTS "{database}""#).as_str()).await?;

	Ok(())
}
