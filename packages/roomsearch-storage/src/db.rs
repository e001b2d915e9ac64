use sqlx::{PgPool, SqlitePool, postgres::PgPoolOptions, sqlite::SqlitePoolOptions};

use roomsearch_config::Dialect;

use crate::Result;

#[derive(Clone, Debug)]
pub enum Pool {
	Postgres(PgPool),
	Sqlite(SqlitePool),
}

/// Shared, read-only handle to the search backend.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct Db {
	pub pool: Pool,
}
impl Db {
	pub async fn connect(cfg: &roomsearch_config::Storage) -> Result<Self> {
		let pool = match cfg.dialect()? {
			Dialect::Postgres => Pool::Postgres(
				PgPoolOptions::new().max_connections(cfg.pool_max_conns).connect(&cfg.dsn).await?,
			),
			Dialect::Sqlite => Pool::Sqlite(
				SqlitePoolOptions::new()
					.max_connections(cfg.pool_max_conns)
					.connect(&cfg.dsn)
					.await?,
			),
		};

		tracing::debug!(dialect = %cfg.engine, "Connected search backend.");

		Ok(Self { pool })
	}

	pub fn from_pg(pool: PgPool) -> Self {
		Self { pool: Pool::Postgres(pool) }
	}

	pub fn from_sqlite(pool: SqlitePool) -> Self {
		Self { pool: Pool::Sqlite(pool) }
	}

	pub fn dialect(&self) -> Dialect {
		match self.pool {
			Pool::Postgres(_) => Dialect::Postgres,
			Pool::Sqlite(_) => Dialect::Sqlite,
		}
	}
}
