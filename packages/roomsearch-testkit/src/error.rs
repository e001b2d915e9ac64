pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("ROOMSEARCH_PG_DSN is not a valid Postgres DSN: {0}")]
	InvalidDsn(sqlx::Error),

	#[error("None of the maintenance databases ({tried}) accepted a connection: {source}")]
	NoMaintenanceDatabase { tried: String, source: sqlx::Error },

	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
}
