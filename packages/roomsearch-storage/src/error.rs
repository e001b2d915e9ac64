#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error(transparent)]
	Config(#[from] roomsearch_config::Error),
	#[error("Invalid row: {0}")]
	InvalidRow(String),
}
