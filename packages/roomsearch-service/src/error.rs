pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Malformed input, rejected before any I/O.
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	/// The configured engine is not one of the supported dialects.
	#[error("Unsupported storage engine: {engine}")]
	UnsupportedEngine { engine: String },
	/// The query or the record lookup failed. Not retried here.
	#[error("Storage unavailable: {message}")]
	StorageUnavailable { message: String },
}
impl From<roomsearch_config::Error> for Error {
	fn from(err: roomsearch_config::Error) -> Self {
		match err {
			roomsearch_config::Error::UnsupportedEngine { engine } =>
				Self::UnsupportedEngine { engine },
			other => Self::StorageUnavailable { message: other.to_string() },
		}
	}
}

impl From<roomsearch_storage::Error> for Error {
	fn from(err: roomsearch_storage::Error) -> Self {
		match err {
			roomsearch_storage::Error::Sqlx(inner) =>
				Self::StorageUnavailable { message: inner.to_string() },
			roomsearch_storage::Error::InvalidRow(message) => Self::StorageUnavailable { message },
			roomsearch_storage::Error::Config(inner) => Self::from(inner),
		}
	}
}
