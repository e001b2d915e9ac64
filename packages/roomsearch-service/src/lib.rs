pub mod search;

mod error;

pub use error::{Error, Result};
pub use roomsearch_config::Dialect;
pub use roomsearch_storage::models::{EventRecord, RankedRow};
pub use search::{
	RESULT_CAP, SearchField, SearchRequest, SearchResult, dialect::RenderedMatch,
	executor::Statement, predicate::Predicate,
};

use std::{collections::HashMap, future::Future, pin::Pin, sync::Arc};

use roomsearch_storage::{db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes rendered full-text statements.
///
/// Implementations must not retry. Dropping the returned future must abandon the in-flight query.
pub trait SearchIndex
where
	Self: Send + Sync,
{
	fn fetch_ranked<'a>(
		&'a self,
		statement: &'a Statement,
	) -> BoxFuture<'a, Result<Vec<RankedRow>>>;
}

/// Authoritative lookup of the records an index row points at.
///
/// Returning fewer records than requested ids is expected and must not be an error.
pub trait RecordStore
where
	Self: Send + Sync,
{
	type Record: Send;

	fn fetch_records<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, Result<HashMap<String, Self::Record>>>;
}

pub struct SearchService<R> {
	dialect: Dialect,
	index: Arc<dyn SearchIndex>,
	records: R,
}
impl<R> SearchService<R>
where
	R: RecordStore,
{
	pub fn new(dialect: Dialect, index: Arc<dyn SearchIndex>, records: R) -> Self {
		Self { dialect, index, records }
	}

	/// Resolves the dialect from storage configuration. An unrecognized engine fails here with
	/// [`Error::UnsupportedEngine`], before any request is served.
	pub fn from_config(
		cfg: &roomsearch_config::Storage,
		index: Arc<dyn SearchIndex>,
		records: R,
	) -> Result<Self> {
		Ok(Self::new(cfg.dialect()?, index, records))
	}

	pub fn dialect(&self) -> Dialect {
		self.dialect
	}

	pub fn records(&self) -> &R {
		&self.records
	}
}
impl SearchService<Db> {
	/// Uses `db` both as the search index and as the record store.
	pub fn from_db(db: Db) -> Self {
		Self::new(db.dialect(), Arc::new(db.clone()), db)
	}
}

impl SearchIndex for Db {
	fn fetch_ranked<'a>(
		&'a self,
		statement: &'a Statement,
	) -> BoxFuture<'a, Result<Vec<RankedRow>>> {
		Box::pin(async move {
			Ok(queries::fetch_ranked_rows(self, &statement.sql, &statement.binds).await?)
		})
	}
}

impl RecordStore for Db {
	type Record = EventRecord;

	fn fetch_records<'a>(
		&'a self,
		ids: &'a [String],
	) -> BoxFuture<'a, Result<HashMap<String, Self::Record>>> {
		Box::pin(async move { Ok(queries::fetch_events(self, ids).await?) })
	}
}
