pub mod dialect;
pub mod executor;
pub mod predicate;
pub mod reconcile;

use std::{
	cmp::Ordering,
	collections::{BTreeSet, HashMap},
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{Error, RecordStore, Result, SearchService};

/// Hard upper bound on rows a single search returns. Applies to every dialect and request.
pub const RESULT_CAP: usize = 500;

/// Indexed event fields a search can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SearchField {
	#[serde(rename = "content.body")]
	Body,
	#[serde(rename = "content.name")]
	Name,
	#[serde(rename = "content.topic")]
	Topic,
}
impl SearchField {
	pub const ALL: [Self; 3] = [Self::Body, Self::Name, Self::Topic];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Body => "content.body",
			Self::Name => "content.name",
			Self::Topic => "content.topic",
		}
	}
}
impl FromStr for SearchField {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		Self::ALL.into_iter().find(|field| field.as_str() == raw).ok_or_else(|| {
			Error::InvalidRequest {
				message: format!(
					"unknown search field {raw:?}; expected content.body, content.name, or content.topic."
				),
			}
		})
	}
}
impl Display for SearchField {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A validated search. Scope and fields are non-empty and the term is not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
	scope: BTreeSet<String>,
	term: String,
	fields: BTreeSet<SearchField>,
}
impl SearchRequest {
	pub fn new<S>(
		scope: S,
		term: impl Into<String>,
		fields: impl IntoIterator<Item = SearchField>,
	) -> Result<Self>
	where
		S: IntoIterator,
		S::Item: Into<String>,
	{
		let scope = scope.into_iter().map(Into::into).collect::<BTreeSet<String>>();
		let term = term.into();
		let fields = fields.into_iter().collect::<BTreeSet<_>>();

		if scope.is_empty() {
			return Err(Error::InvalidRequest {
				message: "scope must contain at least one room id.".to_string(),
			});
		}
		if term.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "term must be non-empty.".to_string() });
		}
		if fields.is_empty() {
			return Err(Error::InvalidRequest {
				message: "fields must contain at least one search field.".to_string(),
			});
		}

		Ok(Self { scope, term, fields })
	}

	pub fn scope(&self) -> &BTreeSet<String> {
		&self.scope
	}

	pub fn term(&self) -> &str {
		&self.term
	}

	pub fn fields(&self) -> &BTreeSet<SearchField> {
		&self.fields
	}
}

/// Ranks and records keyed by event id. Both maps always hold the same keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult<T> {
	ranks: HashMap<String, f64>,
	records: HashMap<String, T>,
}
impl<T> SearchResult<T> {
	pub fn ranks(&self) -> &HashMap<String, f64> {
		&self.ranks
	}

	pub fn records(&self) -> &HashMap<String, T> {
		&self.records
	}

	pub fn len(&self) -> usize {
		self.ranks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ranks.is_empty()
	}

	/// Event ids by descending rank, ties broken by ascending id.
	pub fn ranked_ids(&self) -> Vec<&str> {
		let mut ids = self.ranks.iter().collect::<Vec<_>>();

		ids.sort_by(|(a_id, a_rank), (b_id, b_rank)| match b_rank.total_cmp(a_rank) {
			Ordering::Equal => a_id.cmp(b_id),
			other => other,
		});

		ids.into_iter().map(|(id, _)| id.as_str()).collect()
	}

}
impl<T> Default for SearchResult<T> {
	fn default() -> Self {
		Self { ranks: HashMap::new(), records: HashMap::new() }
	}
}

impl<R> SearchService<R>
where
	R: RecordStore,
{
	/// Searches `scope` for `term` in the named `fields`.
	///
	/// Field names are parsed into [`SearchField`]; an unknown name fails with
	/// [`Error::InvalidRequest`] before any query is issued.
	pub async fn search_messages<S, F>(
		&self,
		scope: &[S],
		term: &str,
		fields: &[F],
	) -> Result<SearchResult<R::Record>>
	where
		S: AsRef<str> + Sync,
		F: AsRef<str> + Sync,
	{
		let fields = fields
			.iter()
			.map(|field| field.as_ref().parse::<SearchField>())
			.collect::<Result<Vec<_>>>()?;
		let request = SearchRequest::new(scope.iter().map(|room| room.as_ref()), term, fields)?;

		self.search(&request).await
	}

	#[tracing::instrument(
		skip_all,
		fields(
			dialect = %self.dialect,
			room_count = request.scope().len(),
			field_count = request.fields().len()
		)
	)]
	pub async fn search(&self, request: &SearchRequest) -> Result<SearchResult<R::Record>> {
		let predicate = predicate::build(request.scope(), request.fields().iter().copied())?;
		let Some(term) = dialect::bind_term(self.dialect, request.term()) else {
			tracing::debug!("Search term has no searchable tokens.");

			return Ok(SearchResult::default());
		};
		let rendered = dialect::render(self.dialect);
		let statement = executor::assemble(self.dialect, &rendered, predicate, &term);
		let rows = executor::execute(self.dialect, self.index.as_ref(), &statement).await?;

		reconcile::reconcile(rows, &self.records).await
	}
}
