use std::iter;

use roomsearch_config::Dialect;

use crate::{
	RankedRow, Result, SearchIndex,
	search::{
		RESULT_CAP,
		dialect::{self, RenderedMatch},
		predicate::Predicate,
	},
};

/// A dialect-ready statement and its bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
	pub sql: String,
	/// Term values first, then predicate values.
	pub binds: Vec<String>,
}

pub fn assemble(
	dialect: Dialect,
	rendered: &RenderedMatch,
	predicate: Predicate,
	term: &str,
) -> Statement {
	let sql = format!(
		"SELECT {rank} AS rank, event_id FROM {from} WHERE {matcher} AND {clause} ORDER BY rank DESC LIMIT {RESULT_CAP}",
		rank = rendered.rank,
		from = rendered.from,
		matcher = rendered.matcher,
		clause = predicate.clause,
	);
	let binds = iter::repeat_n(term.to_string(), rendered.term_binds)
		.chain(predicate.binds)
		.collect::<Vec<_>>();

	debug_assert_eq!(dialect::placeholder_count(&sql), binds.len());

	Statement { sql: dialect::bind_placeholders(dialect, &sql), binds }
}

/// Runs `statement` and returns at most [`RESULT_CAP`] rows in backend order.
///
/// A backend that ignores the statement limit is cut down client-side. For ranking dialects the
/// cut keeps the highest ranks even if the backend also ignored `ORDER BY`.
pub async fn execute(
	dialect: Dialect,
	index: &dyn SearchIndex,
	statement: &Statement,
) -> Result<Vec<RankedRow>> {
	let mut rows = index.fetch_ranked(statement).await?;

	if rows.len() > RESULT_CAP {
		tracing::warn!(
			returned = rows.len(),
			cap = RESULT_CAP,
			"Search backend returned more rows than the statement limit."
		);

		if dialect.supports_ranking() {
			rows.sort_by(|a, b| b.rank.total_cmp(&a.rank));
		}

		rows.truncate(RESULT_CAP);
	}
	if rows.len() == RESULT_CAP {
		tracing::info!(cap = RESULT_CAP, "Search result cap reached.");
	}

	tracing::debug!(rows = rows.len(), "Search statement executed.");

	Ok(rows)
}

#[cfg(test)]
mod tests {
	use roomsearch_config::Dialect;

	use crate::search::{SearchField, dialect::render, executor::assemble, predicate::build};

	#[test]
	fn postgres_statement_binds_term_first() {
		let predicate = build(["!room1"], [SearchField::Body]).expect("Predicate must build.");
		let statement =
			assemble(Dialect::Postgres, &render(Dialect::Postgres), predicate, "hello world");

		assert_eq!(
			statement.sql,
			"SELECT ts_rank_cd(vector, query) AS rank, event_id \
			 FROM plainto_tsquery('english', $1) AS query, event_search \
			 WHERE vector @@ query AND room_id IN ($2) AND (key = $3) \
			 ORDER BY rank DESC LIMIT 500"
		);
		assert_eq!(statement.binds, vec!["hello world", "!room1", "content.body"]);
	}

	#[test]
	fn sqlite_statement_keeps_question_marks() {
		let predicate = build(["!a", "!b"], [SearchField::Body, SearchField::Name])
			.expect("Predicate must build.");
		let statement = assemble(Dialect::Sqlite, &render(Dialect::Sqlite), predicate, "hi");

		assert_eq!(
			statement.sql,
			"SELECT 0.0 AS rank, event_id FROM event_search \
			 WHERE value MATCH ? AND room_id IN (?, ?) AND (key = ? OR key = ?) \
			 ORDER BY rank DESC LIMIT 500"
		);
		assert_eq!(statement.binds, vec!["hi", "!a", "!b", "content.body", "content.name"]);
	}

	#[test]
	fn term_is_never_interpolated() {
		let predicate = build(["!a"], [SearchField::Body]).expect("Predicate must build.");
		let statement =
			assemble(Dialect::Postgres, &render(Dialect::Postgres), predicate, "x' OR '1'='1");

		assert!(!statement.sql.contains("OR '1'"));
		assert_eq!(statement.binds[0], "x' OR '1'='1");
	}
}
