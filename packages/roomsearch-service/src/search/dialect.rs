//! Engine-specific full-text match and ranking fragments.

use roomsearch_config::Dialect;

/// Statement pieces a dialect contributes to a search.
///
/// Placeholders are written as `?` and the search term is the only value they take. Every term
/// placeholder appears before any predicate placeholder in the assembled statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderedMatch {
	/// Relation list for the `FROM` clause.
	pub from: &'static str,
	/// Condition selecting rows that match the term.
	pub matcher: &'static str,
	/// Expression exposed as the `rank` column.
	pub rank: &'static str,
	/// Number of term placeholders across `from` and `matcher`.
	pub term_binds: usize,
}

pub fn render(dialect: Dialect) -> RenderedMatch {
	match dialect {
		Dialect::Postgres => render_postgres(),
		Dialect::Sqlite => render_sqlite(),
	}
}

/// Rewrites neutral `?` placeholders into the dialect's parameter syntax.
///
/// Question marks inside single-quoted literals are left alone.
pub fn bind_placeholders(dialect: Dialect, sql: &str) -> String {
	match dialect {
		Dialect::Postgres => number_placeholders(sql),
		Dialect::Sqlite => sql.to_string(),
	}
}

/// Turns the user's plain-text term into the value bound to the term placeholder.
///
/// Postgres receives the term unchanged; `plainto_tsquery` gives it no operator meaning. SQLite
/// would parse the term as a MATCH expression, so each whitespace token becomes a quoted phrase and
/// tokens are joined by implicit AND. Double quotes are turned into separators, matching what the
/// FTS tokenizer does with them at index time. `None` means no token can match anything, in which
/// case no query needs to run.
pub fn bind_term(dialect: Dialect, term: &str) -> Option<String> {
	match dialect {
		Dialect::Postgres => Some(term.to_string()),
		Dialect::Sqlite => sqlite_phrases(term),
	}
}

/// Counts `?` placeholders outside single-quoted literals.
pub fn placeholder_count(sql: &str) -> usize {
	let mut in_literal = false;
	let mut count = 0;

	for ch in sql.chars() {
		match ch {
			'\'' => in_literal = !in_literal,
			'?' if !in_literal => count += 1,
			_ => {},
		}
	}

	count
}

// `plainto_tsquery` treats the term as plain text, so operator characters in user input carry no
// query syntax.
fn render_postgres() -> RenderedMatch {
	RenderedMatch {
		from: "plainto_tsquery('english', ?) AS query, event_search",
		matcher: "vector @@ query",
		rank: "ts_rank_cd(vector, query)",
		term_binds: 1,
	}
}

// No ranking function; a constant zero marks the rows as unordered.
fn render_sqlite() -> RenderedMatch {
	RenderedMatch { from: "event_search", matcher: "value MATCH ?", rank: "0.0", term_binds: 1 }
}

fn sqlite_phrases(term: &str) -> Option<String> {
	let phrases = term
		.split_whitespace()
		.filter(|token| token.chars().any(is_sqlite_token_char))
		.map(|token| format!("\"{}\"", token.replace('"', " ")))
		.collect::<Vec<_>>();

	if phrases.is_empty() { None } else { Some(phrases.join(" ")) }
}

// The default `simple` tokenizer keeps ASCII alphanumerics and every non-ASCII character.
fn is_sqlite_token_char(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || !ch.is_ascii()
}

fn number_placeholders(sql: &str) -> String {
	let mut out = String::with_capacity(sql.len() + 8);
	let mut in_literal = false;
	let mut next = 1_usize;

	for ch in sql.chars() {
		match ch {
			'\'' => {
				in_literal = !in_literal;

				out.push(ch);
			},
			'?' if !in_literal => {
				out.push('$');
				out.push_str(&next.to_string());

				next += 1;
			},
			_ => out.push(ch),
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use roomsearch_config::Dialect;

	use crate::search::dialect::{bind_placeholders, bind_term, placeholder_count, render};

	#[test]
	fn postgres_ranks_with_ts_rank_cd() {
		let rendered = render(Dialect::Postgres);

		assert!(rendered.from.starts_with("plainto_tsquery('english', ?)"));
		assert_eq!(rendered.matcher, "vector @@ query");
		assert_eq!(rendered.rank, "ts_rank_cd(vector, query)");
		assert_eq!(placeholder_count(rendered.from) + placeholder_count(rendered.matcher), 1);
	}

	#[test]
	fn sqlite_uses_constant_rank() {
		let rendered = render(Dialect::Sqlite);

		assert_eq!(rendered.matcher, "value MATCH ?");
		assert_eq!(rendered.rank, "0.0");
		assert_eq!(rendered.term_binds, 1);
	}

	#[test]
	fn only_ranking_dialects_compute_rank() {
		for dialect in [Dialect::Postgres, Dialect::Sqlite] {
			let constant = render(dialect).rank == "0.0";

			assert_eq!(dialect.supports_ranking(), !constant, "{dialect}");
		}
	}

	#[test]
	fn sqlite_term_tokens_become_phrases() {
		assert_eq!(bind_term(Dialect::Sqlite, "hello world").as_deref(), Some("\"hello\" \"world\""));
		assert_eq!(bind_term(Dialect::Sqlite, "\"hello").as_deref(), Some("\" hello\""));
		assert_eq!(bind_term(Dialect::Sqlite, "hello) AND").as_deref(), Some("\"hello)\" \"AND\""));
		assert_eq!(bind_term(Dialect::Sqlite, "say\"hi\"").as_deref(), Some("\"say hi \""));
	}

	#[test]
	fn sqlite_term_without_token_characters_matches_nothing() {
		assert_eq!(bind_term(Dialect::Sqlite, "* NEAR/ -"), Some("\"NEAR/\"".to_string()));
		assert_eq!(bind_term(Dialect::Sqlite, "* \" ( -"), None);
	}

	#[test]
	fn postgres_term_is_bound_verbatim() {
		assert_eq!(bind_term(Dialect::Postgres, "\"hello) AND *").as_deref(), Some("\"hello) AND *"));
	}

	#[test]
	fn postgres_placeholders_are_numbered_outside_literals() {
		let sql = "SELECT '?' FROM t WHERE a = ? AND b IN (?, ?)";

		assert_eq!(
			bind_placeholders(Dialect::Postgres, sql),
			"SELECT '?' FROM t WHERE a = $1 AND b IN ($2, $3)"
		);
		assert_eq!(placeholder_count(sql), 3);
	}

	#[test]
	fn sqlite_placeholders_are_untouched() {
		let sql = "a = ? AND b = ?";

		assert_eq!(bind_placeholders(Dialect::Sqlite, sql), sql);
	}
}
