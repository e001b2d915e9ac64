use crate::{Error, Result, search::SearchField};

/// Scope and field restriction shared by every dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
	/// `room_id IN (...) AND (key = ? OR ...)` with `?` placeholders.
	pub clause: String,
	/// Scope values followed by field keys, in placeholder order.
	pub binds: Vec<String>,
}

/// Builds the scope membership and field disjunction clauses.
///
/// Either input being empty is rejected. An empty `IN ()` or `()` would be read as always true or
/// always false depending on the engine.
pub fn build<S, F>(scope: S, fields: F) -> Result<Predicate>
where
	S: IntoIterator,
	S::Item: AsRef<str>,
	F: IntoIterator<Item = SearchField>,
{
	let mut binds = scope.into_iter().map(|room| room.as_ref().to_string()).collect::<Vec<_>>();
	let scope_len = binds.len();

	if scope_len == 0 {
		return Err(Error::InvalidRequest {
			message: "scope must contain at least one room id.".to_string(),
		});
	}

	binds.extend(fields.into_iter().map(|field| field.as_str().to_string()));

	let field_len = binds.len() - scope_len;

	if field_len == 0 {
		return Err(Error::InvalidRequest {
			message: "fields must contain at least one search field.".to_string(),
		});
	}

	let clause = format!(
		"room_id IN ({}) AND ({})",
		vec!["?"; scope_len].join(", "),
		vec!["key = ?"; field_len].join(" OR "),
	);

	Ok(Predicate { clause, binds })
}
