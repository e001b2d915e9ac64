//! Merges ranked index rows with authoritative records.
//!
//! The search index and the record store are only eventually consistent. A row whose record is
//! gone (deleted, redacted, or not yet readable) is dropped from the result without an error. This
//! is the single place where a search silently loses rows.

use std::collections::{HashMap, HashSet};

use crate::{RankedRow, RecordStore, Result, search::SearchResult};

/// Hydrates `rows` with one batched record lookup and drops rows without a record.
///
/// The record store is not called when `rows` is empty.
pub async fn reconcile<R>(rows: Vec<RankedRow>, store: &R) -> Result<SearchResult<R::Record>>
where
	R: RecordStore + ?Sized,
{
	let ids = distinct_ids(&rows);

	if ids.is_empty() {
		return Ok(SearchResult::default());
	}

	let hydrated = store.fetch_records(&ids).await?;
	let result = merge(rows, hydrated);
	let dropped = ids.len() - result.len();

	if dropped > 0 {
		tracing::debug!(
			dropped,
			requested = ids.len(),
			"Dropped index rows whose records could not be hydrated."
		);
	}

	Ok(result)
}

/// Pairs rows with hydrated records.
///
/// Rows are expected in rank order, so when an id repeats the first (highest) rank wins. Records
/// with no corresponding row are discarded.
pub fn merge<T>(rows: Vec<RankedRow>, mut hydrated: HashMap<String, T>) -> SearchResult<T> {
	let mut ranks = HashMap::with_capacity(rows.len());
	let mut records = HashMap::with_capacity(rows.len());

	for row in rows {
		if ranks.contains_key(&row.event_id) {
			continue;
		}

		let Some(record) = hydrated.remove(&row.event_id) else {
			continue;
		};

		records.insert(row.event_id.clone(), record);
		ranks.insert(row.event_id, row.rank);
	}

	SearchResult { ranks, records }
}

fn distinct_ids(rows: &[RankedRow]) -> Vec<String> {
	let mut seen = HashSet::with_capacity(rows.len());
	let mut ids = Vec::with_capacity(rows.len());

	for row in rows {
		if seen.insert(row.event_id.as_str()) {
			ids.push(row.event_id.clone());
		}
	}

	ids
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use crate::{
		RankedRow,
		search::reconcile::{distinct_ids, merge},
	};

	fn row(event_id: &str, rank: f64) -> RankedRow {
		RankedRow { event_id: event_id.to_string(), rank }
	}

	#[test]
	fn missing_records_drop_from_both_maps() {
		let hydrated = HashMap::from([("$a".to_string(), 1), ("$c".to_string(), 3)]);
		let result = merge(vec![row("$a", 0.9), row("$b", 0.5), row("$c", 0.1)], hydrated);

		assert_eq!(result.len(), 2);
		assert!(result.ranks().get("$b").is_none());
		assert!(result.records().get("$b").is_none());
		assert_eq!(result.records()["$c"], 3);
	}

	#[test]
	fn duplicate_rows_keep_the_first_rank() {
		let hydrated = HashMap::from([("$a".to_string(), ())]);
		let result = merge(vec![row("$a", 0.8), row("$a", 0.2)], hydrated);

		assert_eq!(result.ranks()["$a"], 0.8);
	}

	#[test]
	fn unrequested_records_are_ignored() {
		let hydrated = HashMap::from([("$a".to_string(), ()), ("$z".to_string(), ())]);
		let result = merge(vec![row("$a", 0.0)], hydrated);

		assert_eq!(result.len(), 1);
		assert!(!result.records().contains_key("$z"));
	}

	#[test]
	fn distinct_ids_preserve_first_occurrence() {
		let ids = distinct_ids(&[row("$b", 0.9), row("$a", 0.5), row("$b", 0.1)]);

		assert_eq!(ids, vec!["$b", "$a"]);
	}
}
