use std::collections::HashMap;

use serde_json::Value;
use sqlx::{Postgres, QueryBuilder, Row, Sqlite};

use crate::{
	Error, Result,
	db::{Db, Pool},
	models::{EventRecord, RankedRow},
};

/// Runs a fully rendered ranking statement.
///
/// `sql` must already use the placeholder style of the pool's dialect and reference exactly
/// `binds.len()` parameters in order. The statement must expose `rank` and `event_id` columns.
pub async fn fetch_ranked_rows(db: &Db, sql: &str, binds: &[String]) -> Result<Vec<RankedRow>> {
	match &db.pool {
		Pool::Postgres(pool) => {
			let mut query = sqlx::query(sql);

			for value in binds {
				query = query.bind(value.as_str());
			}

			let rows = query.fetch_all(pool).await?;

			rows.iter()
				.map(|row| -> Result<RankedRow> {
					// ts_rank_cd yields float4.
					let rank: f32 = row.try_get("rank")?;

					Ok(RankedRow { event_id: row.try_get("event_id")?, rank: f64::from(rank) })
				})
				.collect()
		},
		Pool::Sqlite(pool) => {
			let mut query = sqlx::query(sql);

			for value in binds {
				query = query.bind(value.as_str());
			}

			let rows = query.fetch_all(pool).await?;

			rows.iter()
				.map(|row| -> Result<RankedRow> {
					Ok(RankedRow { event_id: row.try_get("event_id")?, rank: row.try_get("rank")? })
				})
				.collect()
		},
	}
}

/// Loads events by id from the `events(event_id, room_id, content)` table.
///
/// Ids with no stored event are absent from the returned map. `content` holds a JSON document as
/// text.
pub async fn fetch_events(db: &Db, event_ids: &[String]) -> Result<HashMap<String, EventRecord>> {
	if event_ids.is_empty() {
		return Ok(HashMap::new());
	}

	let rows: Vec<(String, String, String)> = match &db.pool {
		Pool::Postgres(pool) => {
			let mut builder = QueryBuilder::<Postgres>::new(
				"SELECT event_id, room_id, content FROM events WHERE event_id IN (",
			);
			let mut separated = builder.separated(", ");

			for event_id in event_ids {
				separated.push_bind(event_id.as_str());
			}

			separated.push_unseparated(")");

			builder.build_query_as().fetch_all(pool).await?
		},
		Pool::Sqlite(pool) => {
			let mut builder = QueryBuilder::<Sqlite>::new(
				"SELECT event_id, room_id, content FROM events WHERE event_id IN (",
			);
			let mut separated = builder.separated(", ");

			for event_id in event_ids {
				separated.push_bind(event_id.as_str());
			}

			separated.push_unseparated(")");

			builder.build_query_as().fetch_all(pool).await?
		},
	};
	let mut events = HashMap::with_capacity(rows.len());

	for (event_id, room_id, content) in rows {
		let content: Value = serde_json::from_str(&content).map_err(|err| {
			Error::InvalidRow(format!("event {event_id} has malformed content: {err}"))
		})?;

		events.insert(event_id.clone(), EventRecord { event_id, room_id, content });
	}

	Ok(events)
}
