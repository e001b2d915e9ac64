use serde_json::{Map, Value};
use sqlx::{PgPool, SqlitePool, sqlite::SqlitePoolOptions};

use crate::Result;

const SQLITE_SCHEMA: &str = "\
CREATE VIRTUAL TABLE IF NOT EXISTS event_search USING fts4 (event_id, room_id, key, value);
CREATE TABLE IF NOT EXISTS events (
	event_id TEXT PRIMARY KEY,
	room_id TEXT NOT NULL,
	content TEXT NOT NULL
)";
const PG_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS event_search (
	event_id TEXT NOT NULL,
	room_id TEXT NOT NULL,
	key TEXT NOT NULL,
	vector tsvector NOT NULL
);
CREATE INDEX IF NOT EXISTS event_search_fts_idx ON event_search USING gin(vector);
CREATE TABLE IF NOT EXISTS events (
	event_id TEXT PRIMARY KEY,
	room_id TEXT NOT NULL,
	content TEXT NOT NULL
)";

/// One row of the search index.
#[derive(Debug, Clone)]
pub struct IndexedEvent {
	pub event_id: String,
	pub room_id: String,
	pub key: String,
	pub value: String,
}
impl IndexedEvent {
	pub fn new(event_id: &str, room_id: &str, key: &str, value: &str) -> Self {
		Self {
			event_id: event_id.to_string(),
			room_id: room_id.to_string(),
			key: key.to_string(),
			value: value.to_string(),
		}
	}

	/// The stored record for this row, with the indexed value as its content.
	pub fn record(&self) -> (String, String, Value) {
		let field = self.key.strip_prefix("content.").unwrap_or(self.key.as_str());
		let mut content = Map::new();

		content.insert(field.to_string(), Value::String(self.value.clone()));

		(self.event_id.clone(), self.room_id.clone(), serde_json::json!({ "content": content }))
	}
}

/// Single-connection in-memory SQLite pool. The pool never recycles its connection, so the
/// database lives as long as the pool.
pub async fn sqlite_memory_pool() -> Result<SqlitePool> {
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.min_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect("sqlite::memory:")
		.await?;

	for statement in split_statements(SQLITE_SCHEMA) {
		sqlx::query(statement).execute(&pool).await?;
	}

	Ok(pool)
}

pub async fn create_pg_schema(pool: &PgPool) -> Result<()> {
	for statement in split_statements(PG_SCHEMA) {
		sqlx::query(statement).execute(pool).await?;
	}

	Ok(())
}

pub async fn index_sqlite(pool: &SqlitePool, rows: &[IndexedEvent]) -> Result<()> {
	for row in rows {
		sqlx::query("INSERT INTO event_search (event_id, room_id, key, value) VALUES (?, ?, ?, ?)")
			.bind(row.event_id.as_str())
			.bind(row.room_id.as_str())
			.bind(row.key.as_str())
			.bind(row.value.as_str())
			.execute(pool)
			.await?;
	}

	Ok(())
}

pub async fn index_pg(pool: &PgPool, rows: &[IndexedEvent]) -> Result<()> {
	for row in rows {
		sqlx::query(
			"\
INSERT INTO event_search (event_id, room_id, key, vector)
VALUES ($1, $2, $3, to_tsvector('english', $4))",
		)
		.bind(row.event_id.as_str())
		.bind(row.room_id.as_str())
		.bind(row.key.as_str())
		.bind(row.value.as_str())
		.execute(pool)
		.await?;
	}

	Ok(())
}

pub async fn store_sqlite_records(pool: &SqlitePool, rows: &[IndexedEvent]) -> Result<()> {
	for (event_id, room_id, content) in rows.iter().map(IndexedEvent::record) {
		sqlx::query("INSERT OR REPLACE INTO events (event_id, room_id, content) VALUES (?, ?, ?)")
			.bind(event_id)
			.bind(room_id)
			.bind(content.to_string())
			.execute(pool)
			.await?;
	}

	Ok(())
}

pub async fn store_pg_records(pool: &PgPool, rows: &[IndexedEvent]) -> Result<()> {
	for (event_id, room_id, content) in rows.iter().map(IndexedEvent::record) {
		sqlx::query(
			"\
INSERT INTO events (event_id, room_id, content)
VALUES ($1, $2, $3)
ON CONFLICT (event_id) DO UPDATE SET room_id = EXCLUDED.room_id, content = EXCLUDED.content",
		)
		.bind(event_id)
		.bind(room_id)
		.bind(content.to_string())
		.execute(pool)
		.await?;
	}

	Ok(())
}

fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|statement| !statement.is_empty())
}
