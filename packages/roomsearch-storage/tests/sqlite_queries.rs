use roomsearch_config::Dialect;
use roomsearch_storage::{Error, db::Db, queries};
use roomsearch_testkit::IndexedEvent;

async fn seeded_db(rows: &[IndexedEvent]) -> Db {
	let pool = roomsearch_testkit::sqlite_memory_pool().await.expect("Failed to open SQLite.");

	roomsearch_testkit::index_sqlite(&pool, rows).await.expect("Failed to index rows.");
	roomsearch_testkit::store_sqlite_records(&pool, rows).await.expect("Failed to store records.");

	Db::from_sqlite(pool)
}

#[tokio::test]
async fn sqlite_pool_reports_sqlite_dialect() {
	let db = seeded_db(&[]).await;

	assert_eq!(db.dialect(), Dialect::Sqlite);
}

#[tokio::test]
async fn ranked_rows_bind_in_statement_order() {
	let db = seeded_db(&[
		IndexedEvent::new("$a", "!room1", "content.body", "hello world"),
		IndexedEvent::new("$b", "!room2", "content.body", "hello world"),
		IndexedEvent::new("$c", "!room1", "content.name", "hello world"),
	])
	.await;
	let sql = "\
SELECT 0.0 AS rank, event_id FROM event_search
WHERE value MATCH ? AND room_id IN (?) AND (key = ?)
ORDER BY rank DESC LIMIT 500";
	let binds = ["hello".to_string(), "!room1".to_string(), "content.body".to_string()];
	let rows = queries::fetch_ranked_rows(&db, sql, &binds).await.expect("Query must succeed.");

	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].event_id, "$a");
	assert_eq!(rows[0].rank, 0.0);
}

#[tokio::test]
async fn fetch_events_skips_unknown_ids() {
	let db = seeded_db(&[
		IndexedEvent::new("$a", "!room1", "content.body", "first"),
		IndexedEvent::new("$b", "!room1", "content.body", "second"),
	])
	.await;
	let ids = ["$a".to_string(), "$missing".to_string(), "$b".to_string()];
	let events = queries::fetch_events(&db, &ids).await.expect("Lookup must succeed.");

	assert_eq!(events.len(), 2);
	assert!(!events.contains_key("$missing"));

	let event = &events["$b"];

	assert_eq!(event.room_id, "!room1");
	assert_eq!(event.content["content"]["body"], "second");
}

#[tokio::test]
async fn fetch_events_with_no_ids_returns_empty_map() {
	let db = seeded_db(&[]).await;
	let events = queries::fetch_events(&db, &[]).await.expect("Lookup must succeed.");

	assert!(events.is_empty());
}

#[tokio::test]
async fn malformed_content_is_reported() {
	let pool = roomsearch_testkit::sqlite_memory_pool().await.expect("Failed to open SQLite.");

	sqlx::query("INSERT INTO events (event_id, room_id, content) VALUES ('$bad', '!room1', '{')")
		.execute(&pool)
		.await
		.expect("Failed to insert malformed event.");

	let db = Db::from_sqlite(pool);
	let err = queries::fetch_events(&db, &["$bad".to_string()])
		.await
		.expect_err("Malformed content must fail.");

	assert!(matches!(err, Error::InvalidRow(_)), "Unexpected error: {err}");
}

#[tokio::test]
async fn broken_statement_surfaces_sqlx_error() {
	let db = seeded_db(&[]).await;
	let err = queries::fetch_ranked_rows(&db, "SELECT rank FROM missing_table", &[])
		.await
		.expect_err("Missing table must fail.");

	assert!(matches!(err, Error::Sqlx(_)), "Unexpected error: {err}");
}
