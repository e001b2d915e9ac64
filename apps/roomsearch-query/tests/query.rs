use clap::Parser;

use roomsearch_query::{Args, hits};
use roomsearch_service::SearchService;
use roomsearch_storage::db::Db;
use roomsearch_testkit::IndexedEvent;

#[test]
fn args_default_to_body_field() {
	let args = Args::try_parse_from([
		"roomsearch-query",
		"-c",
		"cfg.toml",
		"-r",
		"!a",
		"-r",
		"!b",
		"hello",
	])
	.expect("Args must parse.");

	assert_eq!(args.rooms, vec!["!a", "!b"]);
	assert_eq!(args.fields, vec!["content.body"]);
	assert_eq!(args.term, "hello");
}

#[test]
fn args_require_a_room() {
	assert!(Args::try_parse_from(["roomsearch-query", "-c", "cfg.toml", "hello"]).is_err());
}

#[tokio::test]
async fn hits_follow_rank_order() {
	let pool = roomsearch_testkit::sqlite_memory_pool().await.expect("Failed to open SQLite.");
	let rows = vec![
		IndexedEvent::new("$b", "!room", "content.body", "lunch plans"),
		IndexedEvent::new("$a", "!room", "content.topic", "lunch"),
	];

	roomsearch_testkit::index_sqlite(&pool, &rows).await.expect("Failed to index rows.");
	roomsearch_testkit::store_sqlite_records(&pool, &rows).await.expect("Failed to store rows.");

	let service = SearchService::from_db(Db::from_sqlite(pool));
	let result = service
		.search_messages(&["!room"], "lunch", &["content.body", "content.topic"])
		.await
		.expect("Search must succeed.");
	let hits = hits(&result);

	assert_eq!(hits.iter().map(|hit| hit.event_id).collect::<Vec<_>>(), vec!["$a", "$b"]);
	assert_eq!(hits[1].event.content["content"]["body"], "lunch plans");

	let rendered = serde_json::to_value(&hits).expect("Hits must serialize.");

	assert_eq!(rendered[0]["event"]["room_id"], "!room");
}
