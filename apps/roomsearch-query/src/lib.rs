use std::{io::Write, path::PathBuf};

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use roomsearch_service::{EventRecord, SearchResult, SearchService};
use roomsearch_storage::db::Db;

#[derive(Debug, Parser)]
#[command(
	version = roomsearch_cli::VERSION,
	rename_all = "kebab",
	styles = roomsearch_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Room to search in. Repeat to search several rooms.
	#[arg(long = "room", short = 'r', value_name = "ROOM_ID", required = true)]
	pub rooms: Vec<String>,
	/// Field to match against. Repeat to match several fields.
	#[arg(long = "field", short = 'f', value_name = "KEY", default_value = "content.body")]
	pub fields: Vec<String>,
	pub term: String,
}

#[derive(Debug, Serialize)]
pub struct Hit<'a> {
	pub event_id: &'a str,
	pub rank: f64,
	pub event: &'a EventRecord,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = roomsearch_config::load(&args.config)?;
	init_tracing(&config);
	let db = Db::connect(&config.storage).await?;
	let service = SearchService::from_db(db);
	let result =
		service.search_messages(args.rooms.as_slice(), &args.term, args.fields.as_slice()).await?;
	tracing::info!(hits = result.len(), "Search finished.");

	let mut stdout = std::io::stdout().lock();
	serde_json::to_writer_pretty(&mut stdout, &hits(&result))?;
	writeln!(stdout)?;
	Ok(())
}

/// Orders a result by rank for display.
pub fn hits(result: &SearchResult<EventRecord>) -> Vec<Hit<'_>> {
	result
		.ranked_ids()
		.into_iter()
		.filter_map(|event_id| {
			Some(Hit {
				event_id,
				rank: *result.ranks().get(event_id)?,
				event: result.records().get(event_id)?,
			})
		})
		.collect()
}

fn init_tracing(config: &roomsearch_config::Config) {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
