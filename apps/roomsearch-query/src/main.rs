use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = roomsearch_query::Args::parse();
	roomsearch_query::run(args).await
}
