use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = flora_indexer::Args::parse();

	flora_indexer::run(args).await
}
