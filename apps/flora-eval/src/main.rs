use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = flora_eval::Args::parse();

	flora_eval::run(args).await
}
