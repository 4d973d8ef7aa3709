pub mod indexer;

mod error;

pub use error::{Error, Result};

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flora_service::Providers;

#[derive(Debug, Parser)]
#[command(
	version = flora_cli::VERSION,
	rename_all = "kebab",
	styles = flora_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Corpus in JSON Lines, one passage per line.
	#[arg(long, value_name = "FILE")]
	pub corpus: PathBuf,
	#[arg(long, value_name = "N", default_value_t = indexer::DEFAULT_BATCH_SIZE)]
	pub batch_size: usize,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = flora_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let providers = Providers::from_config(&config)?;
	let report =
		indexer::build_index(&config, providers.embedding.as_ref(), &args.corpus, args.batch_size)
			.await?;

	println!("{}", serde_json::to_string_pretty(&report)?);

	Ok(())
}
