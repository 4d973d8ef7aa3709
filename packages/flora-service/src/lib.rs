pub mod retrieve;

mod error;
mod resources;

pub use error::{Error, Result};
pub use resources::IndexHandle;
pub use retrieve::{
	Candidate, MatchKind, Passage, PassKind, RetrievePassagesRequest, RetrievePassagesResponse,
};

use std::{future::Future, pin::Pin, sync::Arc};

use flora_config::{Config, EmbeddingProviderConfig};
use flora_providers::embedding::EmbeddingClient;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

/// Embedding provider backed by the configured HTTP endpoint.
pub struct HttpEmbedding {
	client: EmbeddingClient,
}
impl HttpEmbedding {
	pub fn new(cfg: &EmbeddingProviderConfig) -> Result<Self> {
		Ok(Self { client: EmbeddingClient::new(cfg)? })
	}
}

impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(self.client.embed(cfg, texts).await?) })
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}

	pub fn from_config(cfg: &Config) -> Result<Self> {
		Ok(Self::new(Arc::new(HttpEmbedding::new(&cfg.providers.embedding)?)))
	}
}

pub struct FloraService {
	pub cfg: Config,
	pub providers: Providers,
	pub index: IndexHandle,
}
impl FloraService {
	/// Builds the HTTP embedding provider. The passage index is loaded on first use.
	pub fn new(cfg: Config) -> Result<Self> {
		let providers = Providers::from_config(&cfg)?;
		let index = IndexHandle::new(cfg.index.clone());

		Ok(Self { cfg, providers, index })
	}

	pub fn with_parts(cfg: Config, providers: Providers, index: IndexHandle) -> Self {
		Self { cfg, providers, index }
	}
}
