//! Passage vector index and its metadata table.
//!
//! Vector `i` in the index and record `i` in the metadata table describe the same passage. Every
//! search re-checks that the two sides still agree in length before any hit is resolved.

pub mod flat;
pub mod metadata;
pub mod models;
pub mod vectors;

mod error;

pub use error::Error;
pub use flat::{FlatIndex, Metric, Neighbor, VectorIndex};
pub use metadata::MetadataTable;
pub use models::{PassageRecord, RawPassage};

pub type Result<T, E = Error> = std::result::Result<T, E>;

use std::path::Path;

pub struct PassageIndex {
	vectors: Box<dyn VectorIndex>,
	metadata: MetadataTable,
}
impl PassageIndex {
	pub fn new(vectors: Box<dyn VectorIndex>, metadata: MetadataTable) -> Self {
		Self { vectors, metadata }
	}

	/// Reads both files named by the index config and checks that they line up.
	pub fn load(cfg: &flora_config::Index) -> Result<Self> {
		let metric = Metric::parse(&cfg.metric)?;
		let data = vectors::read_vectors(Path::new(&cfg.vectors_path))?;
		let metadata = MetadataTable::load(Path::new(&cfg.metadata_path))?;
		let index = Self::new(Box::new(FlatIndex::new(data, metric)), metadata);

		index.check_integrity()?;

		tracing::info!(
			vectors = index.len(),
			dim = index.dim(),
			metric = ?metric,
			"Passage index loaded."
		);

		Ok(index)
	}

	pub fn check_integrity(&self) -> Result<()> {
		let index_len = self.vectors.len();
		let metadata_len = self.metadata.len();

		if index_len != metadata_len {
			return Err(Error::Integrity { index_len, metadata_len });
		}

		Ok(())
	}

	/// Searches all queries at once, at most `k` hits per query.
	pub fn search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<Neighbor>>> {
		self.check_integrity()?;

		self.vectors.search(queries, k)
	}

	/// Resolves a search hit. Negative and out-of-range ids resolve to nothing.
	pub fn record(&self, id: i64) -> Option<&PassageRecord> {
		usize::try_from(id).ok().and_then(|idx| self.metadata.get(idx))
	}

	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}

	pub fn dim(&self) -> usize {
		self.vectors.dim()
	}
}
impl std::fmt::Debug for PassageIndex {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PassageIndex")
			.field("len", &self.vectors.len())
			.field("dim", &self.vectors.dim())
			.field("metadata_len", &self.metadata.len())
			.finish()
	}
}
