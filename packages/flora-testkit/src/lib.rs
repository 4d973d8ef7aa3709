mod error;

pub use error::{Error, Result};

use std::{
	env, fs,
	path::{Path, PathBuf},
};

use serde_json::Map;
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use flora_config::{Config, EmbeddingProviderConfig, Index, Providers, Ranking, Retrieval, Service};
use flora_index::{MetadataTable, PassageRecord, vectors};

/// Deterministic bag-of-words embedder.
///
/// Each lower-cased word is hashed into one signed slot, and the result is L2-normalized. Texts
/// sharing words score higher under the inner product, which is enough for retrieval tests.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedding {
	dim: usize,
}
impl HashEmbedding {
	pub fn new(dim: usize) -> Self {
		Self { dim }
	}

	pub fn dim(&self) -> usize {
		self.dim
	}

	pub fn embed(&self, text: &str) -> Vec<f32> {
		let mut out = vec![0.0_f32; self.dim];

		if self.dim == 0 {
			return out;
		}

		for word in text.unicode_words() {
			let hash = blake3::hash(word.to_lowercase().as_bytes());
			let bytes = hash.as_bytes();
			let mut slot_bytes = [0_u8; 8];

			slot_bytes.copy_from_slice(&bytes[..8]);

			let slot = (u64::from_le_bytes(slot_bytes) % self.dim as u64) as usize;
			let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };

			out[slot] += sign;
		}

		let norm = out.iter().map(|value| value * value).sum::<f32>().sqrt();

		if norm > 0.0 {
			out.iter_mut().for_each(|value| *value /= norm);
		}

		out
	}

	pub fn embed_all(&self, texts: &[String]) -> Vec<Vec<f32>> {
		texts.iter().map(|text| self.embed(text)).collect()
	}
}

/// Vector and metadata files for a small corpus in a unique temporary directory.
///
/// The directory is removed when the corpus is dropped.
pub struct TestCorpus {
	dir: PathBuf,
	index: Index,
	len: usize,
}
impl TestCorpus {
	pub fn new(embedder: &HashEmbedding, records: &[PassageRecord]) -> Result<Self> {
		if embedder.dim() == 0 {
			return Err(Error::Message("Test embedder dimension must be non-zero.".to_string()));
		}

		let dir = env::temp_dir().join(format!("flora_corpus_{}", Uuid::new_v4().simple()));

		fs::create_dir_all(&dir)?;

		let index = Index {
			vectors_path: dir.join("passages.fvec").to_string_lossy().into_owned(),
			metadata_path: dir.join("passages.jsonl").to_string_lossy().into_owned(),
			metric: "inner_product".to_string(),
		};
		let inputs: Vec<String> = records.iter().map(PassageRecord::embedding_input).collect();

		vectors::write_vectors(
			Path::new(&index.vectors_path),
			embedder.dim(),
			&embedder.embed_all(&inputs),
		)?;
		MetadataTable::write(Path::new(&index.metadata_path), records)?;

		Ok(Self { dir, index, len: records.len() })
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Full config pointing at this corpus, with every tuning value at its default.
	pub fn config(&self, dim: usize) -> Config {
		test_config(self.index.clone(), dim)
	}
}
impl Drop for TestCorpus {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.dir);
	}
}

pub fn passage(latin_name: &str, intent: Option<&str>, text: &str) -> PassageRecord {
	PassageRecord {
		text: text.to_string(),
		latin_name: latin_name.to_string(),
		intent: intent.map(str::to_string),
		source: Some("testkit".to_string()),
	}
}

pub fn test_config(index: Index, dim: usize) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		index,
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "hash".to_string(),
				dimensions: dim as u32,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		retrieval: Retrieval::default(),
		ranking: Ranking::default(),
	}
}
