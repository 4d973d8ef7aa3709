use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub index: Index,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub ranking: Ranking,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Index {
	/// Binary vector file written by `flora-indexer`.
	pub vectors_path: String,
	/// JSON Lines metadata table, one record per vector in the same order.
	pub metadata_path: String,
	#[serde(default = "default_metric")]
	pub metric: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	/// Largest `top_k` a caller may request.
	pub max_top_k: u32,
	/// Maximum passage length in characters before the ellipsis.
	pub clip_chars: u32,
	pub overfetch_multiplier: u32,
	pub overfetch_floor: u32,
	/// Intent value that means "no intent scoping".
	pub default_intent: String,
	/// Appended to every query variant to pull the embedding toward care passages.
	pub care_terms: String,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self {
			top_k: 12,
			max_top_k: 100,
			clip_chars: 450,
			overfetch_multiplier: 3,
			overfetch_floor: 24,
			default_intent: "general".to_string(),
			care_terms: "уход содержание полив свет температура влажность размножение почва"
				.to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub diversity: RankingDiversity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingDiversity {
	pub enabled: bool,
	pub prefix_chars: u32,
	pub shingle_size: u32,
	pub sim_threshold: f32,
}
impl Default for RankingDiversity {
	fn default() -> Self {
		Self { enabled: true, prefix_chars: 200, shingle_size: 5, sim_threshold: 0.6 }
	}
}

fn default_metric() -> String {
	"inner_product".to_string()
}
