pub mod collector;
pub mod query;
pub mod ranking;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, FloraService, Result};
use flora_domain::{
	intent,
	taxon::{self, NormalizedName, TaxonRank},
};
use flora_index::{Neighbor, PassageIndex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievePassagesRequest {
	pub latin_name: String,
	#[serde(default)]
	pub top_k: Option<u32>,
	#[serde(default)]
	pub intent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievePassagesResponse {
	pub trace_id: Uuid,
	pub latin_name: String,
	pub rank: TaxonRank,
	pub pass: PassKind,
	pub items: Vec<Passage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
	pub text: String,
	pub latin_name: String,
	pub intent: Option<String>,
	pub source: Option<String>,
	pub score: f32,
	#[serde(rename = "match")]
	pub match_kind: MatchKind,
}
impl From<Candidate> for Passage {
	fn from(candidate: Candidate) -> Self {
		Self {
			text: candidate.text,
			latin_name: candidate.latin_name,
			intent: candidate.intent,
			source: candidate.source,
			score: candidate.score,
			match_kind: candidate.match_kind,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
	Species,
	Genus,
	None,
}
impl MatchKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Species => "species",
			Self::Genus => "genus",
			Self::None => "none",
		}
	}

	/// Higher is more specific.
	pub fn specificity(self) -> u8 {
		match self {
			Self::Species => 2,
			Self::Genus => 1,
			Self::None => 0,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
	Species,
	GenusFallback,
}

/// One passage under consideration within a single pass.
#[derive(Debug, Clone)]
pub struct Candidate {
	/// Position in the vector index and metadata table.
	pub record_id: i64,
	pub text: String,
	pub latin_name: String,
	pub intent: Option<String>,
	pub source: Option<String>,
	pub score: f32,
	pub match_kind: MatchKind,
}

impl FloraService {
	/// Species pass first; a genus pass only when the species pass found nothing at species level.
	pub async fn retrieve_passages(
		&self,
		req: RetrievePassagesRequest,
	) -> Result<RetrievePassagesResponse> {
		if req.latin_name.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "latin_name must be non-empty.".to_string(),
			});
		}

		let max_top_k = self.cfg.retrieval.max_top_k;
		let top_k = match req.top_k {
			Some(0) =>
				return Err(Error::InvalidRequest {
					message: "top_k must be greater than zero.".to_string(),
				}),
			Some(top_k) if top_k > max_top_k =>
				return Err(Error::InvalidRequest {
					message: format!("top_k must be at most {max_top_k}."),
				}),
			Some(top_k) => top_k as usize,
			None => self.cfg.retrieval.top_k as usize,
		};
		let intent =
			intent::resolve_intent(req.intent.as_deref(), &self.cfg.retrieval.default_intent);
		let name = taxon::normalize(&req.latin_name);
		let index = self.index.get().await?;
		let trace_id = Uuid::new_v4();
		let mut pass = PassKind::Species;
		let mut ranked =
			self.run_pass(&index, &name, TaxonRank::Species, top_k, intent.as_deref()).await?;

		if needs_genus_fallback(&name, &ranked) {
			tracing::info!(
				%trace_id,
				latin_name = %name.raw,
				genus = %name.genus,
				species_pass_len = ranked.len(),
				"No species-level passages, falling back to genus."
			);

			let genus_name = taxon::normalize(name.genus_token());
			let fallback = self
				.run_pass(&index, &genus_name, TaxonRank::Genus, top_k, intent.as_deref())
				.await?;

			// An empty genus pass keeps whatever the species pass found.
			if !fallback.is_empty() || ranked.is_empty() {
				pass = PassKind::GenusFallback;
				ranked = fallback;
			}
		}

		Ok(RetrievePassagesResponse {
			trace_id,
			latin_name: name.raw,
			rank: name.rank,
			pass,
			items: ranked.into_iter().map(Passage::from).collect(),
		})
	}

	async fn run_pass(
		&self,
		index: &Arc<PassageIndex>,
		name: &NormalizedName,
		mode: TaxonRank,
		top_k: usize,
		intent: Option<&str>,
	) -> Result<Vec<Candidate>> {
		let retrieval = &self.cfg.retrieval;
		let plan = query::build_queries(name, &retrieval.care_terms);
		let k =
			query::overfetch_k(top_k, retrieval.overfetch_multiplier, retrieval.overfetch_floor);
		let hits = self.search(index, &plan.queries, k).await?;
		let (candidates, stats) =
			collector::collect(&hits, index, name, mode, retrieval.clip_chars as usize);

		if stats.invalid_ids > 0 {
			tracing::debug!(invalid_ids = stats.invalid_ids, "Skipped out-of-range record ids.");
		}

		let ranked =
			ranking::rank_and_diversify(candidates, top_k, intent, &self.cfg.ranking.diversity);

		tracing::info!(
			mode = mode.as_str(),
			intent = intent.unwrap_or(retrieval.default_intent.as_str()),
			query = %name.raw,
			queries = plan.queries.len(),
			retrieved_k = stats.retrieved,
			duplicates = stats.duplicates,
			mode_filtered = stats.mode_filtered,
			used_k = ranked.len(),
			"Retrieval pass finished."
		);

		Ok(ranked)
	}

	/// Embeds all query variants in one batch and searches them on a blocking worker.
	async fn search(
		&self,
		index: &Arc<PassageIndex>,
		queries: &[String],
		k: usize,
	) -> Result<Vec<Vec<Neighbor>>> {
		let vectors =
			self.providers.embedding.embed(&self.cfg.providers.embedding, queries).await?;

		if vectors.len() != queries.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} queries.",
					vectors.len(),
					queries.len()
				),
			});
		}

		let index = Arc::clone(index);
		let hits = tokio::task::spawn_blocking(move || index.search(&vectors, k))
			.await
			.map_err(|err| Error::Index { message: format!("Search task failed: {err}") })??;

		Ok(hits)
	}
}

/// A species-rank name whose species pass holds no species match is retried at genus level. A
/// non-empty genus pass replaces whatever genus or unrelated passages the species pass found.
fn needs_genus_fallback(name: &NormalizedName, species_pass: &[Candidate]) -> bool {
	name.rank == TaxonRank::Species
		&& !species_pass.iter().any(|candidate| candidate.match_kind == MatchKind::Species)
}
