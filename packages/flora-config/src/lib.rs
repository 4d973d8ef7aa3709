mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Index, Providers, Ranking, RankingDiversity, Retrieval,
	Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("index.vectors_path", &cfg.index.vectors_path),
		("index.metadata_path", &cfg.index.metadata_path),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if !matches!(cfg.index.metric.as_str(), "inner_product" | "cosine") {
		return Err(Error::Validation {
			message: "index.metric must be one of inner_product or cosine.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}

	let retrieval = &cfg.retrieval;

	if retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if retrieval.max_top_k < retrieval.top_k {
		return Err(Error::Validation {
			message: "retrieval.max_top_k must be at least retrieval.top_k.".to_string(),
		});
	}
	if retrieval.clip_chars == 0 {
		return Err(Error::Validation {
			message: "retrieval.clip_chars must be greater than zero.".to_string(),
		});
	}
	if retrieval.overfetch_multiplier == 0 {
		return Err(Error::Validation {
			message: "retrieval.overfetch_multiplier must be at least one.".to_string(),
		});
	}

	let diversity = &cfg.ranking.diversity;

	if !diversity.sim_threshold.is_finite() {
		return Err(Error::Validation {
			message: "ranking.diversity.sim_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&diversity.sim_threshold) {
		return Err(Error::Validation {
			message: "ranking.diversity.sim_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if diversity.shingle_size == 0 {
		return Err(Error::Validation {
			message: "ranking.diversity.shingle_size must be greater than zero.".to_string(),
		});
	}
	if diversity.prefix_chars < diversity.shingle_size {
		return Err(Error::Validation {
			message:
				"ranking.diversity.prefix_chars must be at least ranking.diversity.shingle_size."
					.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.retrieval.default_intent = cfg.retrieval.default_intent.trim().to_lowercase();
	cfg.retrieval.care_terms =
		cfg.retrieval.care_terms.split_whitespace().collect::<Vec<_>>().join(" ");
}
