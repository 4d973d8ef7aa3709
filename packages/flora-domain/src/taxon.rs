//! Taxonomic name normalization.
//!
//! Identification services hand back names such as `"Aglaonema commutatum Schott"` or
//! `"Ficus elastica var. decora"`. Retrieval compares them against the latin names carried by
//! corpus passages, so both sides need one canonical, lower-cased key and a genus key.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Infraspecific rank marker plus the epithet that follows it.
static RANK_MARKER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)\s+(?:var\.|subsp\.|ssp\.)\s+\w+").expect("Rank marker pattern is valid.")
});
/// Capitalized word or capitalized abbreviation at the end of a token.
static AUTHOR_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(?:[A-Z][a-z]+\.?|[A-Z]\.)$").expect("Author suffix pattern is valid.")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonRank {
	Species,
	Genus,
}
impl TaxonRank {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Species => "species",
			Self::Genus => "genus",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
	/// Input with whitespace runs collapsed, original case.
	pub raw: String,
	/// Input with rank markers and a trailing author removed, original case.
	pub stripped: String,
	/// `stripped`, lower-cased. Comparison key.
	pub canonical: String,
	/// First token of the input, lower-cased.
	pub genus: String,
	pub rank: TaxonRank,
}
impl NormalizedName {
	/// First token of the input in its original case, used when building query text.
	pub fn genus_token(&self) -> &str {
		self.raw.split(' ').next().unwrap_or_default()
	}

	/// Key for species-level matching. Genus-rank names have none.
	pub fn species_key(&self) -> Option<&str> {
		if self.rank == TaxonRank::Species && !self.canonical.is_empty() {
			Some(self.canonical.as_str())
		} else {
			None
		}
	}
}

/// Normalizes a free-form taxonomic name.
///
/// Never fails. An empty input yields empty keys with genus rank; callers are expected not to
/// pass one.
pub fn normalize(name: &str) -> NormalizedName {
	let composed: String = name.nfc().collect();
	let raw = composed.split_whitespace().collect::<Vec<_>>().join(" ");
	let rank = detect_rank(&raw);
	let genus = raw.split(' ').next().unwrap_or_default().to_lowercase();
	let stripped = strip_authors(&raw);
	let canonical = stripped.to_lowercase();

	NormalizedName { raw, stripped, canonical, genus, rank }
}

pub fn detect_rank(name: &str) -> TaxonRank {
	if name.split_whitespace().count() >= 2 { TaxonRank::Species } else { TaxonRank::Genus }
}

/// Removes infraspecific rank markers and a trailing authorship token.
///
/// The author check only applies to names that still have three or more tokens, so a plain
/// binomial is never read as genus plus author. Only trailing tokens are removed.
pub fn strip_authors(name: &str) -> String {
	let without_marker = RANK_MARKER.replace_all(name, "");
	let mut parts: Vec<&str> = without_marker.split_whitespace().collect();

	if parts.len() >= 3
		&& let Some(last) = parts.last()
		&& AUTHOR_SUFFIX.is_match(last)
	{
		parts.pop();
	}

	parts.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rank_marker_is_case_insensitive() {
		assert_eq!(strip_authors("Ficus elastica VAR. decora"), "Ficus elastica");
		assert_eq!(strip_authors("Ficus elastica subsp. decora"), "Ficus elastica");
		assert_eq!(strip_authors("Ficus elastica ssp. decora"), "Ficus elastica");
	}

	#[test]
	fn binomial_is_never_read_as_author() {
		assert_eq!(strip_authors("Ficus Benjamina"), "Ficus Benjamina");
	}

	#[test]
	fn patterns_compile() {
		LazyLock::force(&RANK_MARKER);
		LazyLock::force(&AUTHOR_SUFFIX);
	}

	#[test]
	fn abbreviated_author_is_removed() {
		assert_eq!(strip_authors("Ficus benjamina L."), "Ficus benjamina");
		assert_eq!(strip_authors("Monstera deliciosa Liebm."), "Monstera deliciosa");
	}
}
