use ahash::AHashSet;

use super::{Candidate, MatchKind};
use flora_domain::{
	taxon::{NormalizedName, TaxonRank},
	text,
};
use flora_index::{Neighbor, PassageIndex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
	/// Hits returned by the index across all query variants, out-of-range ids included.
	pub retrieved: usize,
	pub invalid_ids: usize,
	pub duplicates: usize,
	pub mode_filtered: usize,
	pub empty_text: usize,
}

/// Flattens per-query hits into candidates, first occurrence of each record wins.
///
/// In genus mode, records whose latin name does not start with the genus key are dropped.
pub fn collect(
	hits: &[Vec<Neighbor>],
	index: &PassageIndex,
	name: &NormalizedName,
	mode: TaxonRank,
	clip_chars: usize,
) -> (Vec<Candidate>, CollectStats) {
	let mut out = Vec::new();
	let mut seen = AHashSet::new();
	let mut stats = CollectStats::default();

	for hit in hits.iter().flatten() {
		stats.retrieved += 1;

		let Some(record) = index.record(hit.id) else {
			stats.invalid_ids += 1;

			continue;
		};

		if !seen.insert(hit.id) {
			stats.duplicates += 1;

			continue;
		}

		let latin_lower = record.latin_name.to_lowercase();

		if mode == TaxonRank::Genus && !latin_lower.starts_with(name.genus.as_str()) {
			stats.mode_filtered += 1;

			continue;
		}

		let body = record.text.trim();

		if body.is_empty() {
			stats.empty_text += 1;

			continue;
		}

		out.push(Candidate {
			record_id: hit.id,
			text: text::clip(body, clip_chars),
			latin_name: record.latin_name.clone(),
			intent: record.intent.clone(),
			source: record.source.clone(),
			score: hit.score,
			match_kind: classify(&latin_lower, name),
		});
	}

	(out, stats)
}

/// Most specific match of a lower-cased record name against the query name.
pub fn classify(latin_lower: &str, name: &NormalizedName) -> MatchKind {
	if name.species_key().is_some_and(|key| latin_lower.contains(key)) {
		MatchKind::Species
	} else if latin_lower.starts_with(name.genus.as_str()) {
		MatchKind::Genus
	} else {
		MatchKind::None
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use flora_domain::taxon;
	use flora_index::{
		FlatIndex, MetadataTable, Metric, PassageRecord, vectors::VectorData,
	};

	fn record(latin_name: &str, text: &str) -> PassageRecord {
		PassageRecord {
			text: text.to_string(),
			latin_name: latin_name.to_string(),
			intent: None,
			source: None,
		}
	}

	fn index(records: Vec<PassageRecord>) -> PassageIndex {
		let values = vec![0.0; records.len()];

		PassageIndex::new(
			Box::new(FlatIndex::new(VectorData { dim: 1, values }, Metric::InnerProduct)),
			MetadataTable::new(records),
		)
	}

	fn hit(id: i64, score: f32) -> Neighbor {
		Neighbor { score, id }
	}

	#[test]
	fn keeps_first_occurrence_and_skips_invalid_ids() {
		let index = index(vec![
			record("Ficus elastica", "Water sparingly."),
			record("Ficus", "Bright light."),
		]);
		let name = taxon::normalize("Ficus elastica");
		let hits = vec![
			vec![hit(0, 0.9), hit(-1, f32::NEG_INFINITY)],
			vec![hit(1, 0.8), hit(0, 0.95), hit(7, 0.1)],
		];
		let (candidates, stats) = collect(&hits, &index, &name, TaxonRank::Species, 450);

		assert_eq!(candidates.len(), 2);
		assert_eq!(candidates[0].record_id, 0);
		assert_eq!(candidates[0].score, 0.9);
		assert_eq!(candidates[0].match_kind, MatchKind::Species);
		assert_eq!(candidates[1].match_kind, MatchKind::Genus);
		assert_eq!(stats.invalid_ids, 2);
		assert_eq!(stats.duplicates, 1);
	}

	#[test]
	fn genus_mode_drops_sibling_genera() {
		let index =
			index(vec![record("Ficus lyrata", "Fiddle leaf."), record("Monstera", "Holes.")]);
		let name = taxon::normalize("Ficus");
		let (candidates, stats) =
			collect(&[vec![hit(0, 0.5), hit(1, 0.9)]], &index, &name, TaxonRank::Genus, 450);

		assert_eq!(candidates.len(), 1);
		assert_eq!(candidates[0].latin_name, "Ficus lyrata");
		assert_eq!(candidates[0].match_kind, MatchKind::Genus);
		assert_eq!(stats.mode_filtered, 1);
	}

	#[test]
	fn blank_text_is_skipped_and_long_text_clipped() {
		let long = "Лист ".repeat(200);
		let index = index(vec![record("Ficus", "   "), record("Ficus", &long)]);
		let name = taxon::normalize("Ficus");
		let (candidates, stats) =
			collect(&[vec![hit(0, 0.5), hit(1, 0.4)]], &index, &name, TaxonRank::Species, 50);

		assert_eq!(stats.empty_text, 1);
		assert_eq!(candidates.len(), 1);
		assert!(candidates[0].text.ends_with(text::ELLIPSIS));
		assert!(candidates[0].text.chars().count() <= 50 + text::ELLIPSIS.chars().count());
	}

	#[test]
	fn species_key_matches_cultivar_suffixes() {
		let name = taxon::normalize("Monstera deliciosa");

		assert_eq!(classify("monstera deliciosa 'thai constellation'", &name), MatchKind::Species);
		assert_eq!(classify("monstera adansonii", &name), MatchKind::Genus);
		assert_eq!(classify("philodendron", &name), MatchKind::None);
	}
}
