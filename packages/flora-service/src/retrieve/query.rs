use std::collections::HashSet;

use flora_domain::taxon::{NormalizedName, TaxonRank};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
	/// Enriched query strings, most specific first.
	pub queries: Vec<String>,
	pub rank: TaxonRank,
	pub genus: String,
}

/// Expands one name into the query variants searched in a single pass.
///
/// Species names yield the stripped name (when it differs from the input), the input, and the
/// genus token. Genus names yield the genus token alone. Every variant is suffixed with
/// `care_terms`.
pub fn build_queries(name: &NormalizedName, care_terms: &str) -> QueryPlan {
	let mut variants = Vec::new();
	let mut seen = HashSet::new();

	if name.rank == TaxonRank::Species {
		if name.stripped != name.raw {
			push_query(&mut variants, &mut seen, &name.stripped);
		}

		push_query(&mut variants, &mut seen, &name.raw);
	}

	push_query(&mut variants, &mut seen, name.genus_token());

	let care_terms = care_terms.trim();
	let queries = variants
		.into_iter()
		.map(|variant| {
			if care_terms.is_empty() { variant } else { format!("{variant} {care_terms}") }
		})
		.collect();

	QueryPlan { queries, rank: name.rank, genus: name.genus.clone() }
}

/// Neighbors requested per query so later filtering still fills `top_k`.
pub fn overfetch_k(top_k: usize, multiplier: u32, floor: u32) -> usize {
	top_k.saturating_mul(multiplier as usize).max(floor as usize)
}

fn push_query(out: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return;
	}

	if seen.insert(trimmed.to_lowercase()) {
		out.push(trimmed.to_string());
	}
}
