use std::{cmp::Ordering, collections::HashSet};

use super::Candidate;
use flora_config::RankingDiversity;
use flora_domain::{intent, text};

/// Filters by intent, sorts by match specificity then score, and drops near duplicates.
pub fn rank_and_diversify(
	candidates: Vec<Candidate>,
	top_k: usize,
	intent: Option<&str>,
	policy: &RankingDiversity,
) -> Vec<Candidate> {
	let mut ranked = filter_intent(candidates, intent);

	sort_candidates(&mut ranked);

	select_diverse(ranked, top_k, policy)
}

/// Keeps candidates tagged with `wanted`. `None` keeps everything.
pub fn filter_intent(candidates: Vec<Candidate>, wanted: Option<&str>) -> Vec<Candidate> {
	let Some(wanted) = wanted else { return candidates };

	candidates
		.into_iter()
		.filter(|candidate| intent::intent_matches(candidate.intent.as_deref(), wanted))
		.collect()
}

pub fn sort_candidates(candidates: &mut [Candidate]) {
	candidates.sort_by(|a, b| {
		b.match_kind
			.specificity()
			.cmp(&a.match_kind.specificity())
			.then_with(|| cmp_f32_desc(a.score, b.score))
	});
}

/// Greedy walk over sorted candidates, skipping any whose prefix shingles overlap an accepted
/// candidate above the threshold.
pub fn select_diverse(
	candidates: Vec<Candidate>,
	top_k: usize,
	policy: &RankingDiversity,
) -> Vec<Candidate> {
	if !policy.enabled {
		return candidates.into_iter().take(top_k).collect();
	}

	let prefix_chars = policy.prefix_chars as usize;
	let shingle_size = policy.shingle_size as usize;
	let mut accepted: Vec<Candidate> = Vec::new();
	let mut accepted_shingles: Vec<HashSet<String>> = Vec::new();
	let mut skipped = 0_usize;

	for candidate in candidates {
		if accepted.len() >= top_k {
			break;
		}

		let shingles = text::shingles(&candidate.text, prefix_chars, shingle_size);
		let duplicate = accepted_shingles
			.iter()
			.any(|other| text::shingle_overlap(&shingles, other) > policy.sim_threshold);

		if duplicate {
			skipped += 1;

			continue;
		}

		accepted_shingles.push(shingles);
		accepted.push(candidate);
	}

	if skipped > 0 {
		tracing::debug!(skipped, "Dropped near-duplicate passages.");
	}

	accepted
}

/// Descending order with NaN last.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
