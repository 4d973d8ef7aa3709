use flora_domain::{
	intent,
	taxon::{self, TaxonRank},
	text,
};

#[test]
fn detects_rank_from_token_count() {
	let genus = taxon::normalize("Ficus");

	assert_eq!(genus.rank, TaxonRank::Genus);
	assert_eq!(genus.genus, "ficus");
	assert_eq!(genus.species_key(), None);

	let species = taxon::normalize("Ficus elastica");

	assert_eq!(species.rank, TaxonRank::Species);
	assert_eq!(species.genus, "ficus");
	assert_eq!(species.canonical, "ficus elastica");
	assert_eq!(species.species_key(), Some("ficus elastica"));
}

#[test]
fn strips_trailing_author() {
	let name = taxon::normalize("Aglaonema commutatum Schott");

	assert_eq!(name.canonical, "aglaonema commutatum");
	assert_eq!(name.stripped, "Aglaonema commutatum");
	assert_eq!(name.raw, "Aglaonema commutatum Schott");
}

#[test]
fn strips_rank_marker_with_its_epithet() {
	let name = taxon::normalize("Ficus elastica var. decora");

	assert_eq!(name.canonical, "ficus elastica");
	assert_eq!(name.rank, TaxonRank::Species);
}

#[test]
fn canonical_is_a_fixed_point() {
	for input in
		["Ficus elastica", "Monstera deliciosa", "Strelitzia", "Aglaonema commutatum Schott"]
	{
		let once = taxon::normalize(input);
		let twice = taxon::normalize(&once.canonical);

		assert_eq!(twice.canonical, once.canonical, "Input: {input}");
	}
}

#[test]
fn genus_is_first_token_of_canonical() {
	for input in ["Ficus elastica L.", "Hibiscus rosa-sinensis", "Aloe  vera", "Zamioculcas"] {
		let name = taxon::normalize(input);
		let first = name.canonical.split(' ').next().unwrap_or_default();

		assert_eq!(first, name.genus, "Input: {input}");
	}
}

#[test]
fn empty_name_degrades_quietly() {
	let name = taxon::normalize("   ");

	assert_eq!(name.genus, "");
	assert_eq!(name.canonical, "");
	assert_eq!(name.rank, TaxonRank::Genus);
}

#[test]
fn rank_serializes_in_snake_case() {
	let json = serde_json::to_string(&TaxonRank::Species).expect("Serialize failed.");

	assert_eq!(json, "\"species\"");
}

#[test]
fn clip_never_cuts_mid_word() {
	let text = "Поливать умеренно, давая верхнему слою почвы просохнуть между поливами \
		и избегая застоя воды в поддоне, особенно зимой при прохладном содержании";

	for limit in [20_usize, 37, 50, 64, 90] {
		let clipped = text::clip(text, limit);
		let head = clipped.strip_suffix(text::ELLIPSIS).expect("Truncated text carries ellipsis.");

		assert!(head.chars().count() <= limit, "Limit {limit}: {clipped}");
		assert!(text.starts_with(head), "Limit {limit}: {clipped}");

		let rest = &text[head.len()..];

		assert!(
			rest.starts_with(char::is_whitespace) || head.ends_with([',', '.', ';', '!', '?']),
			"Limit {limit} cut mid-word: {clipped}"
		);
	}
}

#[test]
fn clip_prefers_paragraph_break_in_tail() {
	let text = "First care paragraph about light\n\nSecond paragraph about soil mix";
	let clipped = text::clip(text, 40);

	assert_eq!(clipped, "First care paragraph about light…");
}

#[test]
fn near_duplicate_prefixes_overlap_above_threshold() {
	let lhs = text::shingles(
		"Монстера любит яркий рассеянный свет и регулярный полив летом.",
		200,
		5,
	);
	let rhs = text::shingles(
		"Монстера любит яркий рассеянный свет и регулярный полив весной.",
		200,
		5,
	);
	let other = text::shingles("Почва должна быть рыхлой, с добавлением коры и перлита.", 200, 5);

	assert!(text::shingle_overlap(&lhs, &rhs) > 0.6);
	assert!(text::shingle_overlap(&lhs, &other) < 0.6);
}

#[test]
fn default_intent_means_unscoped() {
	assert_eq!(intent::resolve_intent(None, "general"), None);
	assert_eq!(intent::resolve_intent(Some("General"), "general"), None);
	assert_eq!(intent::resolve_intent(Some("  "), "general"), None);
	assert_eq!(intent::resolve_intent(Some(" Watering "), "general"), Some("watering".into()));
}

#[test]
fn intent_match_is_case_insensitive() {
	assert!(intent::intent_matches(Some("Watering"), "watering"));
	assert!(!intent::intent_matches(Some("light"), "watering"));
	assert!(!intent::intent_matches(None, "watering"));
}
