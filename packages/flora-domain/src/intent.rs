/// Resolves a caller intent into a scoping tag.
///
/// Blank intents and the configured default (e.g. `"general"`) mean no scoping.
pub fn resolve_intent(intent: Option<&str>, default_intent: &str) -> Option<String> {
	let key = intent?.trim().to_lowercase();

	if key.is_empty() || key == default_intent.trim().to_lowercase() {
		return None;
	}

	Some(key)
}

pub fn intent_matches(passage_intent: Option<&str>, wanted: &str) -> bool {
	let wanted = wanted.trim().to_lowercase();

	passage_intent.map(|intent| intent.trim().to_lowercase() == wanted).unwrap_or(false)
}
