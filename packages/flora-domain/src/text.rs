use std::collections::HashSet;

use unicode_segmentation::UnicodeSegmentation;

pub const ELLIPSIS: &str = "…";

/// Boundary patterns and whether the cut keeps the pattern's first character.
const SENTENCE_BOUNDARIES: [(&str, bool); 5] =
	[(". ", true), ("!", true), ("?", true), (";", true), ("\n\n", false)];

/// Clips `text` to at most `max_chars` characters plus [`ELLIPSIS`].
///
/// Prefers the last sentence boundary inside the final 40% of the window, then the last
/// whitespace. Text already within the limit is returned unchanged.
pub fn clip(text: &str, max_chars: usize) -> String {
	let Some((limit, _)) = text.char_indices().nth(max_chars) else { return text.to_string() };
	let window = &text[..limit];
	let tail_start = text.char_indices().nth(max_chars * 6 / 10).map(|(idx, _)| idx).unwrap_or(0);
	let head = sentence_cut(window, tail_start)
		.or_else(|| word_cut(text, limit))
		.map(|cut| window[..cut].trim_end())
		.filter(|head| !head.is_empty())
		.unwrap_or_else(|| grapheme_cut(text, limit));

	format!("{head}{ELLIPSIS}")
}

/// Character shingles over the first `prefix_chars` characters, lower-cased with whitespace
/// collapsed. Text shorter than one shingle becomes a single shingle.
pub fn shingles(text: &str, prefix_chars: usize, size: usize) -> HashSet<String> {
	let prefix: String = text.chars().take(prefix_chars).collect();
	let chars: Vec<char> =
		prefix.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase().chars().collect();

	if chars.is_empty() || size == 0 {
		return HashSet::new();
	}
	if chars.len() <= size {
		return HashSet::from([chars.into_iter().collect::<String>()]);
	}

	chars.windows(size).map(|window| window.iter().collect::<String>()).collect()
}

/// Jaccard overlap of two shingle sets. Empty sets never overlap.
pub fn shingle_overlap(lhs: &HashSet<String>, rhs: &HashSet<String>) -> f32 {
	if lhs.is_empty() || rhs.is_empty() {
		return 0.0;
	}

	let intersection = lhs.intersection(rhs).count();
	let union = lhs.len() + rhs.len() - intersection;

	intersection as f32 / union as f32
}

fn sentence_cut(window: &str, tail_start: usize) -> Option<usize> {
	let tail = &window[tail_start..];

	SENTENCE_BOUNDARIES
		.iter()
		.filter_map(|(pattern, keep_first)| {
			tail.rfind(pattern).map(|pos| {
				let keep =
					if *keep_first { pattern.chars().next().map_or(0, char::len_utf8) } else { 0 };

				tail_start + pos + keep
			})
		})
		.max()
}

fn word_cut(text: &str, limit: usize) -> Option<usize> {
	if text[limit..].starts_with(char::is_whitespace) {
		return Some(limit);
	}

	text[..limit].rfind(char::is_whitespace)
}

fn grapheme_cut(text: &str, limit: usize) -> &str {
	let end = text
		.grapheme_indices(true)
		.map(|(idx, grapheme)| idx + grapheme.len())
		.take_while(|end| *end <= limit)
		.last()
		.unwrap_or(0);

	&text[..end]
}
