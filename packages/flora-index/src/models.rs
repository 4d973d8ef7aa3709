use serde::{Deserialize, Serialize};

/// Metadata line as written by corpus builders. Builders disagree on whether the passage body
/// lives under `text` or `content`; unknown fields (section, category type) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPassage {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub text: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub content: Option<String>,
	#[serde(default)]
	pub latin_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub intent: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageRecord {
	/// Passage body. Empty when neither `text` nor `content` carried anything.
	pub text: String,
	pub latin_name: String,
	pub intent: Option<String>,
	pub source: Option<String>,
}
impl PassageRecord {
	/// Text handed to the embedder when the index is built.
	pub fn embedding_input(&self) -> String {
		if self.latin_name.is_empty() {
			self.text.clone()
		} else {
			format!("{}: {}", self.latin_name, self.text)
		}
	}

	pub fn to_raw(&self) -> RawPassage {
		RawPassage {
			text: Some(self.text.clone()),
			content: None,
			latin_name: Some(self.latin_name.clone()),
			intent: self.intent.clone(),
			source: self.source.clone(),
		}
	}
}
impl From<RawPassage> for PassageRecord {
	fn from(raw: RawPassage) -> Self {
		let text = raw
			.text
			.filter(|text| !text.is_empty())
			.or(raw.content.filter(|content| !content.is_empty()))
			.unwrap_or_default();

		Self {
			text,
			latin_name: raw.latin_name.unwrap_or_default(),
			intent: raw.intent,
			source: raw.source,
		}
	}
}
