//! Corpus to index build.
//!
//! Vectors and metadata are written in the same order from the same filtered record list, so the
//! two files always agree in length. Both are staged next to their targets and only renamed into
//! place once both writes succeed.

use std::{
	ffi::OsString,
	fs,
	io::{self, BufRead, BufReader},
	path::{Path, PathBuf},
};

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::{Error, Result};
use flora_config::{Config, EmbeddingProviderConfig};
use flora_index::{MetadataTable, PassageRecord, RawPassage, vectors};
use flora_service::EmbeddingProvider;

pub const DEFAULT_BATCH_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
	pub read: usize,
	pub skipped: usize,
	pub indexed: usize,
}

/// Reads a JSON Lines corpus. Blank lines carry no record and are ignored.
pub fn read_corpus(path: &Path) -> Result<Vec<RawPassage>> {
	let file = fs::File::open(path)
		.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;
	let mut out = Vec::new();

	for (idx, line) in BufReader::new(file).lines().enumerate() {
		let line = line.map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

		if line.trim().is_empty() {
			continue;
		}

		let raw = serde_json::from_str(&line)
			.map_err(|err| Error::Corpus { line: idx + 1, source: err })?;

		out.push(raw);
	}

	Ok(out)
}

/// NFC-normalizes names and bodies and drops records without a body or a latin name.
///
/// Returns the kept records and the number skipped.
pub fn prepare_records(raw: Vec<RawPassage>) -> (Vec<PassageRecord>, usize) {
	let mut records = Vec::with_capacity(raw.len());
	let mut skipped = 0;

	for (idx, mut passage) in raw.into_iter().enumerate() {
		passage.text = passage.text.map(nfc).filter(|text| !text.trim().is_empty());
		passage.content = passage.content.map(nfc).filter(|content| !content.trim().is_empty());
		passage.latin_name = passage
			.latin_name
			.map(|name| nfc(name).split_whitespace().collect::<Vec<_>>().join(" "));

		let record = PassageRecord::from(passage);

		if record.text.is_empty() || record.latin_name.is_empty() {
			tracing::warn!(
				record = idx,
				has_text = !record.text.is_empty(),
				has_latin_name = !record.latin_name.is_empty(),
				"Skipping corpus record."
			);

			skipped += 1;

			continue;
		}

		records.push(record);
	}

	(records, skipped)
}

/// Embeds records in batches of `batch_size` and checks every vector against the configured
/// dimension.
pub async fn embed_records(
	provider: &dyn EmbeddingProvider,
	cfg: &EmbeddingProviderConfig,
	records: &[PassageRecord],
	batch_size: usize,
) -> Result<Vec<Vec<f32>>> {
	if batch_size == 0 {
		return Err(Error::Validation("batch_size must be greater than zero.".to_string()));
	}

	let dim = cfg.dimensions as usize;
	let mut out = Vec::with_capacity(records.len());

	for (batch_idx, batch) in records.chunks(batch_size).enumerate() {
		let inputs: Vec<String> = batch.iter().map(PassageRecord::embedding_input).collect();
		let vectors = provider.embed(cfg, &inputs).await?;

		if vectors.len() != inputs.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} inputs.",
					vectors.len(),
					inputs.len()
				),
			});
		}

		for (offset, vector) in vectors.iter().enumerate() {
			if vector.len() != dim {
				return Err(Error::Provider {
					message: format!(
						"Record {} embedded to dimension {}, expected {dim}.",
						batch_idx * batch_size + offset,
						vector.len()
					),
				});
			}
		}

		tracing::debug!(batch = batch_idx, size = batch.len(), "Embedded batch.");

		out.extend(vectors);
	}

	Ok(out)
}

/// Reads `corpus`, embeds it, and writes the vector and metadata files named by `cfg.index`.
pub async fn build_index(
	cfg: &Config,
	provider: &dyn EmbeddingProvider,
	corpus: &Path,
	batch_size: usize,
) -> Result<IndexReport> {
	let raw = read_corpus(corpus)?;
	let read = raw.len();
	let (records, skipped) = prepare_records(raw);
	let embedded =
		embed_records(provider, &cfg.providers.embedding, &records, batch_size).await?;
	let vectors_path = Path::new(&cfg.index.vectors_path);
	let metadata_path = Path::new(&cfg.index.metadata_path);

	for path in [vectors_path, metadata_path] {
		if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.map_err(|err| Error::Io { path: parent.to_path_buf(), source: err })?;
		}
	}

	let vectors_tmp = staging_path(vectors_path);
	let metadata_tmp = staging_path(metadata_path);
	let dim = cfg.providers.embedding.dimensions as usize;
	let written = vectors::write_vectors(&vectors_tmp, dim, &embedded)
		.and_then(|()| MetadataTable::write(&metadata_tmp, &records))
		.map_err(Error::from)
		.and_then(|()| publish(&metadata_tmp, metadata_path))
		.and_then(|()| publish(&vectors_tmp, vectors_path));

	if let Err(err) = written {
		for tmp in [&vectors_tmp, &metadata_tmp] {
			remove_best_effort(tmp);
		}

		return Err(err);
	}

	let report = IndexReport { read, skipped, indexed: records.len() };

	tracing::info!(
		read = report.read,
		skipped = report.skipped,
		indexed = report.indexed,
		vectors_path = %vectors_path.display(),
		metadata_path = %metadata_path.display(),
		"Passage index written."
	);

	Ok(report)
}

/// Hidden sibling of `path`, so the final rename never crosses a filesystem.
fn staging_path(path: &Path) -> PathBuf {
	let mut name = OsString::from(".");

	name.push(path.file_name().unwrap_or_default());
	name.push(format!(".tmp.{}", std::process::id()));

	path.with_file_name(name)
}

fn publish(tmp: &Path, path: &Path) -> Result<()> {
	fs::rename(tmp, path).map_err(|err| Error::Io { path: path.to_path_buf(), source: err })
}

fn remove_best_effort(path: &Path) {
	if let Err(err) = fs::remove_file(path)
		&& err.kind() != io::ErrorKind::NotFound
	{
		tracing::debug!(path = %path.display(), error = %err, "Failed to remove staged file.");
	}
}

fn nfc(value: String) -> String {
	value.nfc().collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(latin_name: Option<&str>, text: Option<&str>, content: Option<&str>) -> RawPassage {
		RawPassage {
			text: text.map(str::to_string),
			content: content.map(str::to_string),
			latin_name: latin_name.map(str::to_string),
			intent: None,
			source: None,
		}
	}

	#[test]
	fn skips_records_without_body_or_name() {
		let (records, skipped) = prepare_records(vec![
			raw(Some("Ficus elastica"), Some("Water weekly."), None),
			raw(Some("Ficus elastica"), Some("   "), Some("")),
			raw(None, Some("Orphan text."), None),
			raw(Some("  "), Some("Blank name."), None),
		]);

		assert_eq!(records.len(), 1);
		assert_eq!(skipped, 3);
	}

	#[test]
	fn blank_text_falls_back_to_content() {
		let passage = raw(Some("Monstera  deliciosa"), Some(" "), Some("Bright light."));
		let (records, skipped) = prepare_records(vec![passage]);

		assert_eq!(skipped, 0);
		assert_eq!(records[0].text, "Bright light.");
		assert_eq!(records[0].latin_name, "Monstera deliciosa");
	}

	#[test]
	fn staging_path_is_a_hidden_sibling() {
		let staged = staging_path(Path::new("out/passages.fvec"));

		assert_eq!(staged.parent(), Some(Path::new("out")));
		assert_eq!(
			staged.file_name().and_then(|name| name.to_str()),
			Some(format!(".passages.fvec.tmp.{}", std::process::id()).as_str())
		);
	}

	#[test]
	fn names_and_text_are_composed() {
		let (records, _) = prepare_records(vec![raw(
			Some("Ficus e\u{0301}lastica"),
			Some("Поли\u{0306}вайте."),
			None,
		)]);

		assert_eq!(records[0].latin_name, "Ficus \u{00e9}lastica");
		assert_eq!(records[0].text, "Пол\u{0439}вайте.");
	}
}
