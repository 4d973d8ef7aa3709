use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("I/O failure on {path:?}: {source}")]
	Io { path: PathBuf, source: std::io::Error },
	#[error("Invalid metadata record at line {line}: {source}")]
	Metadata { line: usize, source: serde_json::Error },
	#[error("Invalid format: {message}")]
	InvalidFormat { message: String },
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error(
		"Vector index and metadata disagree: index has {index_len} vectors, metadata has {metadata_len} records."
	)]
	Integrity { index_len: usize, metadata_len: usize },
}
