use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Validation(String),
	#[error("I/O failure on {path:?}: {source}")]
	Io { path: PathBuf, source: std::io::Error },
	#[error("Invalid corpus record at line {line}: {source}")]
	Corpus { line: usize, source: serde_json::Error },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error(transparent)]
	Index(#[from] flora_index::Error),
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
