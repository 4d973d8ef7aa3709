pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error(
		"Index integrity violated: index has {index_len} vectors, metadata has {metadata_len} records."
	)]
	Integrity { index_len: usize, metadata_len: usize },
	#[error("Index error: {message}")]
	Index { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
}
impl From<flora_index::Error> for Error {
	fn from(err: flora_index::Error) -> Self {
		match err {
			flora_index::Error::Integrity { index_len, metadata_len } =>
				Self::Integrity { index_len, metadata_len },
			flora_index::Error::InvalidQuery { message } => Self::Provider { message },
			other => Self::Index { message: other.to_string() },
		}
	}
}

impl From<flora_providers::Error> for Error {
	fn from(err: flora_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
