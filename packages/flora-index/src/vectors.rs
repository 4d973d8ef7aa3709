//! Binary vector file.
//!
//! A bincode record with fixed-width little-endian integers: magic `FLORAVEC`, `u32` format
//! version, `u32` dimension, then the row-major `f32` values behind a `u64` length prefix.

use std::{fs, path::Path};

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Upper bound for a vector file we will encode or read back.
///
/// A corrupt length prefix fails decoding instead of requesting an enormous allocation.
pub const VECTOR_FILE_LIMIT_BYTES: u64 = 4 * 1024 * 1024 * 1024;

const MAGIC: [u8; 8] = *b"FLORAVEC";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct VectorData {
	pub dim: usize,
	/// Row-major values, `len() == dim * count`.
	pub values: Vec<f32>,
}
impl VectorData {
	pub fn count(&self) -> usize {
		if self.dim == 0 { 0 } else { self.values.len() / self.dim }
	}
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
	magic: [u8; 8],
	version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorFile {
	header: Header,
	dim: u32,
	values: Vec<f32>,
}

pub fn write_vectors(path: &Path, dim: usize, vectors: &[Vec<f32>]) -> Result<()> {
	let bytes = encode(dim, vectors)?;

	fs::write(path, bytes).map_err(|err| Error::Io { path: path.to_path_buf(), source: err })
}

pub fn read_vectors(path: &Path) -> Result<VectorData> {
	let io_err = |err: std::io::Error| Error::Io { path: path.to_path_buf(), source: err };
	let len = fs::metadata(path).map_err(io_err)?.len();

	if len > VECTOR_FILE_LIMIT_BYTES {
		return Err(Error::InvalidFormat {
			message: format!(
				"Vector file {} is {len} bytes, above the {VECTOR_FILE_LIMIT_BYTES} byte limit.",
				path.display()
			),
		});
	}

	let bytes = fs::read(path).map_err(io_err)?;

	decode(&bytes)
}

pub fn encode(dim: usize, vectors: &[Vec<f32>]) -> Result<Vec<u8>> {
	let dim_u32 = u32::try_from(dim)
		.map_err(|_| Error::InvalidFormat { message: format!("Dimension {dim} is too large.") })?;

	for (idx, vector) in vectors.iter().enumerate() {
		if vector.len() != dim {
			return Err(Error::InvalidFormat {
				message: format!("Vector {idx} has dimension {}, expected {dim}.", vector.len()),
			});
		}
	}

	let file = VectorFile {
		header: Header { magic: MAGIC, version: FORMAT_VERSION },
		dim: dim_u32,
		values: vectors.iter().flatten().copied().collect(),
	};

	bincode_options().serialize(&file).map_err(codec_err)
}

pub fn decode(bytes: &[u8]) -> Result<VectorData> {
	let header: Header =
		bincode_options().allow_trailing_bytes().deserialize(bytes).map_err(codec_err)?;

	if header.magic != MAGIC {
		return Err(Error::InvalidFormat { message: "Vector file magic mismatch.".to_string() });
	}
	if header.version != FORMAT_VERSION {
		return Err(Error::InvalidFormat {
			message: format!("Unsupported vector file version {}.", header.version),
		});
	}

	let file: VectorFile = bincode_options().deserialize(bytes).map_err(codec_err)?;
	let dim = file.dim as usize;

	if dim == 0 && !file.values.is_empty() {
		return Err(Error::InvalidFormat {
			message: "Vector file has vectors but zero dimension.".to_string(),
		});
	}
	if dim > 0 && file.values.len() % dim != 0 {
		return Err(Error::InvalidFormat {
			message: format!(
				"Vector payload holds {} values, not a multiple of dimension {dim}.",
				file.values.len()
			),
		});
	}

	Ok(VectorData { dim, values: file.values })
}

fn bincode_options() -> impl Options + Copy {
	bincode::DefaultOptions::new()
		.with_fixint_encoding()
		.with_little_endian()
		.with_limit(VECTOR_FILE_LIMIT_BYTES)
}

fn codec_err(err: bincode::Error) -> Error {
	Error::InvalidFormat { message: format!("Vector file is not decodable: {err}") }
}
