use std::{
	fs::File,
	io::{BufRead, BufReader, BufWriter, Write},
	path::Path,
};

use crate::{
	Error, Result,
	models::{PassageRecord, RawPassage},
};

/// Passage records in vector order. Record `i` describes vector `i`.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
	records: Vec<PassageRecord>,
}
impl MetadataTable {
	pub fn new(records: Vec<PassageRecord>) -> Self {
		Self { records }
	}

	pub fn load(path: &Path) -> Result<Self> {
		let file =
			File::open(path).map_err(|err| Error::Io { path: path.to_path_buf(), source: err })?;

		Self::from_reader(BufReader::new(file)).map_err(|err| match err {
			Error::Io { source, .. } => Error::Io { path: path.to_path_buf(), source },
			other => other,
		})
	}

	/// Parses JSON Lines. Every line must hold a record so that positions stay aligned with the
	/// vector file; a trailing newline at end of input is allowed.
	pub fn from_reader(reader: impl BufRead) -> Result<Self> {
		let mut records = Vec::new();

		for (idx, line) in reader.lines().enumerate() {
			let line = line.map_err(|err| Error::Io { path: Default::default(), source: err })?;

			if line.trim().is_empty() {
				return Err(Error::InvalidFormat {
					message: format!("Metadata line {} is blank.", idx + 1),
				});
			}

			let raw: RawPassage = serde_json::from_str(&line)
				.map_err(|err| Error::Metadata { line: idx + 1, source: err })?;

			records.push(PassageRecord::from(raw));
		}

		Ok(Self { records })
	}

	pub fn write(path: &Path, records: &[PassageRecord]) -> Result<()> {
		let io_err = |err: std::io::Error| Error::Io { path: path.to_path_buf(), source: err };
		let file = File::create(path).map_err(io_err)?;
		let mut writer = BufWriter::new(file);

		for (idx, record) in records.iter().enumerate() {
			let line = serde_json::to_string(&record.to_raw())
				.map_err(|err| Error::Metadata { line: idx + 1, source: err })?;

			writeln!(writer, "{line}").map_err(io_err)?;
		}

		writer.flush().map_err(io_err)?;

		Ok(())
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn get(&self, idx: usize) -> Option<&PassageRecord> {
		self.records.get(idx)
	}
}
