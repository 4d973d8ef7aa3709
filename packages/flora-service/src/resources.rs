use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::{Error, Result};
use flora_index::PassageIndex;

/// Lazily loaded, process-wide passage index.
///
/// Concurrent first callers share one load. A failed load leaves the handle empty, so the next
/// call tries again.
pub struct IndexHandle {
	cfg: Option<flora_config::Index>,
	cell: OnceCell<Arc<PassageIndex>>,
}
impl IndexHandle {
	pub fn new(cfg: flora_config::Index) -> Self {
		Self { cfg: Some(cfg), cell: OnceCell::new() }
	}

	pub fn from_loaded(index: PassageIndex) -> Self {
		Self { cfg: None, cell: OnceCell::new_with(Some(Arc::new(index))) }
	}

	pub fn is_loaded(&self) -> bool {
		self.cell.initialized()
	}

	pub async fn get(&self) -> Result<Arc<PassageIndex>> {
		let index = self.cell.get_or_try_init(|| self.load()).await?;

		Ok(index.clone())
	}

	async fn load(&self) -> Result<Arc<PassageIndex>> {
		let Some(cfg) = self.cfg.clone() else {
			return Err(Error::Index { message: "Index handle has no source files.".to_string() });
		};
		let index = tokio::task::spawn_blocking(move || PassageIndex::load(&cfg))
			.await
			.map_err(|err| Error::Index { message: format!("Index load task failed: {err}") })?
			.inspect_err(|err| tracing::error!(error = %err, "Failed to load passage index."))?;

		Ok(Arc::new(index))
	}
}
