use std::sync::Arc;

use flora_service::FloraService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FloraService>,
}
impl AppState {
	/// The passage index is not touched here; it loads on the first retrieval.
	pub fn new(config: flora_config::Config) -> color_eyre::Result<Self> {
		let service = FloraService::new(config)?;

		Ok(Self { service: Arc::new(service) })
	}

	pub fn from_service(service: FloraService) -> Self {
		Self { service: Arc::new(service) }
	}
}
