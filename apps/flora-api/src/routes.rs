use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use flora_service::{Error, RetrievePassagesRequest, RetrievePassagesResponse};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/passages/retrieve", post(retrieve_passages))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn retrieve_passages(
	State(state): State<AppState>,
	Json(payload): Json<RetrievePassagesRequest>,
) -> Result<Json<RetrievePassagesResponse>, ApiError> {
	let response = state.service.retrieve_passages(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			err @ Error::Integrity { .. } => {
				tracing::error!(error = %err, "Passage index failed its integrity check.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"index_integrity",
					err.to_string(),
					None,
				)
			},
			Error::Index { message } => {
				tracing::error!(error = %message, "Passage index unavailable.");

				ApiError::new(
					StatusCode::INTERNAL_SERVER_ERROR,
					"index_unavailable",
					"Passage index is unavailable.",
					None,
				)
			},
			Error::Provider { message } => {
				tracing::error!(error = %message, "Embedding provider failed.");

				ApiError::new(StatusCode::BAD_GATEWAY, "provider_error", message, None)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
