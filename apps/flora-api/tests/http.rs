use std::sync::Arc;

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use flora_api::{routes, state::AppState};
use flora_config::EmbeddingProviderConfig;
use flora_index::{FlatIndex, MetadataTable, Metric, PassageIndex, vectors::VectorData};
use flora_service::{BoxFuture, EmbeddingProvider, FloraService, IndexHandle, Providers};
use flora_testkit::{HashEmbedding, TestCorpus, passage};

const DIM: usize = 32;

struct HashProvider(HashEmbedding);
impl EmbeddingProvider for HashProvider {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		let vectors = self.0.embed_all(texts);

		Box::pin(async move { Ok(vectors) })
	}
}

fn providers() -> Providers {
	Providers::new(Arc::new(HashProvider(HashEmbedding::new(DIM))))
}

fn state_for(corpus: &TestCorpus) -> AppState {
	let cfg = corpus.config(DIM);
	let index = IndexHandle::new(cfg.index.clone());

	AppState::from_service(FloraService::with_parts(cfg, providers(), index))
}

fn corpus() -> TestCorpus {
	TestCorpus::new(
		&HashEmbedding::new(DIM),
		&[
			passage("Ficus elastica", Some("watering"), "Поливайте после просыхания почвы."),
			passage("Ficus elastica", Some("light"), "Нужен яркий рассеянный свет."),
			passage("Ficus", None, "Фикусы не любят перестановок."),
		],
	)
	.expect("Failed to build corpus.")
}

fn retrieve_request(body: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri("/v1/passages/retrieve")
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.expect("Failed to build request.")
}

async fn read_json(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Response is not JSON.")
}

#[tokio::test]
async fn health_ok() {
	let corpus = corpus();
	let app = routes::router(state_for(&corpus));
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Bad request."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn retrieve_returns_ranked_passages() {
	let corpus = corpus();
	let app = routes::router(state_for(&corpus));
	let response = app
		.oneshot(retrieve_request(
			serde_json::json!({ "latin_name": "Ficus elastica", "top_k": 5 }),
		))
		.await
		.expect("Failed to call retrieve.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;
	let items = json["items"].as_array().expect("Missing items.");

	assert_eq!(json["pass"], "species");
	assert_eq!(items.len(), 3);
	assert_eq!(items[0]["match"], "species");
	assert_eq!(items[2]["match"], "genus");
	assert!(json["trace_id"].is_string());
}

#[tokio::test]
async fn retrieve_honours_intent() {
	let corpus = corpus();
	let app = routes::router(state_for(&corpus));
	let response = app
		.oneshot(retrieve_request(
			serde_json::json!({ "latin_name": "Ficus elastica", "intent": "light" }),
		))
		.await
		.expect("Failed to call retrieve.");
	let json = read_json(response).await;
	let items = json["items"].as_array().expect("Missing items.");

	assert_eq!(items.len(), 1);
	assert_eq!(items[0]["intent"], "light");
}

#[tokio::test]
async fn blank_name_is_a_bad_request() {
	let corpus = corpus();
	let app = routes::router(state_for(&corpus));
	let response = app
		.oneshot(retrieve_request(serde_json::json!({ "latin_name": "  " })))
		.await
		.expect("Failed to call retrieve.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = read_json(response).await;

	assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn integrity_failure_is_a_server_error() {
	let index = PassageIndex::new(
		Box::new(FlatIndex::new(
			VectorData { dim: DIM, values: vec![0.0; DIM * 3] },
			Metric::InnerProduct,
		)),
		MetadataTable::new(vec![passage("Ficus", None, "One record.")]),
	);
	let cfg = flora_testkit::test_config(
		flora_config::Index {
			vectors_path: "unused".to_string(),
			metadata_path: "unused".to_string(),
			metric: "inner_product".to_string(),
		},
		DIM,
	);
	let service = FloraService::with_parts(cfg, providers(), IndexHandle::from_loaded(index));
	let app = routes::router(AppState::from_service(service));
	let response = app
		.oneshot(retrieve_request(serde_json::json!({ "latin_name": "Ficus elastica" })))
		.await
		.expect("Failed to call retrieve.");

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let json = read_json(response).await;

	assert_eq!(json["error_code"], "index_integrity");
}
