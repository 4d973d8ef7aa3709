use std::{
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use flora_service::{FloraService, MatchKind, PassKind, RetrievePassagesRequest};

#[derive(Debug, Parser)]
#[command(
	version = flora_cli::VERSION,
	rename_all = "kebab",
	styles = flora_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: PathBuf,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct EvalDataset {
	pub name: Option<String>,
	pub queries: Vec<EvalQuery>,
}

#[derive(Debug, Deserialize)]
pub struct EvalQuery {
	pub id: Option<String>,
	pub latin_name: String,
	pub intent: Option<String>,
	/// Match kind the first returned passage should carry. An empty result counts as `none`.
	pub expect_match: Option<MatchKind>,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub dataset: EvalDatasetInfo,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub name: String,
	pub query_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSettings {
	pub config_path: String,
	pub top_k: u32,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	pub query_count: usize,
	pub empty_rate: f64,
	pub fallback_rate: f64,
	/// Share of queries with an expectation whose first item met it.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expectation_hit_rate: Option<f64>,
	pub latency_ms_p50: f64,
	pub latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
	pub id: String,
	pub latin_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub intent: Option<String>,
	pub trace_id: Uuid,
	pub pass: PassKind,
	pub result_count: usize,
	pub top_match: Option<MatchKind>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expect_match: Option<MatchKind>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub expectation_met: Option<bool>,
	pub latency_ms: f64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = flora_config::load(&args.config)?;
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let dataset = load_dataset(&args.dataset)?;
	let service = FloraService::new(config)?;
	let output = evaluate(&args.config, &service, &dataset, args.top_k).await?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

/// Runs every dataset query once against `service`. Any retrieval error aborts the run.
pub async fn evaluate(
	config_path: &Path,
	service: &FloraService,
	dataset: &EvalDataset,
	top_k: Option<u32>,
) -> color_eyre::Result<EvalOutput> {
	let top_k = top_k.unwrap_or(service.cfg.retrieval.top_k);
	let mut reports = Vec::with_capacity(dataset.queries.len());

	for (index, query) in dataset.queries.iter().enumerate() {
		let id = query.id.clone().unwrap_or_else(|| index.to_string());
		let start = Instant::now();
		let response = service
			.retrieve_passages(RetrievePassagesRequest {
				latin_name: query.latin_name.clone(),
				top_k: Some(top_k),
				intent: query.intent.clone(),
			})
			.await
			.map_err(|err| eyre::eyre!("Query {id} failed: {err}"))?;
		let latency_ms = start.elapsed().as_secs_f64() * 1_000.0;
		let top_match = response.items.first().map(|item| item.match_kind);
		let expectation_met = query
			.expect_match
			.map(|expected| top_match.unwrap_or(MatchKind::None) == expected);

		tracing::debug!(
			%id,
			pass = ?response.pass,
			results = response.items.len(),
			latency_ms,
			"Query evaluated."
		);

		reports.push(QueryReport {
			id,
			latin_name: query.latin_name.clone(),
			intent: query.intent.clone(),
			trace_id: response.trace_id,
			pass: response.pass,
			result_count: response.items.len(),
			top_match,
			expect_match: query.expect_match,
			expectation_met,
			latency_ms,
		});
	}

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "eval".to_string()),
			query_count: reports.len(),
		},
		settings: EvalSettings { config_path: config_path.display().to_string(), top_k },
		summary: summarize(&reports),
		queries: reports,
	})
}

pub fn summarize(reports: &[QueryReport]) -> EvalSummary {
	let count = reports.len().max(1) as f64;
	let empty = reports.iter().filter(|r| r.result_count == 0).count();
	let fallback = reports.iter().filter(|r| r.pass == PassKind::GenusFallback).count();
	let judged: Vec<bool> = reports.iter().filter_map(|r| r.expectation_met).collect();
	let expectation_hit_rate = (!judged.is_empty())
		.then(|| judged.iter().filter(|met| **met).count() as f64 / judged.len() as f64);
	let mut sorted: Vec<f64> = reports.iter().map(|r| r.latency_ms).collect();

	sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

	EvalSummary {
		query_count: reports.len(),
		empty_rate: empty as f64 / count,
		fallback_rate: fallback as f64 / count,
		expectation_hit_rate,
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
	}
}

/// Linear interpolation between closest ranks. `values` must be sorted ascending.
fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let clamped = percentile.clamp(0.0, 1.0);
	let pos = clamped * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;
		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn report(
		result_count: usize,
		pass: PassKind,
		met: Option<bool>,
		latency_ms: f64,
	) -> QueryReport {
		QueryReport {
			id: "q".to_string(),
			latin_name: "Ficus elastica".to_string(),
			intent: None,
			trace_id: Uuid::new_v4(),
			pass,
			result_count,
			top_match: None,
			expect_match: None,
			expectation_met: met,
			latency_ms,
		}
	}

	#[test]
	fn percentile_interpolates_between_ranks() {
		let values = [10.0, 20.0, 30.0, 40.0];

		assert_eq!(percentile(&values, 0.0), 10.0);
		assert_eq!(percentile(&values, 0.5), 25.0);
		assert_eq!(percentile(&values, 1.0), 40.0);
		assert_eq!(percentile(&[], 0.95), 0.0);
	}

	#[test]
	fn summary_rates_count_every_query() {
		let reports = vec![
			report(3, PassKind::Species, Some(true), 4.0),
			report(0, PassKind::GenusFallback, Some(false), 2.0),
			report(2, PassKind::GenusFallback, None, 6.0),
			report(1, PassKind::Species, Some(true), 8.0),
		];
		let summary = summarize(&reports);

		assert_eq!(summary.query_count, 4);
		assert_eq!(summary.empty_rate, 0.25);
		assert_eq!(summary.fallback_rate, 0.5);
		assert_eq!(summary.expectation_hit_rate, Some(2.0 / 3.0));
		assert_eq!(summary.latency_ms_p50, 5.0);
	}

	#[test]
	fn hit_rate_is_absent_without_expectations() {
		let summary = summarize(&[report(1, PassKind::Species, None, 1.0)]);

		assert_eq!(summary.expectation_hit_rate, None);
	}
}
