//! Exhaustive in-memory vector search.

use std::cmp::Ordering;

use crate::{Error, Result, vectors::VectorData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
	InnerProduct,
	Cosine,
}
impl Metric {
	pub fn parse(raw: &str) -> Result<Self> {
		match raw.trim() {
			"inner_product" => Ok(Self::InnerProduct),
			"cosine" => Ok(Self::Cosine),
			other => Err(Error::InvalidFormat { message: format!("Unknown metric {other:?}.") }),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
	pub score: f32,
	/// Vector position.
	pub id: i64,
}

/// Nearest-neighbor search over a fixed set of vectors.
///
/// `search` returns at most `k` neighbors per query, best first. An index holding fewer than `k`
/// vectors returns all of them.
pub trait VectorIndex: Send + Sync {
	fn len(&self) -> usize;

	fn dim(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<Neighbor>>>;
}

#[derive(Debug, Clone)]
pub struct FlatIndex {
	dim: usize,
	len: usize,
	metric: Metric,
	data: Vec<f32>,
	norms: Vec<f32>,
}
impl FlatIndex {
	pub fn new(data: VectorData, metric: Metric) -> Self {
		let norms = match metric {
			Metric::InnerProduct => Vec::new(),
			Metric::Cosine =>
				data.values.chunks(data.dim.max(1)).map(|row| dot(row, row).sqrt()).collect(),
		};

		Self { dim: data.dim, len: data.count(), metric, data: data.values, norms }
	}

	fn score(&self, row_idx: usize, query: &[f32], query_norm: f32) -> f32 {
		let row = &self.data[row_idx * self.dim..(row_idx + 1) * self.dim];
		let raw = dot(row, query);

		match self.metric {
			Metric::InnerProduct => raw,
			Metric::Cosine => {
				let denom = self.norms[row_idx] * query_norm;

				if denom > 0.0 { raw / denom } else { 0.0 }
			},
		}
	}
}
impl VectorIndex for FlatIndex {
	fn len(&self) -> usize {
		self.len
	}

	fn dim(&self) -> usize {
		self.dim
	}

	fn search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<Neighbor>>> {
		let mut out = Vec::with_capacity(queries.len());

		for query in queries {
			if query.len() != self.dim {
				return Err(Error::InvalidQuery {
					message: format!(
						"Query has dimension {}, index expects {}.",
						query.len(),
						self.dim
					),
				});
			}

			let query_norm = dot(query, query).sqrt();
			let mut scored: Vec<Neighbor> = (0..self.len())
				.map(|idx| Neighbor { score: self.score(idx, query, query_norm), id: idx as i64 })
				.collect();

			// Stable sort keeps lower ids first on ties.
			scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
			scored.truncate(k);
			out.push(scored);
		}

		Ok(out)
	}
}

fn dot(lhs: &[f32], rhs: &[f32]) -> f32 {
	lhs.iter().zip(rhs).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn index(metric: Metric) -> FlatIndex {
		FlatIndex::new(VectorData { dim: 2, values: vec![1.0, 0.0, 0.0, 1.0, 3.0, 3.0] }, metric)
	}

	#[test]
	fn inner_product_prefers_larger_magnitude() {
		let hits =
			index(Metric::InnerProduct).search(&[vec![1.0, 1.0]], 1).expect("Search failed.");

		assert_eq!(hits[0][0].id, 2);
		assert_eq!(hits[0][0].score, 6.0);
	}

	#[test]
	fn cosine_ignores_magnitude() {
		let hits = index(Metric::Cosine).search(&[vec![1.0, 0.0]], 3).expect("Search failed.");

		assert_eq!(hits[0][0].id, 0);
		assert!((hits[0][0].score - 1.0).abs() < 1e-6);
		assert_eq!(hits[0][2].id, 1);
	}

	#[test]
	fn short_index_returns_every_vector_once() {
		let hits =
			index(Metric::InnerProduct).search(&[vec![1.0, 0.0]], 5).expect("Search failed.");

		assert_eq!(hits[0].len(), 3);
	}

	#[test]
	fn huge_k_allocates_only_what_the_index_holds() {
		let hits = index(Metric::InnerProduct)
			.search(&[vec![1.0, 0.0], vec![0.0, 1.0]], usize::MAX)
			.expect("Search failed.");

		assert!(hits.iter().all(|per_query| per_query.len() == 3));
	}

	#[test]
	fn rejects_wrong_query_dimension() {
		let err = index(Metric::Cosine).search(&[vec![1.0]], 1).expect_err("Expected query error.");

		assert!(matches!(err, Error::InvalidQuery { .. }));
	}

	#[test]
	fn parses_metric_names() {
		assert_eq!(Metric::parse("cosine").expect("Parse failed."), Metric::Cosine);
		assert!(Metric::parse("l2").is_err());
	}
}
