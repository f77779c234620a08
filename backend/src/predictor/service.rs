use shared::{PredictionRequest, PredictionResult};
use strum_macros::{AsRefStr, Display};

use super::model::{Estimator, EstimatorError};
use super::{ranker, scorer};
use crate::catalog::Catalog;
use crate::upstream::MlClient;

/// Where a prediction list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum PredictionSource {
    /// The external recommendation service answered.
    Upstream,
    /// No recommendation service is configured.
    Local,
    /// The recommendation service failed and the catalog was used instead.
    Fallback,
}

#[derive(Debug)]
pub struct Prediction {
    pub results: Vec<PredictionResult>,
    pub source: PredictionSource,
}

/// Answers prediction requests, preferring the external recommendation
/// service when one is configured. A failing service never fails the
/// request: the local estimator answers instead.
#[derive(Clone)]
pub struct PredictionService {
    estimator: Estimator,
    ml_client: Option<MlClient>,
}

impl PredictionService {
    pub fn new(estimator: Estimator, ml_client: Option<MlClient>) -> Self {
        Self {
            estimator,
            ml_client,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        self.estimator.catalog()
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<Prediction, EstimatorError> {
        let Some(ml_client) = &self.ml_client else {
            return Ok(Prediction {
                results: self.estimator.estimate(request)?,
                source: PredictionSource::Local,
            });
        };

        match ml_client.predict(request).await {
            Ok(results) => {
                log::info!(
                    "Recommendation service returned {} results",
                    results.len()
                );
                Ok(Prediction {
                    results: sanitize_upstream(results),
                    source: PredictionSource::Upstream,
                })
            }
            Err(e) => {
                log::warn!(
                    "Recommendation service at {} unavailable, using catalog: {}",
                    ml_client.predict_url(),
                    e
                );
                Ok(Prediction {
                    results: self.estimator.estimate_or_canned(request)?,
                    source: PredictionSource::Fallback,
                })
            }
        }
    }
}

fn sanitize_upstream(results: Vec<PredictionResult>) -> Vec<PredictionResult> {
    let results = results
        .into_iter()
        .map(|mut result| {
            result.probability = if result.probability.is_finite() {
                scorer::round_probability(result.probability)
            } else {
                0.0
            };
            result
        })
        .collect();
    ranker::rank(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::model::EstimatorSettings;
    use shared::Tier;
    use std::sync::Arc;
    use std::time::Duration;

    fn estimator() -> Estimator {
        Estimator::with_seed(Arc::new(Catalog::builtin()), EstimatorSettings::default(), 42)
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            rank: 150.0,
            course: "Computer Science".into(),
            category: "General".into(),
            location: Some("Chennai".into()),
        }
    }

    #[test]
    fn source_renders_lowercase() {
        assert_eq!(PredictionSource::Fallback.as_ref(), "fallback");
        assert_eq!(PredictionSource::Upstream.to_string(), "upstream");
    }

    #[test]
    fn upstream_results_are_clamped_rounded_and_ranked() {
        let raw = vec![
            PredictionResult {
                college: "A".into(),
                course: "CSE".into(),
                location: "X".into(),
                probability: 0.456,
                cutoff_score: 10.0,
                status: Some(Tier::Dream),
            },
            PredictionResult {
                college: "B".into(),
                course: "CSE".into(),
                location: "X".into(),
                probability: 1.7,
                cutoff_score: 10.0,
                status: Some(Tier::Safe),
            },
            PredictionResult {
                college: "C".into(),
                course: "CSE".into(),
                location: "X".into(),
                probability: f64::NAN,
                cutoff_score: 10.0,
                status: None,
            },
        ];
        let cleaned = sanitize_upstream(raw);

        let summary: Vec<(&str, f64)> = cleaned
            .iter()
            .map(|r| (r.college.as_str(), r.probability))
            .collect();
        assert_eq!(summary, vec![("B", 1.0), ("A", 0.46), ("C", 0.0)]);
    }

    #[actix_web::test]
    async fn without_ml_client_answers_locally() {
        let service = PredictionService::new(estimator(), None);
        let prediction = service.predict(&request()).await.unwrap();

        assert_eq!(prediction.source, PredictionSource::Local);
        assert_eq!(prediction.results.len(), 2);
    }

    #[actix_web::test]
    async fn unreachable_ml_client_falls_back_to_catalog() {
        // Nothing listens on port 9 locally, so the connection is refused.
        let client = MlClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let service = PredictionService::new(estimator(), Some(client));
        let prediction = service.predict(&request()).await.unwrap();

        assert_eq!(prediction.source, PredictionSource::Fallback);
        assert!(!prediction.results.is_empty());
        for result in &prediction.results {
            assert!((0.0..=1.0).contains(&result.probability));
        }
    }
}
