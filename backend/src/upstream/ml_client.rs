use reqwest::Client as HttpClient;
use serde::Serialize;
use shared::{CanonicalCategory, CanonicalCourse, PredictionRequest, PredictionResult};
use std::time::Duration;
use url::Url;

use super::{UpstreamError, build_http_client, endpoint, ensure_success};
use crate::predictor::normalizer;

/// Body sent to the recommendation service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MlPredictRequest<'a> {
    pub cutoff: f64,
    pub course: CanonicalCourse,
    pub category: CanonicalCategory,
    pub course_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
}

impl<'a> MlPredictRequest<'a> {
    pub fn from_request(request: &'a PredictionRequest) -> Self {
        let (course, category) = normalizer::normalize(&request.course, &request.category);
        Self {
            cutoff: request.rank,
            course,
            category,
            course_name: request.course.trim(),
            location: request.location_filter(),
        }
    }
}

#[derive(Clone)]
pub struct MlClient {
    http_client: HttpClient,
    predict_url: Url,
}

impl MlClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            predict_url: endpoint(base_url, "predict")?,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    pub async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<Vec<PredictionResult>, UpstreamError> {
        let body = MlPredictRequest::from_request(request);
        log::debug!("Forwarding prediction to {}: {:?}", self.predict_url, body);

        let response = self
            .http_client
            .post(self.predict_url.clone())
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let results: Vec<PredictionResult> = response.json().await?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_body_carries_canonical_codes() {
        let request = PredictionRequest {
            rank: 4200.0,
            course: " Mechanical Engineering ".into(),
            category: "OBC".into(),
            location: Some("".into()),
        };
        let body = serde_json::to_value(MlPredictRequest::from_request(&request)).unwrap();

        assert_eq!(body["cutoff"], 4200.0);
        assert_eq!(body["course"], "MECH");
        assert_eq!(body["category"], "BC");
        assert_eq!(body["courseName"], "Mechanical Engineering");
        assert!(body.get("location").is_none());
    }
}
