pub mod chatbot_client;
pub mod ml_client;

use reqwest::Client as HttpClient;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use chatbot_client::ChatbotClient;
pub use ml_client::MlClient;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Upstream responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<HttpClient, UpstreamError> {
    let client = HttpClient::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()?;
    Ok(client)
}

pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, UpstreamError> {
    let url = Url::parse(&format!("{}/{}", base_url.trim_end_matches('/'), path))?;
    Ok(url)
}

pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(UpstreamError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        assert_eq!(
            endpoint("http://localhost:8001/", "predict").unwrap().as_str(),
            "http://localhost:8001/predict"
        );
        assert_eq!(
            endpoint("http://ml.internal/v1", "predict").unwrap().as_str(),
            "http://ml.internal/v1/predict"
        );
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(matches!(
            endpoint("not a url", "chat"),
            Err(UpstreamError::UrlError(_))
        ));
    }
}
