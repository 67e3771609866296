use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

use crate::types::AdviceRequest;
use crate::{AdviceResponse, AngleResponse, ClientError, FailureKind, HealthReport, MediaUpload};

const HEALTH_PATH: &str = "health";
const ANGLE_PATH: &str = "get_back_angle";
const ADVICE_PATH: &str = "back_recommendation";
/// Multipart field the analysis endpoint reads, for videos and images alike.
const UPLOAD_FIELD: &str = "video";

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Whole-request limit. `None` waits for the backend indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

/// The remote analysis service.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn health(&self) -> Result<HealthReport, ClientError>;

    async fn back_angle(&self, media: &MediaUpload) -> Result<f64, ClientError>;

    async fn back_recommendation(&self, angle: f64) -> Result<String, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, ClientError> {
        let base_url = parse_base_url(&settings.base_url)?;
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn health(&self) -> Result<HealthReport, ClientError> {
        let response = self
            .client
            .get(self.endpoint(HEALTH_PATH)?)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        decode_json(response).await
    }

    async fn back_angle(&self, media: &MediaUpload) -> Result<f64, ClientError> {
        let part = Part::bytes(media.bytes.to_vec())
            .file_name(media.filename.clone())
            .mime_str(&media.mime_type)
            .map_err(|err| ClientError::new(FailureKind::InvalidRequest, err.to_string()))?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.endpoint(ANGLE_PATH)?)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: AngleResponse = decode_json(response).await?;
        Ok(body.average_angle)
    }

    async fn back_recommendation(&self, angle: f64) -> Result<String, ClientError> {
        let response = self
            .client
            .post(self.endpoint(ADVICE_PATH)?)
            .json(&AdviceRequest { angle })
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body: AdviceResponse = decode_json(response).await?;
        Ok(body.advice)
    }
}

/// Endpoints are joined relative to the base, so it must end with a slash.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::new(
            FailureKind::InvalidUrl,
            format!("unsupported scheme {}", url.scheme()),
        ));
    }
    Ok(url)
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ClientError::new(
            FailureKind::HttpStatus(status.as_u16()),
            status.to_string(),
        ));
    }
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&body)
        .map_err(|err| ClientError::new(FailureKind::InvalidResponse, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return ClientError::new(FailureKind::InvalidRequest, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::parse_base_url;
    use crate::FailureKind;

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:5000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/api/");
        assert_eq!(
            url.join("health").unwrap().as_str(),
            "http://localhost:5000/api/health"
        );
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let err = parse_base_url("ftp://example.com").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
        let err = parse_base_url("not a url").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}
