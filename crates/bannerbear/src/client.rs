//! HTTP client implementing [`RenderService`] against the Bannerbear v2 API.

use async_trait::async_trait;
use imaging::{
    JobHandle, JobStatus, JobUid, ModificationSet, RenderError, RenderService, TemplateId,
    Timestamp,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, info, instrument};

use crate::wire::{self, Call, CreateImageRequest, CreatedImage, ImageState};
use crate::{BannerbearConfig, ClientError};

/// Bannerbear API client.
///
/// Built once at startup from a validated [`BannerbearConfig`] and shared
/// (behind an `Arc<dyn RenderService>`) by every generation request. Each trait
/// method performs exactly one HTTP request.
#[derive(Debug, Clone)]
pub struct BannerbearClient {
    http: reqwest::Client,
    base_url: String,
}

impl BannerbearClient {
    /// Builds the client.
    ///
    /// # Errors
    ///
    /// [`ClientError::InvalidApiKey`] if the key cannot be sent as a header, or
    /// [`ClientError::Http`] if the HTTP client cannot be constructed.
    pub fn new(config: BannerbearConfig) -> Result<Self, ClientError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose()))
            .map_err(|_| ClientError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a request and returns the status and body text.
    async fn exchange(&self, request: RequestBuilder) -> Result<(StatusCode, String), RenderError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        Ok((status, body))
    }
}

fn transport_error(err: reqwest::Error) -> RenderError {
    RenderError::Transient {
        status: err.status().map(|s| s.as_u16()),
        message: err.to_string(),
    }
}

#[async_trait]
impl RenderService for BannerbearClient {
    #[instrument(skip_all, fields(template = %template_id, layers = modifications.len()))]
    async fn submit(
        &self,
        template_id: &TemplateId,
        modifications: &ModificationSet,
    ) -> Result<JobHandle, RenderError> {
        let body = CreateImageRequest {
            template: template_id.as_str(),
            modifications,
        };
        let (status, text) = self
            .exchange(self.http.post(self.url("images")).json(&body))
            .await?;
        if !status.is_success() {
            return Err(wire::classify(status, &text, Call::Submit(template_id)));
        }

        let created: CreatedImage = wire::parse(&text)?;
        let uid = JobUid::new(created.uid).ok_or_else(|| RenderError::InvalidResponse {
            message: "image created without a uid".into(),
        })?;
        let submitted_at = created
            .created_at
            .as_deref()
            .and_then(Timestamp::parse_rfc3339)
            .unwrap_or_else(Timestamp::now);

        info!(uid = %uid, status = ?created.status, "Image created");
        Ok(JobHandle { uid, submitted_at })
    }

    #[instrument(skip_all, fields(uid = %uid))]
    async fn check_status(&self, uid: &JobUid) -> Result<JobStatus, RenderError> {
        let (status, text) = self
            .exchange(self.http.get(self.url(&format!("images/{uid}"))))
            .await?;
        if !status.is_success() {
            return Err(wire::classify(status, &text, Call::Status(uid)));
        }

        let state: ImageState = wire::parse(&text)?;
        let job_status = state.into_job_status();
        debug!(status = ?job_status, "Image status");
        Ok(job_status)
    }
}
