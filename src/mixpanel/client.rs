//! Tenant-scoped Mixpanel HTTP client.
//!
//! A [`MixpanelClient`] binds one set of [`TenantCredentials`] to the shared
//! HTTP connection pool and endpoint table. It is cheap to construct and is
//! built per inbound call, so two calls never see each other's credentials.
//!
//! Operations are grouped by API surface in sibling modules (`query`,
//! `funnels`, `profiles`, `engage`, ...), each adding methods to this type.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use super::credentials::TenantCredentials;
use super::endpoints::{ApiSurface, Endpoints, Residency};
use super::error::Result;
use super::request::{Auth, RequestBody, RequestDescriptor};
use super::response::{check_ingestion_status, classify_failure, decode_body};

/// Outbound HTTP transport settings.
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Build the shared `reqwest` client. Without a configured timeout the
/// transport default applies.
pub fn build_http_client(settings: &HttpSettings) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = &settings.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    builder.build()
}

/// Raw successful response, before body decoding.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub status: reqwest::StatusCode,
    pub headers: reqwest::header::HeaderMap,
    pub text: String,
}

/// Mixpanel client for a single tenant.
#[derive(Clone)]
pub struct MixpanelClient {
    http: reqwest::Client,
    endpoints: Arc<Endpoints>,
    credentials: TenantCredentials,
}

impl std::fmt::Debug for MixpanelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixpanelClient")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}

impl MixpanelClient {
    pub fn new(
        http: reqwest::Client,
        endpoints: Arc<Endpoints>,
        credentials: TenantCredentials,
    ) -> Self {
        Self {
            http,
            endpoints,
            credentials,
        }
    }

    pub fn credentials(&self) -> &TenantCredentials {
        &self.credentials
    }

    pub fn residency(&self) -> Residency {
        self.credentials.residency()
    }

    pub fn base_url(&self, surface: ApiSurface) -> &str {
        self.endpoints.base_url(surface, self.residency())
    }

    /// Fully resolved URL for a request under this tenant's residency.
    pub fn url_for(&self, request: &RequestDescriptor) -> Result<Url> {
        request.url(self.base_url(request.surface))
    }

    pub(crate) fn project_token(&self, operation: &'static str) -> Result<&str> {
        self.credentials.require_token(operation)
    }

    /// Query-surface GET with `project_id` as the first parameter.
    pub(crate) fn query_get(&self, path: &str) -> RequestDescriptor {
        RequestDescriptor::get(ApiSurface::Query, path).param("project_id", self.credentials.project_id())
    }

    /// Query-surface form POST with `project_id` in the query string.
    pub(crate) fn query_post(&self, path: &str) -> RequestDescriptor {
        RequestDescriptor::post(ApiSurface::Query, path).param("project_id", self.credentials.project_id())
    }

    /// App-surface request under `/projects/{project_id}/...`.
    pub(crate) fn project_request(&self, method: reqwest::Method, suffix: &str) -> RequestDescriptor {
        let mut request = RequestDescriptor::new(ApiSurface::App, method, "projects")
            .segment(self.credentials.project_id());
        for part in suffix.split('/').filter(|s| !s.is_empty()) {
            request = request.segment(part);
        }
        request
    }

    /// Issue the request and decode the body as JSON or text.
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Value> {
        let raw = self.send(request).await?;
        decode_body(&raw.headers, raw.text)
    }

    /// Issue a token-authenticated ingestion request and check the
    /// body-level status it reports.
    pub async fn execute_ingestion(&self, request: RequestDescriptor) -> Result<Value> {
        let raw = self.send(request).await?;
        let status = raw.status;
        let body = decode_body(&raw.headers, raw.text)?;
        check_ingestion_status(status, body)
    }

    pub(crate) async fn send(&self, request: RequestDescriptor) -> Result<RawResponse> {
        let url = self.url_for(&request)?;
        let path = request.path();
        let surface = request.surface;

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json");

        if request.auth == Auth::ServiceAccount {
            builder = builder.header(AUTHORIZATION, self.credentials.basic_auth_header());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Csv(text) => builder.header(CONTENT_TYPE, "text/csv").body(text),
        };

        tracing::debug!(
            name: "mixpanel.request",
            surface = surface.as_str(),
            method = %request.method,
            path = %path,
            project_id = %self.credentials.project_id(),
            eu = self.credentials.eu_resident(),
            "Sending Mixpanel request"
        );

        let started = Instant::now();
        let response = builder.send().await.inspect_err(|e| {
            tracing::warn!(
                surface = surface.as_str(),
                path = %path,
                error = %e,
                "Mixpanel request failed before a response"
            );
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        let elapsed_ms = started.elapsed().as_millis();

        if status.is_success() {
            tracing::info!(
                name: "mixpanel.response",
                surface = surface.as_str(),
                path = %path,
                status = status.as_u16(),
                elapsed_ms = %elapsed_ms,
                "Mixpanel request completed"
            );
            Ok(RawResponse {
                status,
                headers,
                text,
            })
        } else {
            tracing::warn!(
                name: "mixpanel.response",
                surface = surface.as_str(),
                path = %path,
                status = status.as_u16(),
                elapsed_ms = %elapsed_ms,
                "Mixpanel request returned an error status"
            );
            Err(classify_failure(status, &headers, text))
        }
    }
}
