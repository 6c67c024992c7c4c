//! Per-request tenant credential resolution.
//!
//! Credentials arrive with every inbound call, as HTTP headers on the
//! streamable transport or as environment variables under stdio. They are
//! resolved into an immutable [`TenantCredentials`] value that lives exactly
//! as long as the call that produced it.

use axum::http::HeaderMap;
use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::endpoints::Residency;
use super::error::{MixpanelError, Result};

/// Service-account username header.
pub const USERNAME_HEADER: &str = "x-mixpanel-username";
/// Service-account secret header.
pub const SECRET_HEADER: &str = "x-mixpanel-secret";
/// Project id header.
pub const PROJECT_ID_HEADER: &str = "x-mixpanel-project-id";
/// Project token header, required only for ingestion-class operations.
pub const PROJECT_TOKEN_HEADER: &str = "x-mixpanel-project-token";
/// EU data residency flag header.
pub const EU_RESIDENT_HEADER: &str = "x-mixpanel-eu-resident";

/// Environment variables read in stdio mode, paired with the header each one stands in for.
pub const ENV_HEADER_MAP: [(&str, &str); 5] = [
    ("MIXPANEL_USERNAME", USERNAME_HEADER),
    ("MIXPANEL_SECRET", SECRET_HEADER),
    ("MIXPANEL_PROJECT_ID", PROJECT_ID_HEADER),
    ("MIXPANEL_PROJECT_TOKEN", PROJECT_TOKEN_HEADER),
    ("MIXPANEL_EU_RESIDENT", EU_RESIDENT_HEADER),
];

/// Credentials scoping one inbound call to one Mixpanel project.
#[derive(Clone, PartialEq, Eq)]
pub struct TenantCredentials {
    username: String,
    secret: String,
    project_id: String,
    project_token: Option<String>,
    eu_resident: bool,
}

impl std::fmt::Debug for TenantCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantCredentials")
            .field("username", &self.username)
            .field("secret", &"<redacted>")
            .field("project_id", &self.project_id)
            .field(
                "project_token",
                &self.project_token.as_ref().map(|_| "<redacted>"),
            )
            .field("eu_resident", &self.eu_resident)
            .finish()
    }
}

impl TenantCredentials {
    /// Build credentials directly. Used by tests and embedders that already
    /// hold the values.
    pub fn new(
        username: impl Into<String>,
        secret: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
            project_id: project_id.into(),
            project_token: None,
            eu_resident: false,
        }
    }

    #[must_use]
    pub fn with_project_token(mut self, token: impl Into<String>) -> Self {
        self.project_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_eu_residency(mut self, eu_resident: bool) -> Self {
        self.eu_resident = eu_resident;
        self
    }

    /// Resolve credentials from header-like key/value pairs.
    ///
    /// Keys are matched case-insensitively and the first occurrence wins.
    /// Blank values count as absent. Fails with
    /// [`MixpanelError::MissingCredentials`] naming every missing mandatory
    /// header.
    pub fn resolve<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut username = None;
        let mut secret = None;
        let mut project_id = None;
        let mut project_token = None;
        let mut eu_flag = None;

        for (key, value) in pairs {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            let slot = match key.as_ref().to_ascii_lowercase().as_str() {
                USERNAME_HEADER => &mut username,
                SECRET_HEADER => &mut secret,
                PROJECT_ID_HEADER => &mut project_id,
                PROJECT_TOKEN_HEADER => &mut project_token,
                EU_RESIDENT_HEADER => &mut eu_flag,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.to_string());
            }
        }

        let mut missing = Vec::new();
        if username.is_none() {
            missing.push(USERNAME_HEADER);
        }
        if secret.is_none() {
            missing.push(SECRET_HEADER);
        }
        if project_id.is_none() {
            missing.push(PROJECT_ID_HEADER);
        }

        match (username, secret, project_id) {
            (Some(username), Some(secret), Some(project_id)) => Ok(Self {
                username,
                secret,
                project_id,
                project_token,
                eu_resident: eu_flag.as_deref().is_some_and(parse_eu_flag),
            }),
            _ => Err(MixpanelError::MissingCredentials { missing }),
        }
    }

    /// Resolve credentials from inbound HTTP headers. Non-UTF-8 values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        Self::resolve(
            headers
                .iter()
                .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
        )
    }

    /// Resolve credentials from the `MIXPANEL_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::resolve(
            ENV_HEADER_MAP
                .iter()
                .filter_map(|(var, header)| std::env::var(var).ok().map(|v| (*header, v))),
        )
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project_token(&self) -> Option<&str> {
        self.project_token.as_deref()
    }

    pub fn eu_resident(&self) -> bool {
        self.eu_resident
    }

    pub fn residency(&self) -> Residency {
        Residency::from_flag(self.eu_resident)
    }

    /// Project token, or a descriptive error naming the header to set.
    pub fn require_token(&self, operation: &'static str) -> Result<&str> {
        self.project_token
            .as_deref()
            .ok_or(MixpanelError::MissingToken {
                operation,
                header: PROJECT_TOKEN_HEADER,
            })
    }

    /// `Authorization` header value for service-account authentication.
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

/// The EU flag is set only by the literal `true`, in any case.
fn parse_eu_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
