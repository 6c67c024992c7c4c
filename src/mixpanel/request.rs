//! Transient description of one outbound Mixpanel request.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::endpoints::ApiSurface;
use super::error::{MixpanelError, Result};

/// How the request authenticates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Basic base64(username:secret)`.
    ServiceAccount,
    /// Project token embedded in the payload; no `Authorization` header.
    ProjectToken,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    /// Raw CSV text (lookup tables).
    Csv(String),
}

/// Everything needed to issue one HTTP call, minus the credentials.
///
/// Built fresh for every operation and consumed by
/// [`MixpanelClient::execute`](super::client::MixpanelClient::execute).
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub surface: ApiSurface,
    pub method: Method,
    segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub auth: Auth,
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// Start a request. `path` is split on `/`; its segments are fixed API
    /// path components. Use [`segment`](Self::segment) for caller-supplied ids.
    pub fn new(surface: ApiSurface, method: Method, path: &str) -> Self {
        Self {
            surface,
            method,
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
            query: Vec::new(),
            auth: Auth::ServiceAccount,
            body: RequestBody::Empty,
        }
    }

    pub fn get(surface: ApiSurface, path: &str) -> Self {
        Self::new(surface, Method::GET, path)
    }

    pub fn post(surface: ApiSurface, path: &str) -> Self {
        Self::new(surface, Method::POST, path)
    }

    pub fn put(surface: ApiSurface, path: &str) -> Self {
        Self::new(surface, Method::PUT, path)
    }

    pub fn patch(surface: ApiSurface, path: &str) -> Self {
        Self::new(surface, Method::PATCH, path)
    }

    pub fn delete(surface: ApiSurface, path: &str) -> Self {
        Self::new(surface, Method::DELETE, path)
    }

    /// Append one path segment; it is percent-encoded when the URL is built.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn param_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Add a JSON-encoded parameter, e.g. `event=["Signup"]`.
    pub fn param_json<T: Serialize + ?Sized>(self, key: &str, value: &T) -> Result<Self> {
        let encoded = serde_json::to_string(value)?;
        Ok(self.param(key, encoded))
    }

    pub fn param_json_opt<T: Serialize>(self, key: &str, value: Option<&T>) -> Result<Self> {
        match value {
            Some(value) => self.param_json(key, value),
            None => Ok(self),
        }
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    #[must_use]
    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    #[must_use]
    pub fn csv(mut self, text: String) -> Self {
        self.body = RequestBody::Csv(text);
        self
    }

    #[must_use]
    pub fn token_auth(mut self) -> Self {
        self.auth = Auth::ProjectToken;
        self
    }

    /// Path relative to the surface base URL, for logs and assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Resolve against a surface base URL.
    pub fn url(&self, base: &str) -> Result<Url> {
        let mut url = Url::parse(base)?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| MixpanelError::invalid(format!("base URL cannot carry a path: {base}")))?;
            path.pop_if_empty();
            path.extend(&self.segments);
        }
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}
