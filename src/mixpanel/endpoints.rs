//! Mixpanel base URLs by API surface and data residency.

use serde::{Deserialize, Serialize};

/// The four Mixpanel API surfaces this server talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiSurface {
    /// Query API (`/api/query`): reports, segmentation, funnels, profiles.
    Query,
    /// Ingestion API: `/track`, `/engage`, `/groups`, `/import`, lookup tables.
    Ingestion,
    /// Raw data export API (`/api/2.0/export`).
    Export,
    /// App/management API (`/api/app`): annotations, schemas, GDPR.
    App,
}

impl ApiSurface {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Ingestion => "ingestion",
            Self::Export => "export",
            Self::App => "app",
        }
    }
}

/// Data residency of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Residency {
    #[default]
    Standard,
    Eu,
}

impl Residency {
    pub fn from_flag(eu_resident: bool) -> Self {
        if eu_resident { Self::Eu } else { Self::Standard }
    }
}

pub const QUERY_URL: &str = "https://mixpanel.com/api/query";
pub const QUERY_EU_URL: &str = "https://eu.mixpanel.com/api/query";
pub const INGESTION_URL: &str = "https://api.mixpanel.com";
pub const INGESTION_EU_URL: &str = "https://api-eu.mixpanel.com";
pub const EXPORT_URL: &str = "https://data.mixpanel.com/api/2.0";
pub const EXPORT_EU_URL: &str = "https://data-eu.mixpanel.com/api/2.0";
pub const APP_URL: &str = "https://mixpanel.com/api/app";
pub const APP_EU_URL: &str = "https://eu.mixpanel.com/api/app";

/// Base URL table: four surfaces, each with a standard and an EU variant.
///
/// Every field can be overridden from configuration (`mixpanel.endpoints.*`);
/// missing fields fall back to the public Mixpanel hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub query: String,
    pub query_eu: String,
    pub ingestion: String,
    pub ingestion_eu: String,
    pub export: String,
    pub export_eu: String,
    pub app: String,
    pub app_eu: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            query: QUERY_URL.to_string(),
            query_eu: QUERY_EU_URL.to_string(),
            ingestion: INGESTION_URL.to_string(),
            ingestion_eu: INGESTION_EU_URL.to_string(),
            export: EXPORT_URL.to_string(),
            export_eu: EXPORT_EU_URL.to_string(),
            app: APP_URL.to_string(),
            app_eu: APP_EU_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Point every surface at a single host, e.g. a local proxy or mock server.
    ///
    /// Standard surfaces live under `{root}/{surface}` and EU surfaces under
    /// `{root}/eu/{surface}`.
    pub fn rooted_at(root: &str) -> Self {
        let root = root.trim_end_matches('/');
        Self {
            query: format!("{root}/query"),
            query_eu: format!("{root}/eu/query"),
            ingestion: format!("{root}/ingestion"),
            ingestion_eu: format!("{root}/eu/ingestion"),
            export: format!("{root}/export"),
            export_eu: format!("{root}/eu/export"),
            app: format!("{root}/app"),
            app_eu: format!("{root}/eu/app"),
        }
    }

    pub fn base_url(&self, surface: ApiSurface, residency: Residency) -> &str {
        match (surface, residency) {
            (ApiSurface::Query, Residency::Standard) => &self.query,
            (ApiSurface::Query, Residency::Eu) => &self.query_eu,
            (ApiSurface::Ingestion, Residency::Standard) => &self.ingestion,
            (ApiSurface::Ingestion, Residency::Eu) => &self.ingestion_eu,
            (ApiSurface::Export, Residency::Standard) => &self.export,
            (ApiSurface::Export, Residency::Eu) => &self.export_eu,
            (ApiSurface::App, Residency::Standard) => &self.app,
            (ApiSurface::App, Residency::Eu) => &self.app_eu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACES: [ApiSurface; 4] = [
        ApiSurface::Query,
        ApiSurface::Ingestion,
        ApiSurface::Export,
        ApiSurface::App,
    ];

    #[test]
    fn test_eight_distinct_default_urls() {
        let endpoints = Endpoints::default();
        let mut urls: Vec<&str> = SURFACES
            .iter()
            .flat_map(|s| {
                [
                    endpoints.base_url(*s, Residency::Standard),
                    endpoints.base_url(*s, Residency::Eu),
                ]
            })
            .collect();
        urls.sort_unstable();
        urls.dedup();
        assert_eq!(urls.len(), 8);
    }

    #[test]
    fn test_eu_variants() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.base_url(ApiSurface::Query, Residency::Eu),
            "https://eu.mixpanel.com/api/query"
        );
        assert_eq!(
            endpoints.base_url(ApiSurface::Ingestion, Residency::Eu),
            "https://api-eu.mixpanel.com"
        );
        assert_eq!(
            endpoints.base_url(ApiSurface::Export, Residency::Eu),
            "https://data-eu.mixpanel.com/api/2.0"
        );
        assert_eq!(
            endpoints.base_url(ApiSurface::App, Residency::Eu),
            "https://eu.mixpanel.com/api/app"
        );
    }

    #[test]
    fn test_rooted_at() {
        let endpoints = Endpoints::rooted_at("http://127.0.0.1:9000/");
        assert_eq!(
            endpoints.base_url(ApiSurface::Ingestion, Residency::Standard),
            "http://127.0.0.1:9000/ingestion"
        );
        assert_eq!(
            endpoints.base_url(ApiSurface::App, Residency::Eu),
            "http://127.0.0.1:9000/eu/app"
        );
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let endpoints: Endpoints =
            serde_json::from_str(r#"{"query": "http://proxy.local/query"}"#).unwrap();
        assert_eq!(endpoints.query, "http://proxy.local/query");
        assert_eq!(endpoints.app, APP_URL);
    }
}
