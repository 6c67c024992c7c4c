//! GDPR / CCPA data retrieval and deletion requests.
//!
//! All calls go to the app surface with service-account auth and carry the
//! project token as a `token` query parameter, so a token is required.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::MixpanelClient;
use super::endpoints::ApiSurface;
use super::error::{MixpanelError, Result};
use super::params::{Validate, require_items, require_non_empty};
use super::request::RequestDescriptor;

const RETRIEVALS_PATH: &str = "/data-retrievals/v3.0";
const DELETIONS_PATH: &str = "/data-deletions/v3.0";

/// Upper bound Mixpanel accepts per GDPR request.
pub const MAX_GDPR_IDS: usize = 2000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplianceType {
    #[default]
    Gdpr,
    Ccpa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DisclosureType {
    Data,
    Categories,
    Sources,
    ThirdParties,
    BusinessPurpose,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GdprRetrievalParams {
    pub distinct_ids: Vec<String>,
    #[serde(default)]
    pub compliance_type: ComplianceType,
    #[serde(default)]
    pub disclosure_type: Option<DisclosureType>,
}

impl Validate for GdprRetrievalParams {
    fn validate(&self) -> Result<()> {
        require_distinct_ids(&self.distinct_ids)?;
        if self.disclosure_type.is_some() && self.compliance_type != ComplianceType::Ccpa {
            return Err(MixpanelError::invalid(
                "disclosureType only applies to CCPA requests",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GdprDeletionParams {
    pub distinct_ids: Vec<String>,
    #[serde(default)]
    pub compliance_type: ComplianceType,
}

impl Validate for GdprDeletionParams {
    fn validate(&self) -> Result<()> {
        require_distinct_ids(&self.distinct_ids)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GdprTrackingParams {
    pub tracking_id: String,
}

impl Validate for GdprTrackingParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("trackingId", &self.tracking_id)
    }
}

fn require_distinct_ids(ids: &[String]) -> Result<()> {
    require_items("distinctIds", ids, MAX_GDPR_IDS)?;
    ids.iter().try_for_each(|id| require_non_empty("distinctIds", id))
}

impl MixpanelClient {
    fn gdpr_request(&self, method: Method, path: &str, operation: &'static str) -> Result<RequestDescriptor> {
        let token = self.project_token(operation)?;
        Ok(RequestDescriptor::new(ApiSurface::App, method, path).param("token", token))
    }

    pub async fn create_gdpr_retrieval(&self, p: &GdprRetrievalParams) -> Result<Value> {
        let mut body = Map::new();
        body.insert("distinct_ids".into(), serde_json::to_value(&p.distinct_ids)?);
        body.insert("compliance_type".into(), serde_json::to_value(p.compliance_type)?);
        if let Some(disclosure) = p.disclosure_type {
            body.insert("disclosure_type".into(), serde_json::to_value(disclosure)?);
        }
        let request = self
            .gdpr_request(Method::POST, RETRIEVALS_PATH, "GDPR data retrieval")?
            .json(Value::Object(body));
        self.execute(request).await
    }

    pub async fn get_gdpr_retrieval_status(&self, p: &GdprTrackingParams) -> Result<Value> {
        let request = self
            .gdpr_request(Method::GET, RETRIEVALS_PATH, "GDPR retrieval status")?
            .segment(&p.tracking_id);
        self.execute(request).await
    }

    pub async fn create_gdpr_deletion(&self, p: &GdprDeletionParams) -> Result<Value> {
        let mut body = Map::new();
        body.insert("distinct_ids".into(), serde_json::to_value(&p.distinct_ids)?);
        body.insert("compliance_type".into(), serde_json::to_value(p.compliance_type)?);
        let request = self
            .gdpr_request(Method::POST, DELETIONS_PATH, "GDPR data deletion")?
            .json(Value::Object(body));
        self.execute(request).await
    }

    pub async fn get_gdpr_deletion_status(&self, p: &GdprTrackingParams) -> Result<Value> {
        let request = self
            .gdpr_request(Method::GET, DELETIONS_PATH, "GDPR deletion status")?
            .segment(&p.tracking_id);
        self.execute(request).await
    }

    pub async fn cancel_gdpr_deletion(&self, p: &GdprTrackingParams) -> Result<Value> {
        let request = self
            .gdpr_request(Method::DELETE, DELETIONS_PATH, "GDPR deletion cancel")?
            .segment(&p.tracking_id);
        self.execute(request).await
    }
}
