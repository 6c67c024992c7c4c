//! Lexicon schemas under `/projects/{id}/schemas`.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::MixpanelClient;
use super::error::{MixpanelError, Result};
use super::params::{Validate, require_non_empty};
use super::request::RequestDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Event,
    Profile,
}

impl EntityType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Profile => "profile",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListSchemasParams {
    #[serde(default)]
    pub entity_type: Option<EntityType>,
}

impl Validate for ListSchemasParams {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SchemaKeyParams {
    pub entity_type: EntityType,
    pub name: String,
}

impl Validate for SchemaKeyParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSchemaParams {
    pub entity_type: EntityType,
    pub name: String,
    pub schema: Map<String, Value>,
}

impl Validate for CreateSchemaParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        if self.schema.is_empty() {
            return Err(MixpanelError::invalid("schema must not be empty"));
        }
        Ok(())
    }
}

impl MixpanelClient {
    fn schema_request(&self, method: Method, entity_type: EntityType, name: &str) -> RequestDescriptor {
        self.project_request(method, "schemas")
            .segment(entity_type.as_str())
            .segment(name)
    }

    pub async fn list_schemas(&self, p: &ListSchemasParams) -> Result<Value> {
        let mut request = self.project_request(Method::GET, "schemas");
        if let Some(entity_type) = p.entity_type {
            request = request.segment(entity_type.as_str());
        }
        self.execute(request).await
    }

    pub async fn get_schema(&self, p: &SchemaKeyParams) -> Result<Value> {
        self.execute(self.schema_request(Method::GET, p.entity_type, &p.name))
            .await
    }

    pub async fn create_schema(&self, p: &CreateSchemaParams) -> Result<Value> {
        let request = self
            .schema_request(Method::POST, p.entity_type, &p.name)
            .json(Value::Object(p.schema.clone()));
        self.execute(request).await
    }

    pub async fn delete_schema(&self, p: &SchemaKeyParams) -> Result<Value> {
        self.execute(self.schema_request(Method::DELETE, p.entity_type, &p.name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixpanel::credentials::TenantCredentials;
    use crate::mixpanel::endpoints::Endpoints;
    use std::sync::Arc;

    #[test]
    fn test_schema_path_encodes_name() {
        let client = MixpanelClient::new(
            reqwest::Client::new(),
            Arc::new(Endpoints::default()),
            TenantCredentials::new("svc", "shh", "9"),
        );
        let request = client.schema_request(Method::GET, EntityType::Event, "Sign Up/v2");
        let url = client.url_for(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://mixpanel.com/api/app/projects/9/schemas/event/Sign%20Up%2Fv2"
        );
    }
}
