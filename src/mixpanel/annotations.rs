//! Project annotations on the app surface.

use chrono::NaiveDateTime;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::client::MixpanelClient;
use super::error::{MixpanelError, Result};
use super::params::{Validate, require_date, require_date_range, require_non_empty};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListAnnotationsParams {
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
}

impl Validate for ListAnnotationsParams {
    fn validate(&self) -> Result<()> {
        match (&self.from_date, &self.to_date) {
            (Some(from), Some(to)) => require_date_range(from, to),
            (Some(from), None) => require_date("fromDate", from).map(|_| ()),
            (None, Some(to)) => require_date("toDate", to).map(|_| ()),
            (None, None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnnotationIdParams {
    pub annotation_id: u64,
}

impl Validate for AnnotationIdParams {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateAnnotationParams {
    /// `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.
    pub date: String,
    pub description: String,
    #[serde(default)]
    pub tags: Option<Vec<u64>>,
}

impl Validate for CreateAnnotationParams {
    fn validate(&self) -> Result<()> {
        require_annotation_date(&self.date)?;
        require_non_empty("description", &self.description)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateAnnotationParams {
    pub annotation_id: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<u64>>,
}

impl Validate for UpdateAnnotationParams {
    fn validate(&self) -> Result<()> {
        if self.description.is_none() && self.tags.is_none() {
            return Err(MixpanelError::invalid(
                "update requires description or tags",
            ));
        }
        if let Some(description) = &self.description {
            require_non_empty("description", description)?;
        }
        Ok(())
    }
}

fn require_annotation_date(value: &str) -> Result<()> {
    if NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok() {
        return Ok(());
    }
    require_date("date", value)
        .map(|_| ())
        .map_err(|_| {
            MixpanelError::invalid(format!(
                "date must be YYYY-MM-DD HH:MM:SS or YYYY-MM-DD, got {value:?}"
            ))
        })
}

impl MixpanelClient {
    pub async fn list_annotations(&self, p: &ListAnnotationsParams) -> Result<Value> {
        let request = self
            .project_request(Method::GET, "annotations")
            .param_opt("fromDate", p.from_date.as_ref())
            .param_opt("toDate", p.to_date.as_ref());
        self.execute(request).await
    }

    pub async fn get_annotation(&self, p: &AnnotationIdParams) -> Result<Value> {
        let request = self
            .project_request(Method::GET, "annotations")
            .segment(p.annotation_id.to_string());
        self.execute(request).await
    }

    pub async fn create_annotation(&self, p: &CreateAnnotationParams) -> Result<Value> {
        let mut body = Map::new();
        body.insert("date".into(), Value::String(p.date.clone()));
        body.insert("description".into(), Value::String(p.description.clone()));
        if let Some(tags) = &p.tags {
            body.insert("tags".into(), serde_json::to_value(tags)?);
        }
        let request = self
            .project_request(Method::POST, "annotations")
            .json(Value::Object(body));
        self.execute(request).await
    }

    pub async fn update_annotation(&self, p: &UpdateAnnotationParams) -> Result<Value> {
        let mut body = Map::new();
        if let Some(description) = &p.description {
            body.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(tags) = &p.tags {
            body.insert("tags".into(), serde_json::to_value(tags)?);
        }
        let request = self
            .project_request(Method::PATCH, "annotations")
            .segment(p.annotation_id.to_string())
            .json(Value::Object(body));
        self.execute(request).await
    }

    pub async fn delete_annotation(&self, p: &AnnotationIdParams) -> Result<Value> {
        let request = self
            .project_request(Method::DELETE, "annotations")
            .segment(p.annotation_id.to_string());
        self.execute(request).await
    }
}
