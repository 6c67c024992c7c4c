//! Raw event export from the data-export surface.

use serde::Deserialize;
use serde_json::{Value, json};

use super::client::MixpanelClient;
use super::endpoints::ApiSurface;
use super::error::Result;
use super::params::{Validate, require_date_range, require_positive};
use super::request::RequestDescriptor;
use super::response::parse_ndjson;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExportParams {
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub event: Option<Vec<String>>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for ExportParams {
    fn validate(&self) -> Result<()> {
        require_date_range(&self.from_date, &self.to_date)?;
        require_positive("limit", self.limit)
    }
}

impl MixpanelClient {
    /// Export raw events. The response is newline-delimited JSON and is
    /// returned as `{"events": [...], "count": n}`.
    pub async fn export_events(&self, p: &ExportParams) -> Result<Value> {
        let request = RequestDescriptor::get(ApiSurface::Export, "/export")
            .param("project_id", self.credentials().project_id())
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param_json_opt("event", p.event.as_ref())?
            .param_opt("where", p.where_clause.as_ref())
            .param_opt("limit", p.limit);

        let raw = self.send(request).await?;
        let events = parse_ndjson(raw.status, &raw.text)?;
        tracing::debug!(count = events.len(), "Exported events");
        Ok(json!({
            "count": events.len(),
            "events": events,
        }))
    }
}
