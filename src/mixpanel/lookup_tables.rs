//! Lookup tables, uploaded as CSV to the ingestion surface.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::client::MixpanelClient;
use super::csv::rows_to_csv;
use super::endpoints::ApiSurface;
use super::error::Result;
use super::params::{Validate, require_items, require_non_empty};
use super::request::RequestDescriptor;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListLookupTablesParams {}

impl Validate for ListLookupTablesParams {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateLookupTableParams {
    pub lookup_table_id: String,
    pub rows: Vec<Map<String, Value>>,
}

impl Validate for CreateLookupTableParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("lookupTableId", &self.lookup_table_id)?;
        require_items("rows", &self.rows, usize::MAX)
    }
}

impl MixpanelClient {
    pub async fn list_lookup_tables(&self, _p: &ListLookupTablesParams) -> Result<Value> {
        let request = RequestDescriptor::get(ApiSurface::Ingestion, "/lookup-tables")
            .param("project_id", self.credentials().project_id());
        self.execute(request).await
    }

    /// Replace a lookup table's contents with `rows`.
    pub async fn create_lookup_table(&self, p: &CreateLookupTableParams) -> Result<Value> {
        let csv = rows_to_csv(&p.rows)?;
        tracing::debug!(rows = p.rows.len(), bytes = csv.len(), "Uploading lookup table");
        let request = RequestDescriptor::put(ApiSurface::Ingestion, "/lookup-tables")
            .segment(&p.lookup_table_id)
            .param("project_id", self.credentials().project_id())
            .csv(csv);
        self.execute(request).await
    }
}
