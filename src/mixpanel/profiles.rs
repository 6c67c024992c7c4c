//! Profile and cohort reads via the query surface's `/engage` and
//! `/cohorts/list` form endpoints.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::client::MixpanelClient;
use super::error::Result;
use super::params::{Validate, require_non_empty, require_opt_non_empty};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QueryProfilesParams {
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub output_properties: Option<Vec<String>>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub filter_by_cohort: Option<Map<String, Value>>,
    #[serde(default)]
    pub include_all_users: Option<bool>,
}

impl Validate for QueryProfilesParams {
    fn validate(&self) -> Result<()> {
        require_opt_non_empty("sessionId", self.session_id.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GetProfileParams {
    pub distinct_id: String,
    #[serde(default)]
    pub output_properties: Option<Vec<String>>,
}

impl Validate for GetProfileParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("distinctId", &self.distinct_id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListCohortsParams {}

impl Validate for ListCohortsParams {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CohortMembersParams {
    pub cohort_id: u64,
    #[serde(default)]
    pub output_properties: Option<Vec<String>>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl Validate for CohortMembersParams {
    fn validate(&self) -> Result<()> {
        require_opt_non_empty("sessionId", self.session_id.as_deref())
    }
}

/// Form fields for `/engage`, in insertion order.
#[derive(Debug, Default)]
struct EngageForm(Vec<(String, String)>);

impl EngageForm {
    fn field(mut self, key: &str, value: impl ToString) -> Self {
        self.0.push((key.to_string(), value.to_string()));
        self
    }

    fn field_opt<T: ToString>(self, key: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.field(key, v),
            None => self,
        }
    }

    fn field_json<T: serde::Serialize>(self, key: &str, value: Option<&T>) -> Result<Self> {
        match value {
            Some(v) => Ok(self.field(key, serde_json::to_string(v)?)),
            None => Ok(self),
        }
    }
}

impl MixpanelClient {
    pub async fn query_profiles(&self, p: &QueryProfilesParams) -> Result<Value> {
        let form = EngageForm::default()
            .field_opt("where", p.where_clause.as_ref())
            .field_json("output_properties", p.output_properties.as_ref())?
            .field_opt("session_id", p.session_id.as_ref())
            .field_opt("page", p.page)
            .field_json("filter_by_cohort", p.filter_by_cohort.as_ref())?
            .field_opt("include_all_users", p.include_all_users);
        self.execute(self.query_post("/engage").form(form.0)).await
    }

    pub async fn get_profile(&self, p: &GetProfileParams) -> Result<Value> {
        let form = EngageForm::default()
            .field("distinct_id", &p.distinct_id)
            .field_json("output_properties", p.output_properties.as_ref())?;
        self.execute(self.query_post("/engage").form(form.0)).await
    }

    pub async fn list_cohorts(&self, _p: &ListCohortsParams) -> Result<Value> {
        self.execute(self.query_post("/cohorts/list")).await
    }

    pub async fn query_cohort_members(&self, p: &CohortMembersParams) -> Result<Value> {
        let cohort = json!({ "id": p.cohort_id });
        let form = EngageForm::default()
            .field_json("filter_by_cohort", Some(&cohort))?
            .field_json("output_properties", p.output_properties.as_ref())?
            .field_opt("page", p.page)
            .field_opt("session_id", p.session_id.as_ref());
        self.execute(self.query_post("/engage").form(form.0)).await
    }
}
