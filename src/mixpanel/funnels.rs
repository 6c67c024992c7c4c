//! Funnels, retention and frequency ("addiction") reports.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::client::MixpanelClient;
use super::error::Result;
use super::params::{
    TimeUnit, Validate, require_date_range, require_opt_non_empty, require_positive,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FunnelParams {
    pub funnel_id: u64,
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub length: Option<u32>,
    #[serde(default)]
    pub length_unit: Option<TimeUnit>,
    #[serde(default)]
    pub interval: Option<u32>,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default)]
    pub on: Option<String>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for FunnelParams {
    fn validate(&self) -> Result<()> {
        require_date_range(&self.from_date, &self.to_date)?;
        require_positive("length", self.length)?;
        require_positive("interval", self.interval)?;
        require_positive("limit", self.limit)?;
        require_opt_non_empty("on", self.on.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListFunnelsParams {}

impl Validate for ListFunnelsParams {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// How retention cohorts are formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionType {
    Birth,
    Compounded,
}

impl std::fmt::Display for RetentionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Birth => "birth",
            Self::Compounded => "compounded",
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetentionParams {
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub retention_type: Option<RetentionType>,
    #[serde(default)]
    pub born_event: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub born_where: Option<String>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub interval: Option<u32>,
    #[serde(default)]
    pub interval_count: Option<u32>,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default)]
    pub on: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for RetentionParams {
    fn validate(&self) -> Result<()> {
        require_date_range(&self.from_date, &self.to_date)?;
        require_opt_non_empty("bornEvent", self.born_event.as_deref())?;
        require_opt_non_empty("event", self.event.as_deref())?;
        require_positive("interval", self.interval)?;
        require_positive("intervalCount", self.interval_count)?;
        require_positive("limit", self.limit)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FrequencyParams {
    pub from_date: String,
    pub to_date: String,
    pub unit: TimeUnit,
    pub addiction_unit: TimeUnit,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub on: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for FrequencyParams {
    fn validate(&self) -> Result<()> {
        require_date_range(&self.from_date, &self.to_date)?;
        require_opt_non_empty("event", self.event.as_deref())?;
        require_positive("limit", self.limit)
    }
}

impl MixpanelClient {
    pub async fn query_funnel(&self, p: &FunnelParams) -> Result<Value> {
        let request = self
            .query_get("/funnels")
            .param("funnel_id", p.funnel_id)
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param_opt("length", p.length)
            .param_opt("length_unit", p.length_unit)
            .param_opt("interval", p.interval)
            .param_opt("unit", p.unit)
            .param_opt("on", p.on.as_ref())
            .param_opt("where", p.where_clause.as_ref())
            .param_opt("limit", p.limit);
        self.execute(request).await
    }

    pub async fn list_funnels(&self, _p: &ListFunnelsParams) -> Result<Value> {
        self.execute(self.query_get("/funnels/list")).await
    }

    pub async fn query_retention(&self, p: &RetentionParams) -> Result<Value> {
        let request = self
            .query_get("/retention")
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param_opt("retention_type", p.retention_type)
            .param_opt("born_event", p.born_event.as_ref())
            .param_opt("event", p.event.as_ref())
            .param_opt("born_where", p.born_where.as_ref())
            .param_opt("where", p.where_clause.as_ref())
            .param_opt("interval", p.interval)
            .param_opt("interval_count", p.interval_count)
            .param_opt("unit", p.unit)
            .param_opt("on", p.on.as_ref())
            .param_opt("limit", p.limit);
        self.execute(request).await
    }

    pub async fn query_frequency(&self, p: &FrequencyParams) -> Result<Value> {
        let request = self
            .query_get("/retention/addiction")
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param("unit", p.unit)
            .param("addiction_unit", p.addiction_unit)
            .param_opt("event", p.event.as_ref())
            .param_opt("where", p.where_clause.as_ref())
            .param_opt("on", p.on.as_ref())
            .param_opt("limit", p.limit);
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixpanel::params::parse_params;
    use serde_json::json;

    #[test]
    fn test_retention_type_wire_names() {
        let p: RetentionParams = parse_params(json!({
            "fromDate": "2024-01-01",
            "toDate": "2024-01-31",
            "retentionType": "compounded",
            "intervalCount": 4
        }))
        .unwrap();
        assert_eq!(p.retention_type.unwrap().to_string(), "compounded");
        assert_eq!(p.interval_count, Some(4));
    }

    #[test]
    fn test_frequency_requires_units() {
        assert!(
            parse_params::<FrequencyParams>(json!({
                "fromDate": "2024-01-01",
                "toDate": "2024-01-31",
                "unit": "day"
            }))
            .is_err()
        );
    }

    #[test]
    fn test_funnel_rejects_zero_limit() {
        assert!(
            parse_params::<FunnelParams>(json!({
                "funnelId": 7,
                "fromDate": "2024-01-01",
                "toDate": "2024-01-31",
                "limit": 0
            }))
            .is_err()
        );
    }

    #[test]
    fn test_list_funnels_rejects_unknown_arguments() {
        assert!(parse_params::<ListFunnelsParams>(json!({})).is_ok());
        assert!(parse_params::<ListFunnelsParams>(json!({"x": 1})).is_err());
    }
}
