//! Event analytics on the query surface: insights, segmentation, event and
//! property breakdowns, activity streams and JQL.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::client::MixpanelClient;
use super::error::Result;
use super::params::{
    CountType, OneOrMany, TimeUnit, Validate, require_date_range, require_items,
    require_non_empty, require_opt_non_empty, require_positive,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InsightsParams {
    pub from_date: String,
    pub to_date: String,
    pub event: OneOrMany<String>,
    #[serde(default, rename = "type")]
    pub count_type: Option<CountType>,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
}

impl Validate for InsightsParams {
    fn validate(&self) -> Result<()> {
        require_date_range(&self.from_date, &self.to_date)?;
        self.event.validate("event")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SavedReportParams {
    pub bookmark_id: u64,
}

impl Validate for SavedReportParams {
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SegmentationParams {
    pub event: String,
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub on: Option<String>,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default)]
    pub interval: Option<u32>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default, rename = "type")]
    pub count_type: Option<CountType>,
}

impl Validate for SegmentationParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("event", &self.event)?;
        require_date_range(&self.from_date, &self.to_date)?;
        require_opt_non_empty("on", self.on.as_deref())?;
        require_positive("interval", self.interval)?;
        require_positive("limit", self.limit)
    }
}

/// Numeric bucketing of an event by a numeric expression.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumericSegmentationParams {
    pub event: String,
    pub from_date: String,
    pub to_date: String,
    pub on: String,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
    #[serde(default, rename = "type")]
    pub count_type: Option<CountType>,
}

impl Validate for NumericSegmentationParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("event", &self.event)?;
        require_date_range(&self.from_date, &self.to_date)?;
        require_non_empty("on", &self.on)
    }
}

/// Sum or average of a numeric expression. These endpoints take no `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NumericAggregateParams {
    pub event: String,
    pub from_date: String,
    pub to_date: String,
    pub on: String,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
}

impl Validate for NumericAggregateParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("event", &self.event)?;
        require_date_range(&self.from_date, &self.to_date)?;
        require_non_empty("on", &self.on)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventPropertiesParams {
    pub event: String,
    pub name: String,
    pub from_date: String,
    pub to_date: String,
    #[serde(default)]
    pub values: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub count_type: Option<CountType>,
    #[serde(default)]
    pub unit: Option<TimeUnit>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for EventPropertiesParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("event", &self.event)?;
        require_non_empty("name", &self.name)?;
        require_date_range(&self.from_date, &self.to_date)?;
        require_positive("limit", self.limit)
    }
}

/// Shared by the top-events and event-names listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TopEventsParams {
    #[serde(default, rename = "type")]
    pub count_type: Option<CountType>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for TopEventsParams {
    fn validate(&self) -> Result<()> {
        require_positive("limit", self.limit)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TopPropertiesParams {
    pub event: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for TopPropertiesParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("event", &self.event)?;
        require_positive("limit", self.limit)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TopPropertyValuesParams {
    pub event: String,
    pub name: String,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl Validate for TopPropertyValuesParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("event", &self.event)?;
        require_non_empty("name", &self.name)?;
        require_positive("limit", self.limit)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ActivityStreamParams {
    pub distinct_ids: Vec<String>,
    pub from_date: String,
    pub to_date: String,
}

impl Validate for ActivityStreamParams {
    fn validate(&self) -> Result<()> {
        require_items("distinctIds", &self.distinct_ids, usize::MAX)?;
        self.distinct_ids
            .iter()
            .try_for_each(|id| require_non_empty("distinctIds", id))?;
        require_date_range(&self.from_date, &self.to_date)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JqlParams {
    pub script: String,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
}

impl Validate for JqlParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("script", &self.script)
    }
}

impl MixpanelClient {
    pub async fn query_insights(&self, p: &InsightsParams) -> Result<Value> {
        let request = self
            .query_get("/events")
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param_json("event", &p.event.to_vec())?
            .param_opt("type", p.count_type)
            .param_opt("unit", p.unit);
        self.execute(request).await
    }

    pub async fn query_saved_report(&self, p: &SavedReportParams) -> Result<Value> {
        let request = self
            .query_get("/insights")
            .param("bookmark_id", p.bookmark_id);
        self.execute(request).await
    }

    pub async fn query_segmentation(&self, p: &SegmentationParams) -> Result<Value> {
        let request = self
            .query_get("/segmentation")
            .param("event", &p.event)
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param_opt("on", p.on.as_ref())
            .param_opt("unit", p.unit)
            .param_opt("interval", p.interval)
            .param_opt("where", p.where_clause.as_ref())
            .param_opt("limit", p.limit)
            .param_opt("type", p.count_type);
        self.execute(request).await
    }

    pub async fn query_segmentation_numeric(&self, p: &NumericSegmentationParams) -> Result<Value> {
        let request = self
            .query_get("/segmentation/numeric")
            .param("event", &p.event)
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param("on", &p.on)
            .param_opt("unit", p.unit)
            .param_opt("where", p.where_clause.as_ref())
            .param_opt("type", p.count_type);
        self.execute(request).await
    }

    pub async fn query_segmentation_sum(&self, p: &NumericAggregateParams) -> Result<Value> {
        self.numeric_aggregate("/segmentation/sum", p).await
    }

    pub async fn query_segmentation_average(&self, p: &NumericAggregateParams) -> Result<Value> {
        self.numeric_aggregate("/segmentation/average", p).await
    }

    async fn numeric_aggregate(&self, path: &str, p: &NumericAggregateParams) -> Result<Value> {
        let request = self
            .query_get(path)
            .param("event", &p.event)
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param("on", &p.on)
            .param_opt("unit", p.unit)
            .param_opt("where", p.where_clause.as_ref());
        self.execute(request).await
    }

    pub async fn query_event_properties(&self, p: &EventPropertiesParams) -> Result<Value> {
        let request = self
            .query_get("/events/properties")
            .param("event", &p.event)
            .param("name", &p.name)
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date)
            .param_json_opt("values", p.values.as_ref())?
            .param_opt("type", p.count_type)
            .param_opt("unit", p.unit)
            .param_opt("limit", p.limit);
        self.execute(request).await
    }

    pub async fn list_top_events(&self, p: &TopEventsParams) -> Result<Value> {
        let request = self
            .query_get("/events/top")
            .param_opt("type", p.count_type)
            .param_opt("limit", p.limit);
        self.execute(request).await
    }

    pub async fn list_event_names(&self, p: &TopEventsParams) -> Result<Value> {
        let request = self
            .query_get("/events/names")
            .param_opt("type", p.count_type)
            .param_opt("limit", p.limit);
        self.execute(request).await
    }

    pub async fn list_top_event_properties(&self, p: &TopPropertiesParams) -> Result<Value> {
        let request = self
            .query_get("/events/properties/top")
            .param("event", &p.event)
            .param_opt("limit", p.limit);
        self.execute(request).await
    }

    pub async fn list_top_property_values(&self, p: &TopPropertyValuesParams) -> Result<Value> {
        let request = self
            .query_get("/events/properties/values")
            .param("event", &p.event)
            .param("name", &p.name)
            .param_opt("limit", p.limit);
        self.execute(request).await
    }

    pub async fn query_activity_stream(&self, p: &ActivityStreamParams) -> Result<Value> {
        let request = self
            .query_get("/stream/query")
            .param_json("distinct_ids", &p.distinct_ids)?
            .param("from_date", &p.from_date)
            .param("to_date", &p.to_date);
        self.execute(request).await
    }

    /// Run a JQL script. The script and its params travel as form fields.
    pub async fn query_jql(&self, p: &JqlParams) -> Result<Value> {
        let mut form = vec![("script".to_string(), p.script.clone())];
        if let Some(params) = &p.params {
            form.push(("params".to_string(), serde_json::to_string(params)?));
        }
        let request = self.query_post("/jql").form(form);
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixpanel::params::parse_params;
    use serde_json::json;

    #[test]
    fn test_insights_accepts_single_event() {
        let p: InsightsParams = parse_params(json!({
            "fromDate": "2024-01-01",
            "toDate": "2024-01-31",
            "event": "Signup",
            "type": "unique"
        }))
        .unwrap();
        assert_eq!(p.event.to_vec(), vec!["Signup".to_string()]);
        assert_eq!(p.count_type, Some(CountType::Unique));
    }

    #[test]
    fn test_insights_rejects_bad_dates() {
        let err = parse_params::<InsightsParams>(json!({
            "fromDate": "2024/01/01",
            "toDate": "2024-01-31",
            "event": "Signup"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn test_segmentation_where_is_renamed() {
        let p: SegmentationParams = parse_params(json!({
            "event": "Signup",
            "fromDate": "2024-01-01",
            "toDate": "2024-01-02",
            "where": "properties[\"plan\"] == \"pro\""
        }))
        .unwrap();
        assert!(p.where_clause.is_some());
    }

    #[test]
    fn test_numeric_type_only_on_bucketing() {
        let args = json!({
            "event": "Purchase",
            "fromDate": "2024-01-01",
            "toDate": "2024-01-02",
            "on": "properties[\"amount\"]",
            "type": "unique"
        });
        let p: NumericSegmentationParams = parse_params(args.clone()).unwrap();
        assert_eq!(p.count_type, Some(CountType::Unique));

        let err = parse_params::<NumericAggregateParams>(args).unwrap_err();
        assert!(err.to_string().contains("type"), "{err}");
    }

    #[test]
    fn test_activity_stream_requires_ids() {
        let err = parse_params::<ActivityStreamParams>(json!({
            "distinctIds": [],
            "fromDate": "2024-01-01",
            "toDate": "2024-01-02"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn test_top_events_accept_no_arguments() {
        let p: TopEventsParams = parse_params(Value::Null).unwrap();
        assert!(p.limit.is_none());
    }
}
