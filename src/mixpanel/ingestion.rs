//! Event ingestion: token-authenticated `/track` and service-account
//! `/import`.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::client::MixpanelClient;
use super::endpoints::ApiSurface;
use super::error::{MixpanelError, Result};
use super::params::{Validate, require_items, require_non_empty, require_opt_non_empty};
use super::request::RequestDescriptor;

/// `/track` accepts at most this many events per request.
pub const MAX_TRACK_BATCH: usize = 50;
/// `/import` accepts at most this many events per request.
pub const MAX_IMPORT_BATCH: usize = 2000;

/// One event as supplied by a caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackedEvent {
    pub event: String,
    #[serde(default)]
    pub distinct_id: Option<String>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    /// Unix seconds. Defaults to now for `/track`; required for `/import`.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub insert_id: Option<String>,
}

impl TrackedEvent {
    fn check(&self) -> Result<()> {
        require_non_empty("event", &self.event)?;
        require_opt_non_empty("distinctId", self.distinct_id.as_deref())?;
        require_opt_non_empty("insertId", self.insert_id.as_deref())?;
        if self.time.is_some_and(|t| t < 0) {
            return Err(MixpanelError::invalid("time must be unix seconds"));
        }
        Ok(())
    }

    fn check_importable(&self, index: usize) -> Result<()> {
        self.check()?;
        if self.time.is_none() {
            return Err(MixpanelError::invalid(format!(
                "events[{index}].time is required for import"
            )));
        }
        if self.distinct_id.is_none() {
            return Err(MixpanelError::invalid(format!(
                "events[{index}].distinctId is required for import"
            )));
        }
        Ok(())
    }
}

/// Build the wire form of one event.
///
/// Caller properties are kept; the reserved keys (`token`, `distinct_id`,
/// `time`, `$insert_id`) are written on top of them.
pub fn event_payload(event: &TrackedEvent, token: Option<&str>, now: i64) -> Value {
    let mut properties = event.properties.clone().unwrap_or_default();
    if let Some(token) = token {
        properties.insert("token".into(), Value::String(token.to_string()));
    }
    if let Some(distinct_id) = &event.distinct_id {
        properties.insert("distinct_id".into(), Value::String(distinct_id.clone()));
    }
    properties.insert("time".into(), json!(event.time.unwrap_or(now)));
    if let Some(insert_id) = &event.insert_id {
        properties.insert("$insert_id".into(), Value::String(insert_id.clone()));
    }
    json!({ "event": event.event, "properties": properties })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct TrackEventParams(pub TrackedEvent);

impl Validate for TrackEventParams {
    fn validate(&self) -> Result<()> {
        self.0.check()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackEventsParams {
    pub events: Vec<TrackedEvent>,
}

impl Validate for TrackEventsParams {
    fn validate(&self) -> Result<()> {
        require_items("events", &self.events, MAX_TRACK_BATCH)?;
        self.events.iter().try_for_each(TrackedEvent::check)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImportEventsParams {
    pub events: Vec<TrackedEvent>,
}

impl Validate for ImportEventsParams {
    fn validate(&self) -> Result<()> {
        require_items("events", &self.events, MAX_IMPORT_BATCH)?;
        self.events
            .iter()
            .enumerate()
            .try_for_each(|(idx, e)| e.check_importable(idx))
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl MixpanelClient {
    pub async fn track_event(&self, p: &TrackEventParams) -> Result<Value> {
        self.track(std::slice::from_ref(&p.0)).await
    }

    pub async fn track_events(&self, p: &TrackEventsParams) -> Result<Value> {
        self.track(&p.events).await
    }

    /// Send events to `/track` with the project token in each payload.
    pub(crate) async fn track(&self, events: &[TrackedEvent]) -> Result<Value> {
        let token = self.project_token("event tracking")?;
        let now = unix_now();
        let body: Vec<Value> = events
            .iter()
            .map(|e| event_payload(e, Some(token), now))
            .collect();
        let request = RequestDescriptor::post(ApiSurface::Ingestion, "/track")
            .param("verbose", 1)
            .json(Value::Array(body))
            .token_auth();
        self.execute_ingestion(request).await
    }

    /// Import historical events with service-account auth and strict
    /// validation on the server side.
    pub async fn import_events(&self, p: &ImportEventsParams) -> Result<Value> {
        let now = unix_now();
        let body: Vec<Value> = p
            .events
            .iter()
            .map(|e| event_payload(e, None, now))
            .collect();
        let request = RequestDescriptor::post(ApiSurface::Ingestion, "/import")
            .param("strict", 1)
            .param("project_id", self.credentials().project_id())
            .json(Value::Array(body));
        self.execute(request).await
    }
}
