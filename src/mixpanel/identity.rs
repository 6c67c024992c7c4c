//! Identity management. Each operation is a single pseudo-event sent to
//! `/track`.

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::client::MixpanelClient;
use super::error::{MixpanelError, Result};
use super::ingestion::TrackedEvent;
use super::params::{Validate, require_non_empty};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateIdentityParams {
    /// The known user id.
    pub identified_id: String,
    /// The anonymous id being linked to it.
    pub anon_id: String,
}

impl Validate for CreateIdentityParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("identifiedId", &self.identified_id)?;
        require_non_empty("anonId", &self.anon_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateAliasParams {
    pub distinct_id: String,
    pub alias: String,
}

impl Validate for CreateAliasParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("distinctId", &self.distinct_id)?;
        require_non_empty("alias", &self.alias)?;
        if self.distinct_id == self.alias {
            return Err(MixpanelError::invalid("alias must differ from distinctId"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MergeIdentitiesParams {
    pub distinct_id1: String,
    pub distinct_id2: String,
}

impl Validate for MergeIdentitiesParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("distinctId1", &self.distinct_id1)?;
        require_non_empty("distinctId2", &self.distinct_id2)
    }
}

fn pseudo_event(name: &str, properties: Value) -> TrackedEvent {
    let properties: Map<String, Value> = match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    TrackedEvent {
        event: name.to_string(),
        distinct_id: None,
        properties: Some(properties),
        time: None,
        insert_id: None,
    }
}

impl MixpanelClient {
    pub async fn create_identity(&self, p: &CreateIdentityParams) -> Result<Value> {
        let event = pseudo_event(
            "$identify",
            json!({ "$identified_id": p.identified_id, "$anon_id": p.anon_id }),
        );
        self.track(&[event]).await
    }

    pub async fn create_alias(&self, p: &CreateAliasParams) -> Result<Value> {
        let event = pseudo_event(
            "$create_alias",
            json!({ "distinct_id": p.distinct_id, "alias": p.alias }),
        );
        self.track(&[event]).await
    }

    pub async fn merge_identities(&self, p: &MergeIdentitiesParams) -> Result<Value> {
        let event = pseudo_event(
            "$merge",
            json!({ "$distinct_ids": [p.distinct_id1, p.distinct_id2] }),
        );
        self.track(&[event]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixpanel::ingestion::event_payload;
    use crate::mixpanel::params::parse_params;

    #[test]
    fn test_merge_payload_shape() {
        let event = pseudo_event("$merge", json!({ "$distinct_ids": ["a", "b"] }));
        let payload = event_payload(&event, Some("tok"), 10);
        assert_eq!(payload["event"], "$merge");
        assert_eq!(payload["properties"]["$distinct_ids"], json!(["a", "b"]));
        assert_eq!(payload["properties"]["token"], "tok");
    }

    #[test]
    fn test_alias_must_differ() {
        assert!(
            parse_params::<CreateAliasParams>(json!({"distinctId": "a", "alias": "a"})).is_err()
        );
        assert!(
            parse_params::<CreateAliasParams>(json!({"distinctId": "a", "alias": "b"})).is_ok()
        );
    }
}
