//! Profile and group property mutation (`/engage`, `/groups`).
//!
//! Every mutation shares one envelope: the project token, the target
//! identity, and exactly one operation key carrying its payload.
//!
//! ```text
//! [{"$token": T, "$distinct_id": D, "$set": {...}}]                  // profiles
//! [{"$token": T, "$group_key": K, "$group_id": I, "$union": {...}}]  // groups
//! ```

use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::client::MixpanelClient;
use super::endpoints::ApiSurface;
use super::error::{MixpanelError, Result};
use super::params::{Validate, require_items, require_non_empty};
use super::request::RequestDescriptor;

/// One property mutation, carrying its own payload type.
#[derive(Debug, Clone, PartialEq)]
pub enum EngageOperation {
    /// `$set`: overwrite properties.
    Set(Map<String, Value>),
    /// `$set_once`: set only properties that are not already set.
    SetOnce(Map<String, Value>),
    /// `$add`: increment numeric properties.
    Add(Map<String, Value>),
    /// `$append`: append values to list properties.
    Append(Map<String, Value>),
    /// `$remove`: remove values from list properties.
    Remove(Map<String, Value>),
    /// `$union`: merge lists into list properties without duplicates.
    Union(Map<String, Value>),
    /// `$unset`: delete the named properties.
    Unset(Vec<String>),
    /// `$delete`: delete the whole profile or group.
    Delete { ignore_alias: bool },
}

impl EngageOperation {
    /// Wire key selecting this operation.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Set(_) => "$set",
            Self::SetOnce(_) => "$set_once",
            Self::Add(_) => "$add",
            Self::Append(_) => "$append",
            Self::Remove(_) => "$remove",
            Self::Union(_) => "$union",
            Self::Unset(_) => "$unset",
            Self::Delete { .. } => "$delete",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::Set(map)
            | Self::SetOnce(map)
            | Self::Add(map)
            | Self::Append(map)
            | Self::Remove(map)
            | Self::Union(map) => Value::Object(map.clone()),
            Self::Unset(names) => json!(names),
            Self::Delete { .. } => Value::String(String::new()),
        }
    }

    /// Group profiles accept every operation except `$add` and `$append`.
    pub fn supported_by_groups(&self) -> bool {
        !matches!(self, Self::Add(_) | Self::Append(_))
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Set(map)
            | Self::SetOnce(map)
            | Self::Append(map)
            | Self::Remove(map) => require_properties(map),
            Self::Add(map) => {
                require_properties(map)?;
                if let Some((name, _)) = map.iter().find(|(_, v)| !v.is_number()) {
                    return Err(MixpanelError::invalid(format!(
                        "increment value for {name:?} must be a number"
                    )));
                }
                Ok(())
            }
            Self::Union(map) => {
                require_properties(map)?;
                if let Some((name, _)) = map.iter().find(|(_, v)| !v.is_array()) {
                    return Err(MixpanelError::invalid(format!(
                        "union value for {name:?} must be a list"
                    )));
                }
                Ok(())
            }
            Self::Unset(names) => {
                require_items("propertyNames", names, usize::MAX)?;
                names
                    .iter()
                    .try_for_each(|n| require_non_empty("propertyNames", n))
            }
            Self::Delete { .. } => Ok(()),
        }
    }
}

fn require_properties(map: &Map<String, Value>) -> Result<()> {
    if map.is_empty() {
        return Err(MixpanelError::invalid("properties must not be empty"));
    }
    Ok(())
}

/// Which record a mutation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngageTarget<'a> {
    Profile { distinct_id: &'a str },
    Group { group_key: &'a str, group_id: &'a str },
}

/// Build the single-record envelope for one mutation.
pub fn engage_envelope(token: &str, target: EngageTarget<'_>, op: &EngageOperation) -> Value {
    let mut record = Map::new();
    record.insert("$token".into(), Value::String(token.to_string()));
    match target {
        EngageTarget::Profile { distinct_id } => {
            record.insert("$distinct_id".into(), Value::String(distinct_id.to_string()));
        }
        EngageTarget::Group { group_key, group_id } => {
            record.insert("$group_key".into(), Value::String(group_key.to_string()));
            record.insert("$group_id".into(), Value::String(group_id.to_string()));
        }
    }
    record.insert(op.key().into(), op.payload());
    if let EngageOperation::Delete { ignore_alias: true } = op {
        record.insert("$ignore_alias".into(), Value::Bool(true));
    }
    Value::Object(record)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tool parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Properties keyed by a profile's distinct id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePropertiesParams {
    pub distinct_id: String,
    pub properties: Map<String, Value>,
}

impl Validate for ProfilePropertiesParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("distinctId", &self.distinct_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUnsetParams {
    pub distinct_id: String,
    pub property_names: Vec<String>,
}

impl Validate for ProfileUnsetParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("distinctId", &self.distinct_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileDeleteParams {
    pub distinct_id: String,
    #[serde(default)]
    pub ignore_alias: bool,
}

impl Validate for ProfileDeleteParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("distinctId", &self.distinct_id)
    }
}

/// Properties keyed by a group key and id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupPropertiesParams {
    pub group_key: String,
    pub group_id: String,
    pub properties: Map<String, Value>,
}

impl Validate for GroupPropertiesParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("groupKey", &self.group_key)?;
        require_non_empty("groupId", &self.group_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupUnsetParams {
    pub group_key: String,
    pub group_id: String,
    pub property_names: Vec<String>,
}

impl Validate for GroupUnsetParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("groupKey", &self.group_key)?;
        require_non_empty("groupId", &self.group_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GroupDeleteParams {
    pub group_key: String,
    pub group_id: String,
}

impl Validate for GroupDeleteParams {
    fn validate(&self) -> Result<()> {
        require_non_empty("groupKey", &self.group_key)?;
        require_non_empty("groupId", &self.group_id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client operations
// ─────────────────────────────────────────────────────────────────────────────

impl MixpanelClient {
    /// Apply one mutation to a user profile via `/engage`.
    pub async fn update_profile(&self, distinct_id: &str, op: EngageOperation) -> Result<Value> {
        require_non_empty("distinctId", distinct_id)?;
        op.validate()?;
        let token = self.project_token("profile update")?;
        let body = json!([engage_envelope(
            token,
            EngageTarget::Profile { distinct_id },
            &op
        )]);
        tracing::debug!(operation = op.key(), "Updating profile");
        self.execute_ingestion(engage_request("/engage", body))
            .await
    }

    /// Apply one mutation to a group profile via `/groups`.
    pub async fn update_group(
        &self,
        group_key: &str,
        group_id: &str,
        op: EngageOperation,
    ) -> Result<Value> {
        require_non_empty("groupKey", group_key)?;
        require_non_empty("groupId", group_id)?;
        if !op.supported_by_groups() {
            return Err(MixpanelError::invalid(format!(
                "{} is not supported for group profiles",
                op.key()
            )));
        }
        op.validate()?;
        let token = self.project_token("group update")?;
        let body = json!([engage_envelope(
            token,
            EngageTarget::Group { group_key, group_id },
            &op
        )]);
        tracing::debug!(operation = op.key(), "Updating group");
        self.execute_ingestion(engage_request("/groups", body))
            .await
    }
}

fn engage_request(path: &str, body: Value) -> RequestDescriptor {
    RequestDescriptor::post(ApiSurface::Ingestion, path)
        .param("verbose", 1)
        .json(body)
        .token_auth()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(value: Value) -> Map<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_profile_set_envelope() {
        let op = EngageOperation::Set(props(json!({"plan": "pro"})));
        let envelope = engage_envelope("tok", EngageTarget::Profile { distinct_id: "u1" }, &op);
        assert_eq!(
            envelope,
            json!({"$token": "tok", "$distinct_id": "u1", "$set": {"plan": "pro"}})
        );
    }

    #[test]
    fn test_group_envelope() {
        let op = EngageOperation::Union(props(json!({"tags": ["a"]})));
        let envelope = engage_envelope(
            "tok",
            EngageTarget::Group {
                group_key: "company",
                group_id: "acme",
            },
            &op,
        );
        assert_eq!(
            envelope,
            json!({
                "$token": "tok",
                "$group_key": "company",
                "$group_id": "acme",
                "$union": {"tags": ["a"]}
            })
        );
    }

    #[test]
    fn test_operation_keys() {
        let empty = Map::new();
        let keys: Vec<&str> = [
            EngageOperation::Set(empty.clone()),
            EngageOperation::SetOnce(empty.clone()),
            EngageOperation::Add(empty.clone()),
            EngageOperation::Append(empty.clone()),
            EngageOperation::Remove(empty.clone()),
            EngageOperation::Union(empty),
            EngageOperation::Unset(vec![]),
            EngageOperation::Delete {
                ignore_alias: false,
            },
        ]
        .iter()
        .map(EngageOperation::key)
        .collect();
        assert_eq!(
            keys,
            [
                "$set",
                "$set_once",
                "$add",
                "$append",
                "$remove",
                "$union",
                "$unset",
                "$delete"
            ]
        );
    }

    #[test]
    fn test_delete_payload() {
        let op = EngageOperation::Delete { ignore_alias: true };
        let envelope = engage_envelope("tok", EngageTarget::Profile { distinct_id: "u1" }, &op);
        assert_eq!(envelope["$delete"], "");
        assert_eq!(envelope["$ignore_alias"], true);

        let op = EngageOperation::Delete {
            ignore_alias: false,
        };
        let envelope = engage_envelope("tok", EngageTarget::Profile { distinct_id: "u1" }, &op);
        assert!(envelope.get("$ignore_alias").is_none());
    }

    #[test]
    fn test_unset_payload_is_list() {
        let op = EngageOperation::Unset(vec!["plan".into(), "seats".into()]);
        assert_eq!(op.payload(), json!(["plan", "seats"]));
    }

    #[test]
    fn test_validation() {
        assert!(EngageOperation::Set(Map::new()).validate().is_err());
        assert!(
            EngageOperation::Add(props(json!({"logins": "one"})))
                .validate()
                .is_err()
        );
        assert!(EngageOperation::Add(props(json!({"logins": 1}))).validate().is_ok());
        assert!(
            EngageOperation::Union(props(json!({"tags": "a"})))
                .validate()
                .is_err()
        );
        assert!(EngageOperation::Unset(vec![]).validate().is_err());
    }

    #[test]
    fn test_group_support() {
        assert!(EngageOperation::Set(Map::new()).supported_by_groups());
        assert!(!EngageOperation::Add(Map::new()).supported_by_groups());
        assert!(!EngageOperation::Append(Map::new()).supported_by_groups());
    }
}
