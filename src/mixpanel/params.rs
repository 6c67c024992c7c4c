//! Shared parameter types and validation for operation inputs.
//!
//! Tool arguments are deserialized into typed parameter structs
//! (camelCase on the wire), then checked with [`Validate`] before any
//! request is built.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{MixpanelError, Result};

/// Semantic checks that serde cannot express.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Deserialize tool arguments into `P` and validate them.
///
/// Missing arguments (`null`) are treated as an empty object so that
/// parameterless operations accept bare calls.
pub fn parse_params<P>(args: Value) -> Result<P>
where
    P: DeserializeOwned + Validate,
{
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    let params: P = serde_json::from_value(args).map_err(|e| MixpanelError::invalid(e.to_string()))?;
    params.validate()?;
    Ok(params)
}

pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(MixpanelError::invalid(format!("{field} must not be empty")));
    }
    Ok(())
}

pub fn require_opt_non_empty(field: &str, value: Option<&str>) -> Result<()> {
    value.map_or(Ok(()), |v| require_non_empty(field, v))
}

/// `YYYY-MM-DD`, zero padded.
pub fn require_date(field: &str, value: &str) -> Result<NaiveDate> {
    let invalid = || MixpanelError::invalid(format!("{field} must be a YYYY-MM-DD date, got {value:?}"));
    if value.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())
}

pub fn require_date_range(from_date: &str, to_date: &str) -> Result<()> {
    let from = require_date("fromDate", from_date)?;
    let to = require_date("toDate", to_date)?;
    if from > to {
        return Err(MixpanelError::invalid(format!(
            "fromDate {from_date} is after toDate {to_date}"
        )));
    }
    Ok(())
}

pub fn require_items<T>(field: &str, items: &[T], max: usize) -> Result<()> {
    if items.is_empty() {
        return Err(MixpanelError::invalid(format!("{field} must not be empty")));
    }
    if items.len() > max {
        return Err(MixpanelError::invalid(format!(
            "{field} accepts at most {max} items, got {}",
            items.len()
        )));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: Option<u32>) -> Result<()> {
    if value == Some(0) {
        return Err(MixpanelError::invalid(format!("{field} must be greater than 0")));
    }
    Ok(())
}

/// A single value or a list of values (`"Signup"` or `["Signup", "Login"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            Self::One(v) => vec![v.clone()],
            Self::Many(vs) => vs.clone(),
        }
    }
}

impl OneOrMany<String> {
    pub fn validate(&self, field: &str) -> Result<()> {
        let values = self.to_vec();
        require_items(field, &values, usize::MAX)?;
        values.iter().try_for_each(|v| require_non_empty(field, v))
    }
}

/// Aggregation for event counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountType {
    General,
    Unique,
    Average,
}

impl CountType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Unique => "unique",
            Self::Average => "average",
        }
    }
}

impl std::fmt::Display for CountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    struct Probe {
        from_date: String,
        #[serde(default)]
        unit: Option<TimeUnit>,
    }

    impl Validate for Probe {
        fn validate(&self) -> Result<()> {
            require_date("fromDate", &self.from_date).map(|_| ())
        }
    }

    #[test]
    fn test_parse_params_camel_case() {
        let p: Probe = parse_params(json!({"fromDate": "2024-01-01", "unit": "week"})).unwrap();
        assert_eq!(p.unit, Some(TimeUnit::Week));
    }

    #[test]
    fn test_parse_params_rejects_malformed_input() {
        // missing required field
        assert!(parse_params::<Probe>(json!({})).is_err());
        // wrong type
        assert!(parse_params::<Probe>(json!({"fromDate": 20240101})).is_err());
        // invalid enum value
        assert!(parse_params::<Probe>(json!({"fromDate": "2024-01-01", "unit": "year"})).is_err());
        // unknown field
        assert!(parse_params::<Probe>(json!({"fromDate": "2024-01-01", "from_date": "x"})).is_err());
        // semantic validation
        let err = parse_params::<Probe>(json!({"fromDate": "01/02/2024"})).unwrap_err();
        assert!(matches!(err, MixpanelError::InvalidInput(_)));
    }

    #[test]
    fn test_dates() {
        assert!(require_date("d", "2024-02-29").is_ok());
        assert!(require_date("d", "2023-02-29").is_err());
        assert!(require_date("d", "2024-1-01").is_err());
        assert!(require_date_range("2024-01-01", "2024-01-31").is_ok());
        assert!(require_date_range("2024-02-01", "2024-01-31").is_err());
    }

    #[test]
    fn test_one_or_many() {
        let one: OneOrMany<String> = serde_json::from_value(json!("Signup")).unwrap();
        assert_eq!(one.to_vec(), vec!["Signup".to_string()]);
        let many: OneOrMany<String> = serde_json::from_value(json!(["A", "B"])).unwrap();
        assert_eq!(many.to_vec().len(), 2);
        let empty: OneOrMany<String> = serde_json::from_value(json!([])).unwrap();
        assert!(empty.validate("event").is_err());
    }

    #[test]
    fn test_items_bounds() {
        assert!(require_items::<u8>("events", &[], 5).is_err());
        assert!(require_items("events", &[1, 2, 3], 2).is_err());
        assert!(require_items("events", &[1, 2], 2).is_ok());
    }
}
