//! Reusable JSON Schema fragments for tool inputs.

use serde_json::{Value, json};

pub fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

pub fn integer(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 0, "description": description })
}

pub fn positive(description: &str) -> Value {
    json!({ "type": "integer", "minimum": 1, "description": description })
}

pub fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

pub fn string_list(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

pub fn object(description: &str) -> Value {
    json!({ "type": "object", "description": description })
}

pub fn one_of_strings(values: &[&str], description: &str) -> Value {
    json!({ "type": "string", "enum": values, "description": description })
}

pub fn date(description: &str) -> Value {
    json!({
        "type": "string",
        "pattern": "^\\d{4}-\\d{2}-\\d{2}$",
        "description": format!("{description} (YYYY-MM-DD)"),
    })
}

pub fn from_date() -> Value {
    date("Start date, inclusive")
}

pub fn to_date() -> Value {
    date("End date, inclusive")
}

pub fn event_name() -> Value {
    string("Event name")
}

pub fn count_type() -> Value {
    one_of_strings(
        &["general", "unique", "average"],
        "Aggregation: total, unique users, or average per user",
    )
}

pub fn unit(description: &str) -> Value {
    one_of_strings(&["minute", "hour", "day", "week", "month"], description)
}

pub fn where_clause() -> Value {
    string("Filter expression, e.g. properties[\"plan\"] == \"pro\"")
}

pub fn on_expression() -> Value {
    string("Property expression to segment by, e.g. properties[\"$browser\"]")
}

pub fn limit() -> Value {
    positive("Maximum number of results")
}

pub fn distinct_id() -> Value {
    string("User distinct id")
}

pub fn properties(description: &str) -> Value {
    json!({
        "type": "object",
        "minProperties": 1,
        "description": description,
    })
}

pub fn output_properties() -> Value {
    string_list("Profile properties to include in the result")
}

pub fn tracked_event() -> Value {
    json!({
        "type": "object",
        "properties": {
            "event": event_name(),
            "distinctId": distinct_id(),
            "properties": object("Event properties"),
            "time": integer("Event time in unix seconds; defaults to now"),
            "insertId": string("Deduplication id"),
        },
        "required": ["event"],
        "additionalProperties": false,
    })
}

pub fn group_key() -> Value {
    string("Group key, e.g. company_id")
}

pub fn group_id() -> Value {
    string("Group identifier within the key")
}

pub fn entity_type() -> Value {
    one_of_strings(&["event", "profile"], "Schema entity type")
}

pub fn tracking_id() -> Value {
    string("Tracking id returned when the request was created")
}
