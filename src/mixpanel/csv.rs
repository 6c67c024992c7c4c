//! CSV serialization for lookup-table uploads.

use std::borrow::Cow;

use serde_json::{Map, Value};

use super::error::{MixpanelError, Result};

/// Serialize rows into CSV text.
///
/// The header is the key set of the first row, in its order. Missing cells
/// are empty, strings are written verbatim, and any other JSON value is
/// written as its JSON text. Fields containing a comma, quote, CR or LF are
/// quoted with internal quotes doubled. A record made of one empty field is
/// written as `""` so it is not read back as a blank line.
pub fn rows_to_csv(rows: &[Map<String, Value>]) -> Result<String> {
    let first = rows
        .first()
        .ok_or_else(|| MixpanelError::invalid("rows must contain at least one row"))?;
    if first.is_empty() {
        return Err(MixpanelError::invalid(
            "the first row must define at least one column",
        ));
    }

    let columns: Vec<&String> = first.keys().collect();
    let mut out = String::new();
    push_record(&mut out, columns.iter().map(|c| Cow::Borrowed(c.as_str())));

    for row in rows {
        push_record(&mut out, columns.iter().map(|c| cell(row.get(*c))));
    }

    Ok(out)
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = Cow<'a, str>>) {
    let start = out.len();
    for (idx, field) in fields.enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(&field));
    }
    // A lone empty field would be a blank line, which readers skip.
    if out.len() == start {
        out.push_str("\"\"");
    }
    out.push('\n');
}

fn cell(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Map<String, Value>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_simple_table() {
        let csv = rows_to_csv(&rows(json!([
            {"id": "a", "name": "Alpha"},
            {"id": "b", "name": "Beta"}
        ])))
        .unwrap();
        assert_eq!(csv, "id,name\na,Alpha\nb,Beta\n");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_columns_follow_first_row() {
        let csv = rows_to_csv(&rows(json!([
            {"id": "a", "score": 1},
            {"id": "b", "extra": "ignored"},
            {"score": true, "id": "c"}
        ])))
        .unwrap();
        assert_eq!(csv, "id,score\na,1\nb,\nc,true\n");
    }

    #[test]
    fn test_single_empty_cell_is_quoted() {
        let csv = rows_to_csv(&rows(json!([
            {"id": "a"},
            {"id": ""},
            {"id": null},
            {"other": "x"},
            {"id": "c"}
        ])))
        .unwrap();
        assert_eq!(csv, "id\na\n\"\"\n\"\"\n\"\"\nc\n");
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(rows_to_csv(&[]).is_err());
        assert!(rows_to_csv(&rows(json!([{}]))).is_err());
    }
}
