//! Classification and parsing of Mixpanel HTTP responses.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use serde_json::{Value, json};

use super::error::{MixpanelError, Result};

/// Retry delay used when a 429 carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Seconds from a `Retry-After` header value, or the 60 second default when
/// the header is absent or not a non-negative integer.
pub fn parse_retry_after(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Map a non-success status to its error class.
pub fn classify_failure(status: StatusCode, headers: &HeaderMap, body: String) -> MixpanelError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => MixpanelError::RateLimited {
            retry_after_secs: parse_retry_after(
                headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
            ),
            message: body,
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => MixpanelError::Authentication {
            status: status.as_u16(),
            message: body,
        },
        _ => MixpanelError::Api {
            status: status.as_u16(),
            message: body,
        },
    }
}

pub(crate) fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
}

/// Decode a successful body: JSON content types are parsed, anything else is
/// returned as a JSON string of the raw text.
pub fn decode_body(headers: &HeaderMap, text: String) -> Result<Value> {
    if is_json(headers) {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(Value::String(text))
    }
}

/// Parse a newline-delimited JSON stream into one value per non-blank line.
///
/// The stream comes from Mixpanel, so a malformed line is reported as an
/// [`MixpanelError::Api`] fault carrying the response status.
pub fn parse_ndjson(status: StatusCode, text: &str) -> Result<Vec<Value>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| MixpanelError::Api {
                status: status.as_u16(),
                message: format!("export line {} is not valid JSON: {e}", idx + 1),
            })
        })
        .collect()
}

/// Check the body-level status reported by `/track`, `/engage` and `/groups`.
///
/// These endpoints can answer 200 while rejecting the payload: `0` in plain
/// mode, `{"status": 0, "error": "..."}` in verbose mode. A rejection becomes
/// [`MixpanelError::Api`]; anything else is reported as `{"status": 1}`,
/// keeping the verbose body when there is one.
pub fn check_ingestion_status(http_status: StatusCode, body: Value) -> Result<Value> {
    let rejected = |message: String| MixpanelError::Api {
        status: http_status.as_u16(),
        message,
    };

    match &body {
        Value::Object(map) => {
            let status = map.get("status");
            let failed = matches!(status, Some(Value::Number(n)) if n.as_i64() == Some(0))
                || matches!(status, Some(Value::String(s)) if s.trim() == "0");
            if failed {
                let message = map
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("Mixpanel rejected the payload")
                    .to_string();
                return Err(rejected(message));
            }
            Ok(body)
        }
        Value::Number(n) if n.as_i64() == Some(0) => {
            Err(rejected("Mixpanel rejected the payload".to_string()))
        }
        Value::String(s) if s.trim() == "0" => {
            Err(rejected("Mixpanel rejected the payload".to_string()))
        }
        _ => Ok(json!({ "status": 1 })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_retry_after_parsing() {
        assert_eq!(parse_retry_after(Some("17")), 17);
        assert_eq!(parse_retry_after(Some(" 5 ")), 5);
        assert_eq!(parse_retry_after(Some("soon")), DEFAULT_RETRY_AFTER_SECS);
        assert_eq!(parse_retry_after(Some("-3")), DEFAULT_RETRY_AFTER_SECS);
        assert_eq!(
            parse_retry_after(Some("Wed, 21 Oct 2015 07:28:00 GMT")),
            DEFAULT_RETRY_AFTER_SECS
        );
        assert_eq!(parse_retry_after(None), DEFAULT_RETRY_AFTER_SECS);
    }

    #[test]
    fn test_classify_statuses() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("30"));
        match classify_failure(StatusCode::TOO_MANY_REQUESTS, &headers, "slow".into()) {
            MixpanelError::RateLimited {
                retry_after_secs, ..
            } => assert_eq!(retry_after_secs, 30),
            other => panic!("unexpected: {other:?}"),
        }

        let empty = HeaderMap::new();
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, &empty, String::new()),
            MixpanelError::Authentication { status: 401, .. }
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, &empty, String::new()),
            MixpanelError::Authentication { status: 403, .. }
        ));
        match classify_failure(StatusCode::BAD_REQUEST, &empty, "bad where".into()) {
            MixpanelError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad where");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_decode_body_by_content_type() {
        let mut json_headers = HeaderMap::new();
        json_headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json; charset=utf-8"),
        );
        assert_eq!(
            decode_body(&json_headers, r#"{"a":1}"#.into()).unwrap(),
            json!({"a": 1})
        );
        assert_eq!(decode_body(&json_headers, String::new()).unwrap(), Value::Null);

        let text_headers = HeaderMap::new();
        assert_eq!(
            decode_body(&text_headers, r#"{"a":1}"#.into()).unwrap(),
            Value::String(r#"{"a":1}"#.into())
        );
    }

    #[test]
    fn test_parse_ndjson() {
        let text = "{\"event\":\"A\"}\n\n{\"event\":\"B\"}\r\n";
        let events = parse_ndjson(StatusCode::OK, text).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["event"], "B");

        let err = parse_ndjson(StatusCode::OK, "{\"event\":\"A\"}\nnot json").unwrap_err();
        assert_eq!(err.kind(), "api_error");
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_ingestion_status() {
        assert_eq!(
            check_ingestion_status(StatusCode::OK, Value::String("1".into())).unwrap(),
            json!({"status": 1})
        );
        assert_eq!(
            check_ingestion_status(StatusCode::OK, json!({"status": 1, "error": null})).unwrap(),
            json!({"status": 1, "error": null})
        );
        let err = check_ingestion_status(
            StatusCode::OK,
            json!({"status": 0, "error": "token, missing or empty"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("token, missing or empty"));
        assert!(check_ingestion_status(StatusCode::OK, Value::String("0".into())).is_err());
        assert!(check_ingestion_status(StatusCode::OK, json!(0)).is_err());
    }
}
