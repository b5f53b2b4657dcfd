//! Request and response model types.
//!
//! These are the shapes exchanged between the map UI, the studymap service
//! and the external collaborator. All of them are plain immutable data:
//! a [`StudyRequest`] is built once per inbound call from the request path
//! and query, and the value types produced during one orchestration are
//! discarded with the response.

use serde::{Deserialize, Serialize};

/// One inbound study request.
///
/// `study` is the routing key: it selects which backing store (if any) and
/// which merge rule apply. `region` scopes the value within that store.
/// The `timeout` hint is carried verbatim as an opaque string and forwarded
/// to the external service, which is the only party that parses it (and
/// substitutes its default on malformed input).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyRequest {
    pub study: String,
    pub region: String,
    pub timeout: Option<String>,
}

impl StudyRequest {
    pub fn new(
        study: impl Into<String>,
        region: impl Into<String>,
        timeout: Option<String>,
    ) -> Self {
        Self {
            study: study.into(),
            region: region.into(),
            timeout,
        }
    }
}

/// Payload returned by the external collaborator for one study request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExternalStudy {
    pub value: f64,
}

/// One element of the external collaborator's `/status` push stream.
///
/// Each element supersedes the previous one for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalStatus {
    pub active_requests: u32,
}

/// Merged outbound result for one study request.
///
/// `color_schema` is a discriminator selecting the client-side rendering
/// rule, `color_value` the primary numeric value, and `pin_value` an
/// optional secondary value rendered as a map pin. `pin_value` serializes
/// as `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyResult {
    pub color_schema: String,
    pub color_value: f64,
    pub pin_value: Option<String>,
}

impl StudyResult {
    /// Temperature rendering: the external value alone, no pin.
    pub fn temperature(color_value: f64) -> Self {
        Self {
            color_schema: "temperature".to_string(),
            color_value,
            pin_value: None,
        }
    }

    /// Generic rendering: external value as color, persisted value (one
    /// decimal place) as the pin when present.
    pub fn generic(color_value: f64, pin_value: Option<f64>) -> Self {
        Self {
            color_schema: "red".to_string(),
            color_value,
            pin_value: pin_value.map(|v| format!("{v:.1}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_result_has_no_pin() {
        let result = StudyResult::temperature(21.5);
        assert_eq!(result.color_schema, "temperature");
        assert_eq!(result.color_value, 21.5);
        assert!(result.pin_value.is_none());
    }

    #[test]
    fn generic_result_formats_pin_to_one_decimal() {
        let result = StudyResult::generic(10.0, Some(123.456));
        assert_eq!(result.color_schema, "red");
        assert_eq!(result.pin_value.as_deref(), Some("123.5"));
    }

    #[test]
    fn generic_result_without_persisted_value_has_null_pin() {
        let result = StudyResult::generic(10.0, None);
        assert!(result.pin_value.is_none());
    }

    #[test]
    fn study_result_serializes_camel_case() {
        let json = serde_json::to_value(StudyResult::generic(1.0, None)).unwrap();
        assert_eq!(json["colorSchema"], "red");
        assert_eq!(json["colorValue"], 1.0);
        assert!(json["pinValue"].is_null());
    }

    #[test]
    fn external_status_wire_shape() {
        let status: ExternalStatus = serde_json::from_str(r#"{"activeRequests":7}"#).unwrap();
        assert_eq!(status.active_requests, 7);
    }
}
