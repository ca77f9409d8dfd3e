/// JPL SSD/CNEOS CAD (Close-Approach Data) API client.
///
/// Builds query parameter mappings from user-selected filters and issues
/// blocking GET requests against the CAD endpoint.
///
/// API documentation: https://ssd-api.jpl.nasa.gov/doc/cad.html

use serde::Deserialize;

use crate::model::{CadError, ObjectTypeFilter, QueryParameters};

/// Default CAD API endpoint. Overridable through `ServiceConfig` so the
/// live tests and the pipeline can point at a stand-in server.
pub const CAD_API_URL: &str = "https://ssd-api.jpl.nasa.gov/cad.api";

// ============================================================================
// CAD API Response Structures
// ============================================================================

/// Raw CAD API payload: a count, a column-name list, and row arrays.
///
/// `count` is documented as an integer but the live service returns it as a
/// JSON string (e.g. `"5"`); both are accepted via [`CadResponse::count`].
/// `fields` and `data` default to empty so a zero-result payload that omits
/// them still deserializes.
#[derive(Debug, Clone, Deserialize)]
pub struct CadResponse {
    #[serde(default)]
    count: Option<serde_json::Value>,
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<serde_json::Value>>,
}

impl CadResponse {
    /// The number of rows the upstream claims to have returned.
    /// Absent or unparseable counts read as zero.
    pub fn count(&self) -> u64 {
        match &self.count {
            Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }
}

// ============================================================================
// Query Builder
// ============================================================================

/// Builds the CAD API query parameter mapping for a single request.
///
/// Pure data transformation — no validation, no I/O, no errors:
/// - `body` maps to the upstream short code (see `bodies::Body`).
/// - `date-min` / `date-max` pass through unchanged (absolute dates or
///   relative offsets like `"now"` / `"+60"`).
/// - `dist-max` is the magnitude concatenated with the unit suffix, no
///   separator: `"0.05"` + AU → `"0.05AU"`.
/// - NEO and Comet filters add `neo=true` / `comet=true`; `Both` adds no
///   flag here because the pipeline resolves it into two single-type
///   requests before this function is ever called for one of them.
pub fn build_query(params: &QueryParameters) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("body", params.body.short_code().to_string()),
        ("date-min", params.date_min.clone()),
        ("date-max", params.date_max.clone()),
        (
            "dist-max",
            format!("{}{}", params.dist_max, params.dist_unit.suffix()),
        ),
        ("limit", params.limit.to_string()),
    ];

    match params.object_type {
        ObjectTypeFilter::Neo => query.push(("neo", "true".to_string())),
        ObjectTypeFilter::Comet => query.push(("comet", "true".to_string())),
        ObjectTypeFilter::Both => {}
    }

    query
}

// ============================================================================
// Fetch Operation
// ============================================================================

/// Issues a blocking GET against the CAD endpoint with the built parameters.
///
/// Failure semantics:
/// - Network-level failure → `CadError::Transport` with the underlying cause.
/// - Non-2xx status → `CadError::Upstream`, carrying the upstream's own
///   error message when its body decodes as JSON, `None` otherwise.
/// - Undecodable success body → `CadError::Parse`.
///
/// Any error means "no data": the caller never sees a partial payload.
pub fn fetch_close_approaches(
    client: &reqwest::blocking::Client,
    api_url: &str,
    params: &QueryParameters,
) -> Result<CadResponse, CadError> {
    let query = build_query(params);

    let response = client
        .get(api_url)
        .query(&query)
        .header("Accept", "application/json")
        .send()
        .map_err(|e| CadError::Transport(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(CadError::Upstream {
            status: status.as_u16(),
            detail: decode_error_detail(&body),
        });
    }

    let body = response
        .text()
        .map_err(|e| CadError::Transport(e.to_string()))?;
    parse_payload(&body)
}

/// Decodes a successful response body into the raw payload.
pub fn parse_payload(body: &str) -> Result<CadResponse, CadError> {
    serde_json::from_str(body).map_err(|e| CadError::Parse(e.to_string()))
}

/// Extracts the upstream's error message from a non-2xx response body.
///
/// The CAD API reports errors as JSON, usually `{"message": "..."}`. A
/// decodable JSON body without a `message` field is rendered compactly so
/// the user still sees what the upstream said; a non-JSON body yields
/// `None` (the caller falls back to a generic notice).
pub fn decode_error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return Some(message.to_string());
    }
    Some(value.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::Body;
    use crate::model::DistanceUnit;

    fn params(object_type: ObjectTypeFilter) -> QueryParameters {
        QueryParameters {
            body: Body::Earth,
            date_min: "2024-01-01".to_string(),
            date_max: "2024-03-01".to_string(),
            dist_max: "0.05".to_string(),
            dist_unit: DistanceUnit::Au,
            limit: 50,
            object_type,
        }
    }

    fn lookup<'a>(query: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        query.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_end_to_end_neo_query_mapping() {
        let query = build_query(&params(ObjectTypeFilter::Neo));
        assert_eq!(lookup(&query, "body"), Some("Earth"));
        assert_eq!(lookup(&query, "date-min"), Some("2024-01-01"));
        assert_eq!(lookup(&query, "date-max"), Some("2024-03-01"));
        assert_eq!(lookup(&query, "dist-max"), Some("0.05AU"));
        assert_eq!(lookup(&query, "limit"), Some("50"));
        assert_eq!(lookup(&query, "neo"), Some("true"));
        assert_eq!(lookup(&query, "comet"), None);
    }

    #[test]
    fn test_comet_query_sets_comet_flag_only() {
        let query = build_query(&params(ObjectTypeFilter::Comet));
        assert_eq!(lookup(&query, "comet"), Some("true"));
        assert_eq!(lookup(&query, "neo"), None);
    }

    #[test]
    fn test_both_adds_no_object_type_flag() {
        let query = build_query(&params(ObjectTypeFilter::Both));
        assert_eq!(lookup(&query, "neo"), None);
        assert_eq!(lookup(&query, "comet"), None);
    }

    #[test]
    fn test_dist_max_concatenates_magnitude_and_unit_with_no_separator() {
        let mut p = params(ObjectTypeFilter::Neo);
        p.dist_max = "10".to_string();
        p.dist_unit = DistanceUnit::Ld;
        let query = build_query(&p);
        assert_eq!(lookup(&query, "dist-max"), Some("10LD"));
    }

    #[test]
    fn test_relative_date_offsets_pass_through_unchanged() {
        let mut p = params(ObjectTypeFilter::Neo);
        p.date_min = "now".to_string();
        p.date_max = "+60".to_string();
        let query = build_query(&p);
        assert_eq!(lookup(&query, "date-min"), Some("now"));
        assert_eq!(lookup(&query, "date-max"), Some("+60"));
    }

    #[test]
    fn test_every_registered_body_emits_its_short_code() {
        for body in crate::bodies::BODY_REGISTRY {
            let mut p = params(ObjectTypeFilter::Neo);
            p.body = *body;
            let query = build_query(&p);
            assert_eq!(
                lookup(&query, "body"),
                Some(body.short_code()),
                "body parameter for {} should be its short code",
                body.display_name()
            );
        }
    }

    #[test]
    fn test_count_accepts_string_and_integer() {
        let as_string: CadResponse =
            serde_json::from_str(r#"{"count": "5", "fields": [], "data": []}"#).unwrap();
        assert_eq!(as_string.count(), 5);

        let as_int: CadResponse =
            serde_json::from_str(r#"{"count": 5, "fields": [], "data": []}"#).unwrap();
        assert_eq!(as_int.count(), 5);
    }

    #[test]
    fn test_absent_count_reads_as_zero() {
        let resp: CadResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(resp.count(), 0);
        assert!(resp.fields.is_empty());
        assert!(resp.data.is_empty());
    }

    #[test]
    fn test_parse_payload_decodes_a_success_body() {
        let resp = parse_payload(
            r#"{"count": "1", "fields": ["des"], "data": [["2024 AB"]]}"#,
        )
        .expect("valid payload should decode");
        assert_eq!(resp.count(), 1);
        assert_eq!(resp.fields, vec!["des".to_string()]);
    }

    #[test]
    fn test_parse_payload_rejects_non_json_body() {
        match parse_payload("<html>not json</html>") {
            Err(CadError::Parse(_)) => {}
            other => panic!("undecodable success body must be a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_detail_prefers_message_field() {
        assert_eq!(
            decode_error_detail(r#"{"message": "bad request"}"#),
            Some("bad request".to_string())
        );
    }

    #[test]
    fn test_error_detail_falls_back_to_compact_json() {
        let detail =
            decode_error_detail(r#"{"moreInfo": "https://ssd-api.jpl.nasa.gov/doc/cad.html"}"#)
                .expect("valid JSON without message should still yield detail");
        assert!(detail.contains("moreInfo"));
    }

    #[test]
    fn test_error_detail_is_none_for_non_json_body() {
        assert_eq!(decode_error_detail("<html>502 Bad Gateway</html>"), None);
        assert_eq!(decode_error_detail(""), None);
    }
}
