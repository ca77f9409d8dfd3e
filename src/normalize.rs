/// Response normalization: raw CAD payload → typed close-approach records.
///
/// The CAD API returns rows as positional arrays plus a `fields` list naming
/// each column. Columns are resolved by name against that list rather than
/// by fixed position, so a reordered or extended upstream payload still
/// normalizes correctly; an expected field absent from the list reads as
/// `None` for every row.
///
/// Coercion is permissive and per-field: a row with an unparseable date or
/// a non-numeric distance keeps its other fields. One bad cell never drops
/// a row, and one bad row never drops the batch.

use chrono::NaiveDateTime;

use crate::ingest::cad::CadResponse;
use crate::model::{
    APPROACH_DATETIME_FORMAT, CloseApproachRecord, FIELD_DATETIME, FIELD_DESIGNATION,
    FIELD_DISTANCE, FIELD_V_INF, FIELD_V_REL,
};

// ---------------------------------------------------------------------------
// Field index
// ---------------------------------------------------------------------------

/// Column positions of the expected fields within the server's declared
/// field order. Any of them may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIndex {
    designation: Option<usize>,
    datetime: Option<usize>,
    distance: Option<usize>,
    v_rel: Option<usize>,
    v_inf: Option<usize>,
}

impl FieldIndex {
    /// Resolves each expected field by name in the declared field list.
    pub fn from_fields(fields: &[String]) -> FieldIndex {
        let position = |name: &str| fields.iter().position(|f| f == name);
        FieldIndex {
            designation: position(FIELD_DESIGNATION),
            datetime: position(FIELD_DATETIME),
            distance: position(FIELD_DISTANCE),
            v_rel: position(FIELD_V_REL),
            v_inf: position(FIELD_V_INF),
        }
    }

    fn cell<'a>(
        &self,
        row: &'a [serde_json::Value],
        index: Option<usize>,
    ) -> Option<&'a serde_json::Value> {
        index.and_then(|i| row.get(i))
    }
}

// ---------------------------------------------------------------------------
// Cell coercion helpers
// ---------------------------------------------------------------------------

/// Reads a cell as text. CAD rows carry almost everything as JSON strings,
/// but numbers are tolerated too.
fn cell_text(cell: Option<&serde_json::Value>) -> Option<String> {
    match cell? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Permissive numeric coercion: non-numeric or missing values become `None`.
fn coerce_number(cell: Option<&serde_json::Value>) -> Option<f64> {
    match cell? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parses the `cd` column with the exact `YYYY-Mon-DD HH:MM` format.
/// A parse failure is a record-level defect, not a batch failure.
fn coerce_datetime(cell: Option<&serde_json::Value>) -> Option<NaiveDateTime> {
    let text = cell_text(cell)?;
    NaiveDateTime::parse_from_str(text.trim(), APPROACH_DATETIME_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Converts a raw CAD payload into zero or more normalized records.
///
/// A payload with a zero (or absent) count yields an empty set — the caller
/// is responsible for surfacing the "no results" notice, which is distinct
/// from a fetch error. Otherwise one record is built per row; every coerced
/// field is attempted independently.
pub fn normalize(response: &CadResponse) -> Vec<CloseApproachRecord> {
    if response.count() == 0 {
        return Vec::new();
    }

    let index = FieldIndex::from_fields(&response.fields);

    response
        .data
        .iter()
        .map(|row| CloseApproachRecord {
            designation: cell_text(index.cell(row, index.designation)).unwrap_or_default(),
            approach_datetime: coerce_datetime(index.cell(row, index.datetime)),
            distance: coerce_number(index.cell(row, index.distance)),
            relative_velocity: coerce_number(index.cell(row, index.v_rel)),
            infinity_velocity: coerce_number(index.cell(row, index.v_inf)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn payload(json: &str) -> CadResponse {
        serde_json::from_str(json).expect("test payload should deserialize")
    }

    const WELL_FORMED: &str = r#"{
        "count": "2",
        "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", "v_inf", "t_sigma_f", "h"],
        "data": [
            ["2024 AB", "12", "2460310.5", "2024-Jan-01 12:30", "0.0234", "0.0230", "0.0238", "15.3", "15.1", "< 00:01", "24.5"],
            ["433 Eros", "659", "2460340.5", "2024-Jan-31 04:05", "0.1500", "0.1499", "0.1501", "5.2", "5.0", "< 00:01", "10.4"]
        ]
    }"#;

    #[test]
    fn test_well_formed_payload_yields_one_record_per_row() {
        let records = normalize(&payload(WELL_FORMED));
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.designation, "2024 AB");
        assert_eq!(first.distance, Some(0.0234));
        assert_eq!(first.relative_velocity, Some(15.3));
        assert_eq!(first.infinity_velocity, Some(15.1));

        let dt = first.approach_datetime.expect("date should parse");
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 1));
        assert_eq!((dt.hour(), dt.minute()), (12, 30));
    }

    #[test]
    fn test_zero_count_yields_empty_set() {
        let records = normalize(&payload(r#"{"count": "0", "fields": [], "data": []}"#));
        assert!(records.is_empty());
    }

    #[test]
    fn test_absent_count_yields_empty_set() {
        let records = normalize(&payload(r#"{"fields": ["des"], "data": [["x"]]}"#));
        assert!(
            records.is_empty(),
            "payload without a count must normalize to an empty set"
        );
    }

    #[test]
    fn test_non_numeric_distance_coerces_to_none_keeping_other_fields() {
        let records = normalize(&payload(
            r#"{
                "count": 1,
                "fields": ["des", "cd", "dist", "v_rel", "v_inf"],
                "data": [["2024 AB", "2024-Jan-01 12:30", "n/a", "15.3", "15.1"]]
            }"#,
        ));
        assert_eq!(records.len(), 1, "a bad cell must not drop the row");
        let record = &records[0];
        assert_eq!(record.distance, None);
        assert_eq!(record.designation, "2024 AB");
        assert_eq!(record.relative_velocity, Some(15.3));
        assert!(record.approach_datetime.is_some());
    }

    #[test]
    fn test_unparseable_date_is_a_record_level_defect_only() {
        let records = normalize(&payload(
            r#"{
                "count": 1,
                "fields": ["des", "cd", "dist", "v_rel", "v_inf"],
                "data": [["2024 AB", "January 1st", "0.02", "15.3", "15.1"]]
            }"#,
        ));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].approach_datetime, None);
        assert_eq!(records[0].distance, Some(0.02));
    }

    #[test]
    fn test_columns_are_resolved_by_name_not_position() {
        // Same cells, shuffled field order: normalization must not assume
        // fixed positions.
        let records = normalize(&payload(
            r#"{
                "count": 1,
                "fields": ["dist", "des", "v_inf", "cd", "v_rel"],
                "data": [["0.0234", "2024 AB", "15.1", "2024-Jan-01 12:30", "15.3"]]
            }"#,
        ));
        let record = &records[0];
        assert_eq!(record.designation, "2024 AB");
        assert_eq!(record.distance, Some(0.0234));
        assert_eq!(record.relative_velocity, Some(15.3));
        assert_eq!(record.infinity_velocity, Some(15.1));
    }

    #[test]
    fn test_expected_field_absent_from_list_defaults_to_none() {
        let records = normalize(&payload(
            r#"{
                "count": 1,
                "fields": ["des", "cd"],
                "data": [["2024 AB", "2024-Jan-01 12:30"]]
            }"#,
        ));
        let record = &records[0];
        assert_eq!(record.distance, None);
        assert_eq!(record.relative_velocity, None);
        assert_eq!(record.infinity_velocity, None);
        assert_eq!(record.designation, "2024 AB");
    }

    #[test]
    fn test_short_row_tolerated() {
        // A row narrower than the field list reads missing cells as None.
        let records = normalize(&payload(
            r#"{
                "count": 1,
                "fields": ["des", "cd", "dist", "v_rel", "v_inf"],
                "data": [["2024 AB", "2024-Jan-01 12:30"]]
            }"#,
        ));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].distance, None);
    }

    #[test]
    fn test_numeric_json_cells_are_tolerated() {
        // The CAD API documents its cells as strings; be permissive if it
        // ever sends raw numbers.
        let records = normalize(&payload(
            r#"{
                "count": 1,
                "fields": ["des", "cd", "dist", "v_rel", "v_inf"],
                "data": [["2024 AB", "2024-Jan-01 12:30", 0.0234, 15.3, 15.1]]
            }"#,
        ));
        assert_eq!(records[0].distance, Some(0.0234));
        assert_eq!(records[0].relative_velocity, Some(15.3));
    }
}
