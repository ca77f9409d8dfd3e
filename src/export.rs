/// CSV export of the normalized close-approach table.
///
/// The export carries the five displayed columns with a header row and no
/// index column, encoded as UTF-8. Dates are written back in the upstream's
/// own `YYYY-Mon-DD HH:MM` format so a re-parse goes through the same
/// chrono format string as normalization; floats use Rust's shortest
/// round-tripping representation. Absent fields serialize as empty cells.
///
/// Upstream designations never contain commas or quotes (they are compact
/// identifiers like `433 Eros` or `2024 AB`), so cells are written raw and
/// split on commas when parsing — the parser exists for the round-trip
/// property and for re-importing our own exports, not for arbitrary CSV.

use chrono::NaiveDateTime;

use crate::model::{APPROACH_DATETIME_FORMAT, CadError, CloseApproachRecord};

/// Header row of the export, in display order.
pub const CSV_HEADER: &str = "designation,date,distance,relative_velocity,infinity_velocity";

/// Default file name offered for a CSV download.
pub const DEFAULT_CSV_FILE: &str = "close_approaches_data.csv";

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Serializes the full record set as CSV.
pub fn to_csv(records: &[CloseApproachRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for record in records {
        out.push_str(&record.designation);
        out.push(',');
        if let Some(dt) = record.approach_datetime {
            out.push_str(&dt.format(APPROACH_DATETIME_FORMAT).to_string());
        }
        out.push(',');
        push_number(&mut out, record.distance);
        out.push(',');
        push_number(&mut out, record.relative_velocity);
        out.push(',');
        push_number(&mut out, record.infinity_velocity);
        out.push('\n');
    }

    out
}

fn push_number(out: &mut String, value: Option<f64>) {
    if let Some(v) = value {
        out.push_str(&v.to_string());
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parses a CSV produced by [`to_csv`] back into records.
///
/// Field coercion mirrors normalization: empty or non-numeric cells become
/// `None` rather than failing the batch. Only a missing or wrong header is
/// an error, since that means the input is not one of our exports.
pub fn from_csv(csv: &str) -> Result<Vec<CloseApproachRecord>, CadError> {
    let mut lines = csv.lines();

    match lines.next() {
        Some(header) if header.trim_end() == CSV_HEADER => {}
        other => {
            return Err(CadError::Parse(format!(
                "unexpected CSV header: {:?}",
                other.unwrap_or("")
            )));
        }
    }

    let parse_number = |s: &str| -> Option<f64> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            trimmed.parse().ok()
        }
    };

    let mut records = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 5 {
            return Err(CadError::Parse(format!(
                "expected 5 columns, got {}: '{}'",
                fields.len(),
                line
            )));
        }

        records.push(CloseApproachRecord {
            designation: fields[0].to_string(),
            approach_datetime: NaiveDateTime::parse_from_str(
                fields[1].trim(),
                APPROACH_DATETIME_FORMAT,
            )
            .ok(),
            distance: parse_number(fields[2]),
            relative_velocity: parse_number(fields[3]),
            infinity_velocity: parse_number(fields[4]),
        });
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
