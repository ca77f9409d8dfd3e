/// Core data types for the close-approach visualizer service.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic, no I/O, and no external dependencies beyond chrono —
/// only types.

use chrono::NaiveDateTime;

use crate::bodies::Body;

// ---------------------------------------------------------------------------
// Upstream field names
// ---------------------------------------------------------------------------

/// CAD API field name for the object designation.
pub const FIELD_DESIGNATION: &str = "des";

/// CAD API field name for the close-approach date/time (`YYYY-Mon-DD HH:MM`).
pub const FIELD_DATETIME: &str = "cd";

/// CAD API field name for the nominal approach distance.
pub const FIELD_DISTANCE: &str = "dist";

/// CAD API field name for the relative velocity, km/s.
pub const FIELD_V_REL: &str = "v_rel";

/// CAD API field name for the hyperbolic excess velocity, km/s.
pub const FIELD_V_INF: &str = "v_inf";

/// Textual format of the `cd` field.
pub const APPROACH_DATETIME_FORMAT: &str = "%Y-%b-%d %H:%M";

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

/// One close-approach event: a single row of the normalized table.
///
/// Corresponds to one entry in the `data[]` array of a CAD API response,
/// with columns resolved by name against the response's `fields` list.
/// Every coerced field is attempted independently — a bad date or number
/// in the upstream row leaves that field `None` without dropping the row.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseApproachRecord {
    pub designation: String,
    pub approach_datetime: Option<NaiveDateTime>,
    /// Approach distance in the unit the query requested (AU or LD).
    pub distance: Option<f64>,
    /// Velocity relative to the target body, km/s.
    pub relative_velocity: Option<f64>,
    /// Hyperbolic excess velocity, km/s.
    pub infinity_velocity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Query parameter types
// ---------------------------------------------------------------------------

/// Distance unit accepted by the CAD API's `dist-max` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Au,
    Ld,
}

impl DistanceUnit {
    /// Unit code appended to the distance magnitude, e.g. `"0.05AU"`.
    pub fn suffix(&self) -> &'static str {
        match self {
            DistanceUnit::Au => "AU",
            DistanceUnit::Ld => "LD",
        }
    }

    /// Default maximum-distance magnitude for this unit.
    pub fn default_dist_max(&self) -> &'static str {
        match self {
            DistanceUnit::Au => "0.05",
            DistanceUnit::Ld => "10",
        }
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Object-type filter selected by the user.
///
/// `Both` never reaches the query builder: it is resolved at the pipeline
/// level into two independent single-type requests whose results are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectTypeFilter {
    Neo,
    Comet,
    Both,
}

impl std::fmt::Display for ObjectTypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectTypeFilter::Neo => write!(f, "NEO"),
            ObjectTypeFilter::Comet => write!(f, "Comet"),
            ObjectTypeFilter::Both => write!(f, "Both"),
        }
    }
}

/// Immutable per-request query filters.
///
/// Dates may be absolute (`"2024-01-01"`) or the API's relative offsets
/// (`"now"`, `"+60"`); they pass through to the upstream unchanged.
/// `dist_max` is the bare magnitude — the unit suffix is appended by the
/// query builder. `limit` is expected to be within 1–1000; the edges that
/// accept user input clamp it before constructing this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameters {
    pub body: Body,
    pub date_min: String,
    pub date_max: String,
    pub dist_max: String,
    pub dist_unit: DistanceUnit,
    pub limit: u32,
    pub object_type: ObjectTypeFilter,
}

/// Upper bound the CAD API accepts for `limit`.
pub const LIMIT_MAX: u32 = 1000;

/// Clamps a requested result count into the API's accepted 1–1000 range.
pub fn clamp_limit(requested: u32) -> u32 {
    requested.clamp(1, LIMIT_MAX)
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching or decoding CAD API data.
///
/// All variants are terminal for the current fetch attempt; none is
/// retried. A failed fetch yields no data — never a partial table.
#[derive(Debug, Clone, PartialEq)]
pub enum CadError {
    /// Network-level failure (timeout, DNS, connection refused), with the
    /// underlying cause.
    Transport(String),
    /// Non-2xx HTTP response. `detail` carries the upstream's own error
    /// message when its error body could be decoded as JSON.
    Upstream { status: u16, detail: Option<String> },
    /// The response body could not be deserialized.
    Parse(String),
}

impl std::fmt::Display for CadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CadError::Transport(cause) => write!(f, "request failed: {}", cause),
            CadError::Upstream {
                status,
                detail: Some(detail),
            } => write!(f, "CAD API error (HTTP {}): {}", status, detail),
            CadError::Upstream {
                status,
                detail: None,
            } => write!(
                f,
                "CAD API error (HTTP {}): no additional error information provided",
                status
            ),
            CadError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CadError {}

// ---------------------------------------------------------------------------
// User-visible notices
// ---------------------------------------------------------------------------

/// Non-fatal conditions surfaced to the user alongside (or instead of) a
/// result table. Distinct from `CadError`: an empty result is information,
/// not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// A fetch leg failed; the message carries the `CadError` rendering.
    FetchFailed(String),
    /// The query succeeded but matched no close approaches.
    NoResults,
    /// A trend overlay was requested but the capability is unavailable.
    TrendUnavailable,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::FetchFailed(msg) => write!(f, "{}", msg),
            Notice::NoResults => {
                write!(f, "no close approaches found for the given parameters")
            }
            Notice::TrendUnavailable => {
                write!(f, "trend overlay is not available in this build; plotting without it")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
