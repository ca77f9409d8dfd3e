/// Plot specification for the presentation layer.
///
/// The core does not render anything. It emits a `PlotSpec` — points,
/// labels, axis orientation, and an optional fitted trend line — and the
/// presentation collaborator draws it. The distance axis is always
/// reversed so closer approaches appear higher.
///
/// The trend overlay is a build capability, not a runtime dependency: the
/// `trend` Cargo feature stands in for the original's optional regression
/// backend. `resolve_trend_request` performs the capability check before
/// the render call and downgrades an unsatisfiable request to "no trend",
/// handing the caller a notice to surface once.

use chrono::NaiveDateTime;

use crate::model::Notice;
use crate::pipeline::ApproachTable;

// ---------------------------------------------------------------------------
// Plot types
// ---------------------------------------------------------------------------

/// One plottable point. Rows lacking a date or a distance cannot be placed
/// on the axes and are skipped; they remain in the table and the CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub designation: String,
    pub datetime: NaiveDateTime,
    pub distance: f64,
    /// Hover detail, km/s.
    pub relative_velocity: Option<f64>,
    /// Hover detail, km/s.
    pub infinity_velocity: Option<f64>,
}

/// A fitted linear trend: `distance = intercept + slope_per_day * t`,
/// where `t` is days since the first plotted point.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub slope_per_day: f64,
    pub intercept: f64,
}

/// Everything the presentation layer needs to draw the scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Always true: closer approaches render higher.
    pub y_axis_reversed: bool,
    pub points: Vec<PlotPoint>,
    pub trend: Option<TrendLine>,
}

// ---------------------------------------------------------------------------
// Trend capability
// ---------------------------------------------------------------------------

/// Whether this build carries the trend-overlay capability.
pub fn trend_available() -> bool {
    cfg!(feature = "trend")
}

/// Resolves a requested trend overlay against the build capability, before
/// any rendering happens.
///
/// Returns the effective flag plus a notice when the request had to be
/// downgraded. Reporting the notice is the caller's job — this function
/// stays pure so the degradation is warned about exactly once, at the
/// single place the notice is surfaced.
pub fn resolve_trend_request(want_trend: bool) -> (bool, Option<Notice>) {
    if want_trend && !trend_available() {
        return (false, Some(Notice::TrendUnavailable));
    }
    (want_trend, None)
}

// ---------------------------------------------------------------------------
// Plot construction
// ---------------------------------------------------------------------------

/// Builds the scatter-plot specification for a fetched table.
///
/// Returns `None` for an empty table — there is nothing to draw, and the
/// caller has already surfaced the "no results" notice. `trend_enabled`
/// must come from `resolve_trend_request`.
pub fn build_plot(table: &ApproachTable, trend_enabled: bool) -> Option<PlotSpec> {
    if table.is_empty() {
        return None;
    }

    let points: Vec<PlotPoint> = table
        .records
        .iter()
        .filter_map(|r| {
            Some(PlotPoint {
                designation: r.designation.clone(),
                datetime: r.approach_datetime?,
                distance: r.distance?,
                relative_velocity: r.relative_velocity,
                infinity_velocity: r.infinity_velocity,
            })
        })
        .collect();

    let trend = if trend_enabled {
        fit_trend(&points)
    } else {
        None
    };

    Some(PlotSpec {
        title: format!("Close Approaches to {}", table.params.body.display_name()),
        x_label: "Date".to_string(),
        y_label: format!("Distance ({})", table.params.dist_unit),
        y_axis_reversed: true,
        points,
        trend,
    })
}

/// Ordinary least squares over (days since first point, distance).
/// Needs at least two points with distinct timestamps.
#[cfg(feature = "trend")]
fn fit_trend(points: &[PlotPoint]) -> Option<TrendLine> {
    if points.len() < 2 {
        return None;
    }

    let origin = points.iter().map(|p| p.datetime).min()?;
    let xs: Vec<f64> = points
        .iter()
        .map(|p| (p.datetime - origin).num_seconds() as f64 / 86_400.0)
        .collect();
    let ys: Vec<f64> = points.iter().map(|p| p.distance).collect();

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let ss_xx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    if ss_xx == 0.0 {
        return None; // all points at the same instant
    }
    let ss_xy: f64 = xs
        .iter()
        .zip(&ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    let slope = ss_xy / ss_xx;
    Some(TrendLine {
        slope_per_day: slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[cfg(not(feature = "trend"))]
fn fit_trend(_points: &[PlotPoint]) -> Option<TrendLine> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
