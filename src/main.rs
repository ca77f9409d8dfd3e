/// Command-line presentation layer for the close-approach visualizer.
///
/// This binary is the "UI" collaborator around the core pipeline: it turns
/// arguments into `QueryParameters`, runs one fetch action, prints the
/// normalized table, optionally writes the CSV export, and reports the
/// scatter-plot specification for downstream rendering.

use chrono::{Duration, NaiveDate, Utc};

use cadviz_service::bodies::{Body, all_display_names};
use cadviz_service::config::ServiceConfig;
use cadviz_service::export;
use cadviz_service::logging::{self, DataSource, LogLevel};
use cadviz_service::model::{
    CloseApproachRecord, DistanceUnit, ObjectTypeFilter, QueryParameters, clamp_limit,
    APPROACH_DATETIME_FORMAT,
};
use cadviz_service::pipeline::{build_client, fetch_table};
use cadviz_service::viz::{build_plot, resolve_trend_request};

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    body: Body,
    date_min: String,
    /// Mutually exclusive with `days_from_start`; whichever was given last
    /// wins, matching a selector widget.
    date_max: Option<String>,
    days_from_start: Option<i64>,
    dist_max: Option<String>,
    dist_unit: DistanceUnit,
    limit: Option<u32>,
    object_type: ObjectTypeFilter,
    csv_path: Option<String>,
    trend: bool,
    verbose: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        CliArgs {
            body: Body::Earth,
            date_min: "now".to_string(),
            date_max: None,
            days_from_start: None,
            dist_max: None,
            dist_unit: DistanceUnit::Au,
            limit: None,
            object_type: ObjectTypeFilter::Neo,
            csv_path: None,
            trend: false,
            verbose: false,
        }
    }
}

fn usage() -> String {
    format!(
        "Usage: cadviz_service [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --body NAME        Target body ({}; default Earth)\n\
         \x20 --date-min DATE    Start date, YYYY-MM-DD or 'now' (default now)\n\
         \x20 --date-max DATE    End date, YYYY-MM-DD or '+N' days (default +60)\n\
         \x20 --days N           End date as N days from the start date (1-36525)\n\
         \x20 --dist-max MAG     Maximum distance magnitude (default 0.05 AU / 10 LD)\n\
         \x20 --unit AU|LD       Distance unit (default AU)\n\
         \x20 --limit N          Result limit, 1-1000 (default from config, 100)\n\
         \x20 --type KIND        Object type: NEO, Comet, or Both (default NEO)\n\
         \x20 --csv [PATH]       Write the table as CSV (default {})\n\
         \x20 --trend            Overlay a linear trend on the plot\n\
         \x20 --verbose          Debug logging",
        all_display_names().join(", "),
        export::DEFAULT_CSV_FILE
    )
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut iter = args.iter().peekable();

    let value = |flag: &str, v: Option<&String>| -> Result<String, String> {
        v.map(|s| s.to_string())
            .ok_or_else(|| format!("{} requires a value", flag))
    };

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--body" => {
                let name = value("--body", iter.next())?;
                parsed.body = Body::from_name(&name)
                    .ok_or_else(|| format!("unknown body '{}'", name))?;
            }
            "--date-min" => parsed.date_min = value("--date-min", iter.next())?,
            "--date-max" => {
                parsed.date_max = Some(value("--date-max", iter.next())?);
                parsed.days_from_start = None;
            }
            "--days" => {
                let raw = value("--days", iter.next())?;
                let days: i64 = raw
                    .parse()
                    .map_err(|_| format!("--days must be an integer, got '{}'", raw))?;
                if !(1..=36525).contains(&days) {
                    return Err(format!("--days must be within 1-36525, got {}", days));
                }
                parsed.days_from_start = Some(days);
                parsed.date_max = None;
            }
            "--dist-max" => parsed.dist_max = Some(value("--dist-max", iter.next())?),
            "--unit" => {
                let unit = value("--unit", iter.next())?;
                parsed.dist_unit = match unit.to_ascii_uppercase().as_str() {
                    "AU" => DistanceUnit::Au,
                    "LD" => DistanceUnit::Ld,
                    _ => return Err(format!("unknown unit '{}' (expected AU or LD)", unit)),
                };
            }
            "--limit" => {
                let raw = value("--limit", iter.next())?;
                let limit: u32 = raw
                    .parse()
                    .map_err(|_| format!("--limit must be an integer, got '{}'", raw))?;
                parsed.limit = Some(limit);
            }
            "--type" => {
                let kind = value("--type", iter.next())?;
                parsed.object_type = match kind.to_ascii_lowercase().as_str() {
                    "neo" => ObjectTypeFilter::Neo,
                    "comet" => ObjectTypeFilter::Comet,
                    "both" => ObjectTypeFilter::Both,
                    _ => {
                        return Err(format!(
                            "unknown object type '{}' (expected NEO, Comet, or Both)",
                            kind
                        ));
                    }
                };
            }
            "--csv" => {
                // Path is optional; a following flag means "use the default".
                let has_path = iter.peek().is_some_and(|next| !next.starts_with("--"));
                let path = if has_path { iter.next().cloned() } else { None };
                parsed.csv_path =
                    Some(path.unwrap_or_else(|| export::DEFAULT_CSV_FILE.to_string()));
            }
            "--trend" => parsed.trend = true,
            "--verbose" => parsed.verbose = true,
            "--help" | "-h" => return Err(usage()),
            other => return Err(format!("unknown argument '{}'\n\n{}", other, usage())),
        }
    }

    Ok(parsed)
}

/// Resolves a "--days N" end date into an absolute date string, anchored at
/// the start date ("now" anchors at today).
fn resolve_date_max(args: &CliArgs, today: NaiveDate) -> Result<String, String> {
    if let Some(explicit) = &args.date_max {
        return Ok(explicit.clone());
    }
    match args.days_from_start {
        Some(days) => {
            let start = if args.date_min == "now" {
                today
            } else {
                NaiveDate::parse_from_str(&args.date_min, "%Y-%m-%d").map_err(|_| {
                    format!(
                        "--days needs an absolute start date (YYYY-MM-DD), got '{}'",
                        args.date_min
                    )
                })?
            };
            Ok((start + Duration::days(days)).format("%Y-%m-%d").to_string())
        }
        None => Ok("+60".to_string()),
    }
}

// ---------------------------------------------------------------------------
// Table rendering
// ---------------------------------------------------------------------------

fn print_table(records: &[CloseApproachRecord], unit: DistanceUnit) {
    println!(
        "   {:<22} {:<18} {:>14} {:>12} {:>12}",
        "Designation",
        "Date",
        format!("Dist ({})", unit),
        "V-rel km/s",
        "V-inf km/s"
    );
    for record in records {
        let date = record
            .approach_datetime
            .map(|dt| dt.format(APPROACH_DATETIME_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:<22} {:<18} {:>14} {:>12} {:>12}",
            record.designation,
            date,
            fmt_cell(record.distance),
            fmt_cell(record.relative_velocity),
            fmt_cell(record.infinity_velocity),
        );
    }
}

fn fmt_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let config = match ServiceConfig::load() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("configuration error: {}", message);
            std::process::exit(2);
        }
    };

    let min_level = if args.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    logging::init_logger(min_level, config.log_file.as_deref(), false);

    let date_max = match resolve_date_max(&args, Utc::now().date_naive()) {
        Ok(date_max) => date_max,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(2);
        }
    };

    let params = QueryParameters {
        body: args.body,
        date_min: args.date_min.clone(),
        date_max,
        dist_max: args
            .dist_max
            .clone()
            .unwrap_or_else(|| args.dist_unit.default_dist_max().to_string()),
        dist_unit: args.dist_unit,
        limit: clamp_limit(args.limit.unwrap_or(config.default_limit)),
        object_type: args.object_type,
    };

    let client = match build_client(config.timeout_secs) {
        Ok(client) => client,
        Err(err) => {
            logging::error(DataSource::System, None, &err.to_string());
            std::process::exit(1);
        }
    };

    println!(
        "Fetching {} close approaches to {} ({} to {}, within {}{})...",
        params.object_type,
        params.body,
        params.date_min,
        params.date_max,
        params.dist_max,
        params.dist_unit
    );

    let outcome = fetch_table(&client, &config.api_url, &params);
    for notice in &outcome.notices {
        logging::report_notice(notice);
    }

    if outcome.table.is_empty() {
        // Errors and the no-results notice were already surfaced above.
        return;
    }

    println!(
        "   ✓ Found {} close approaches to {}",
        outcome.table.len(),
        params.body
    );
    println!();
    print_table(&outcome.table.records, params.dist_unit);

    if let Some(path) = &args.csv_path {
        let csv = export::to_csv(&outcome.table.records);
        match std::fs::write(path, csv) {
            Ok(()) => println!("\n   ✓ Wrote CSV export to {}", path),
            Err(e) => logging::error(
                DataSource::System,
                None,
                &format!("failed to write CSV to {}: {}", path, e),
            ),
        }
    }

    let (trend_enabled, trend_notice) = resolve_trend_request(args.trend);
    if let Some(notice) = &trend_notice {
        logging::report_notice(notice);
    }

    if let Some(spec) = build_plot(&outcome.table, trend_enabled) {
        println!();
        println!("   Plot: {}", spec.title);
        println!(
            "         {} point(s), x = {}, y = {} (reversed axis)",
            spec.points.len(),
            spec.x_label,
            spec.y_label
        );
        match &spec.trend {
            Some(trend) => println!(
                "         trend: {:+.6} {} per day (intercept {:.6})",
                trend.slope_per_day, params.dist_unit, trend.intercept
            ),
            None if trend_enabled => {
                println!("         trend: not enough datable points to fit a line")
            }
            None => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
