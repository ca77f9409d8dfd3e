/// Fetch orchestration: one user action → one or two upstream requests →
/// one immutable result table.
///
/// A single-type fetch issues one request. A "Both" fetch issues two
/// independent single-type requests (NEO, then comet) and merges their
/// results; a failed leg contributes an empty set plus an error notice
/// while the other leg's records survive.
///
/// The returned `ApproachTable` carries the records together with the
/// exact `QueryParameters` that produced them, so stale filter values can
/// never be mixed with a previously fetched table. Each fetch replaces any
/// prior table in full — on failure the table is empty, never partial.

use std::time::Duration;

use crate::analysis::merging::merge_both;
use crate::ingest::cad;
use crate::logging;
use crate::model::{
    CadError, CloseApproachRecord, Notice, ObjectTypeFilter, QueryParameters,
};
use crate::normalize::normalize;

// ---------------------------------------------------------------------------
// Result table
// ---------------------------------------------------------------------------

/// The normalized result of one completed fetch action, versioned with the
/// filters that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApproachTable {
    pub params: QueryParameters,
    pub records: Vec<CloseApproachRecord>,
}

impl ApproachTable {
    pub fn empty(params: QueryParameters) -> ApproachTable {
        ApproachTable {
            params,
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A completed fetch action: the replacement table plus the user-visible
/// notices accumulated while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub table: ApproachTable,
    pub notices: Vec<Notice>,
}

// ---------------------------------------------------------------------------
// Client construction
// ---------------------------------------------------------------------------

/// Builds the blocking HTTP client used for all CAD requests.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, CadError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| CadError::Transport(e.to_string()))
}

// ---------------------------------------------------------------------------
// Fetch action
// ---------------------------------------------------------------------------

/// Runs the fetch+normalize pipeline for the given filters.
///
/// Never fails outright: transport and upstream errors become
/// `Notice::FetchFailed` entries and yield an empty table, matching the
/// rule that a failed fetch clears the displayed table rather than leaving
/// a stale or partial one.
pub fn fetch_table(
    client: &reqwest::blocking::Client,
    api_url: &str,
    params: &QueryParameters,
) -> FetchOutcome {
    let mut notices = Vec::new();

    let records = match params.object_type {
        ObjectTypeFilter::Neo | ObjectTypeFilter::Comet => {
            fetch_leg(client, api_url, params, &mut notices)
        }
        ObjectTypeFilter::Both => {
            let neo = fetch_leg(
                client,
                api_url,
                &retyped(params, ObjectTypeFilter::Neo),
                &mut notices,
            );
            let comet = fetch_leg(
                client,
                api_url,
                &retyped(params, ObjectTypeFilter::Comet),
                &mut notices,
            );
            merge_both(neo, comet)
        }
    };

    // An empty table always carries the no-results notice, even when the
    // emptiness is the consequence of a failed fetch: the user sees both
    // the error and the fact that nothing is displayed.
    if records.is_empty() {
        notices.push(Notice::NoResults);
    }

    FetchOutcome {
        table: ApproachTable {
            params: params.clone(),
            records,
        },
        notices,
    }
}

/// One upstream request plus normalization. An error yields an empty set
/// and a notice; it never aborts the surrounding fetch action.
fn fetch_leg(
    client: &reqwest::blocking::Client,
    api_url: &str,
    params: &QueryParameters,
    notices: &mut Vec<Notice>,
) -> Vec<CloseApproachRecord> {
    match cad::fetch_close_approaches(client, api_url, params) {
        Ok(response) => {
            let records = normalize(&response);
            logging::info(
                logging::DataSource::Cad,
                Some(params.body.short_code()),
                &format!(
                    "{} query returned {} record(s)",
                    params.object_type,
                    records.len()
                ),
            );
            records
        }
        Err(err) => {
            logging::log_cad_failure(params.body.short_code(), "fetch", &err);
            notices.push(Notice::FetchFailed(err.to_string()));
            Vec::new()
        }
    }
}

fn retyped(params: &QueryParameters, object_type: ObjectTypeFilter) -> QueryParameters {
    QueryParameters {
        object_type,
        ..params.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

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

    #[test]
    fn test_empty_table_constructor_versions_the_filters() {
        let p = params(ObjectTypeFilter::Neo);
        let table = ApproachTable::empty(p.clone());
        assert!(table.is_empty());
        assert_eq!(table.params, p, "table must carry the filters that produced it");
    }

    #[test]
    fn test_retyped_changes_only_the_object_type() {
        let both = params(ObjectTypeFilter::Both);
        let neo = retyped(&both, ObjectTypeFilter::Neo);
        assert_eq!(neo.object_type, ObjectTypeFilter::Neo);
        assert_eq!(neo.body, both.body);
        assert_eq!(neo.date_min, both.date_min);
        assert_eq!(neo.dist_max, both.dist_max);
        assert_eq!(neo.limit, both.limit);
    }

    #[test]
    fn test_unreachable_endpoint_yields_empty_table_and_fetch_notice() {
        // Connecting to a closed local port fails at the transport level
        // without touching the network.
        let client = build_client(2).expect("client should build");
        let outcome = fetch_table(&client, "http://127.0.0.1:9/cad.api", &params(ObjectTypeFilter::Neo));

        assert!(outcome.table.is_empty(), "a failed fetch must yield no data");
        assert!(
            outcome
                .notices
                .iter()
                .any(|n| matches!(n, Notice::FetchFailed(_))),
            "transport failure must surface a fetch-error notice, got {:?}",
            outcome.notices
        );
        assert!(
            outcome.notices.contains(&Notice::NoResults),
            "a failed fetch leaves an empty table, and an empty table always \
             carries the no-results notice alongside the error, got {:?}",
            outcome.notices
        );
    }

    #[test]
    fn test_both_runs_two_legs_and_reports_each_failure() {
        let client = build_client(2).expect("client should build");
        let outcome = fetch_table(&client, "http://127.0.0.1:9/cad.api", &params(ObjectTypeFilter::Both));

        let failures = outcome
            .notices
            .iter()
            .filter(|n| matches!(n, Notice::FetchFailed(_)))
            .count();
        assert_eq!(failures, 2, "each leg of a Both fetch fails independently");
        assert!(outcome.table.is_empty());
        assert!(
            outcome.notices.contains(&Notice::NoResults),
            "two failed legs still end in an empty table, which carries the \
             no-results notice"
        );
    }
}
