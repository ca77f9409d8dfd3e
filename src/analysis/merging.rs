/// Merge semantics for the "Both" object-type fetch.
///
/// A "Both" request runs the fetch+normalize pipeline twice — once with the
/// NEO flag, once with the comet flag — and combines the two record sets:
/// NEO records first, then comet records, with exact-duplicate rows removed.
///
/// Duplicates are determined by full-row equality, not by designation alone.
/// Two rows for the same object that differ in any field (e.g. float
/// precision between the two upstream responses) are both retained. Order
/// among retained rows follows first occurrence in the concatenation.

use crate::model::CloseApproachRecord;

/// Concatenates the NEO and comet result sets and removes exact-duplicate
/// rows, keeping first occurrences in order.
pub fn merge_both(
    neo: Vec<CloseApproachRecord>,
    comet: Vec<CloseApproachRecord>,
) -> Vec<CloseApproachRecord> {
    // Records hold floats, so there is no Eq/Hash to key a set on; result
    // sets are bounded by the query limit (<= 2000 rows combined), so a
    // linear scan is fine.
    let mut merged: Vec<CloseApproachRecord> = Vec::with_capacity(neo.len() + comet.len());
    for record in neo.into_iter().chain(comet) {
        if !merged.contains(&record) {
            merged.push(record);
        }
    }
    merged
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
