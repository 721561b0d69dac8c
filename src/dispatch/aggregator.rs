//! Tri-state OR over beacon answers.

use crate::core::result::BeaconResult;
use crate::core::types::{BeaconId, TriBool};

/// Reduce answers: any `True` wins, all `False` gives `False`, otherwise
/// `Unknown`. An empty input is `Unknown`.
///
/// The outcome depends only on which values occur, so it is independent of
/// input order and grouping.
pub fn reduce<I>(values: I) -> TriBool
where
    I: IntoIterator<Item = TriBool>,
{
    let mut saw_any = false;
    let mut saw_unknown = false;
    for value in values {
        saw_any = true;
        match value {
            TriBool::True => return TriBool::True,
            TriBool::Unknown => saw_unknown = true,
            TriBool::False => {}
        }
    }
    if saw_any && !saw_unknown {
        TriBool::False
    } else {
        TriBool::Unknown
    }
}

/// Reduce child results into the result of the aggregator `beacon_id`
#[must_use]
pub fn reduce_results(beacon_id: Option<BeaconId>, results: &[BeaconResult]) -> BeaconResult {
    BeaconResult {
        beacon_id,
        value: reduce(results.iter().map(|r| r.value)),
        error: None,
    }
}
