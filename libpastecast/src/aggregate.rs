//! Reduction of per-platform outcomes into a summary

use crate::types::{PublishOutcome, PublishSummary};

/// Build a summary from outcomes already in presentation order
///
/// Pure: no I/O, the outcomes are moved in untouched.
pub fn aggregate(results: Vec<PublishOutcome>) -> PublishSummary {
    let successful = results.iter().filter(|r| r.success).count();
    let total = results.len();

    PublishSummary {
        results,
        successful,
        total,
    }
}
