pub mod actor;
pub mod budget;
pub mod contract;
pub mod event;
pub mod milestone;
pub mod payment;
pub mod stats;
pub mod webhook;
pub mod work_request;

use crate::domain::value_objects::timestamps::Timestamp;
use time::format_description::well_known::Rfc3339;

/// Timestamps cross the wire as RFC 3339 strings.
pub(crate) fn rfc3339(ts: Timestamp) -> String {
    ts.as_inner().format(&Rfc3339).unwrap_or_default()
}

pub(crate) fn rfc3339_opt(ts: Option<Timestamp>) -> Option<String> {
    ts.map(rfc3339)
}
