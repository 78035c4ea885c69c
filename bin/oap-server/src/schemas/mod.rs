//! Request and response bodies for the REST API.
//!
//! Every body is camelCase on the wire. Entities convert into their
//! response shape via `to_response`.

pub mod chats;
pub mod notes;

use chrono::{DateTime, SecondsFormat, Utc};

pub(crate) fn iso(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}
