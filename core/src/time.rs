//! Time related utils.

use chrono::{NaiveDateTime, Utc};

use crate::{Error, Result};

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

const DATE: &str = "%Y%m%d";
const ISO8601: &str = "%Y%m%dT%H%M%SZ";

/// Current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format(DATE).to_string()
}

/// Format time into ISO 8601 basic format: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format(ISO8601).to_string()
}

/// Parse an ISO 8601 basic timestamp such as `20220313T072004Z`.
pub fn parse_iso8601(s: &str) -> Result<DateTime> {
    let t = NaiveDateTime::parse_from_str(s, ISO8601).map_err(|e| {
        Error::request_invalid(format!("parse '{s}' into iso8601 basic format failed"))
            .with_source(e)
    })?;
    Ok(t.and_utc())
}

/// Parse an RFC 3339 timestamp such as `2006-02-03T16:45:09.000Z`.
pub fn parse_rfc3339(s: &str) -> Result<DateTime> {
    let t = chrono::DateTime::parse_from_rfc3339(s).map_err(|e| {
        Error::response_invalid(format!("parse '{s}' into rfc3339 failed")).with_source(e)
    })?;
    Ok(t.with_timezone(&Utc))
}
