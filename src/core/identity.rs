use crate::config::ProductConfig;
use crate::types::{ProductId, So2Error, So2Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Timestamp layout used inside product identities
pub const IDENTITY_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y%m%dT%H%M%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S",
    "%Y%m%d%H%M%S",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%jT%H:%M:%S%.f",
    "%d %b %Y %H:%M:%S%.f",
    "%b %d %Y %H:%M:%S%.f",
    "%b %d, %Y %H:%M:%S%.f",
    "%d %B %Y %H:%M:%S%.f",
    "%B %d %Y %H:%M:%S%.f",
    "%B %d, %Y %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%d %b %Y", "%b %d %Y"];

/// Zone designators that mean UTC when trailing a naive date-time
const UTC_SUFFIXES: &[&str] = &["Z", "z", "UTC", "GMT"];

/// Parse any unambiguous date-time text into UTC.
///
/// Offsets are honoured and converted; text without an offset (or with a
/// trailing `Z`, `UTC` or `GMT`) is taken as UTC. A bare date means midnight.
pub fn parse_timestamp(text: &str) -> So2Result<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Ok(time.with_timezone(&Utc));
    }
    if let Ok(time) = DateTime::parse_from_rfc2822(text) {
        return Ok(time.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(text, format) {
            return Ok(time.with_timezone(&Utc));
        }
    }

    let naive_text = strip_utc_suffix(text);
    for format in NAIVE_FORMATS {
        if let Ok(time) = NaiveDateTime::parse_from_str(naive_text, format) {
            return Ok(time.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(naive_text, format) {
            if let Some(time) = date.and_hms_opt(0, 0, 0) {
                return Ok(time.and_utc());
            }
        }
    }

    Err(So2Error::InvalidTimestamp(format!(
        "could not parse '{}' as a date-time",
        text
    )))
}

fn strip_utc_suffix(text: &str) -> &str {
    UTC_SUFFIXES
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .map(str::trim_end)
        .unwrap_or(text)
}

/// `YYYYMMDDTHHMMSS` form of a timestamp; sub-second precision is dropped
pub fn format_identity_time(text: &str) -> So2Result<String> {
    Ok(parse_timestamp(text)?.format(IDENTITY_TIME_FORMAT).to_string())
}

/// `{short-name}-{start}_{end}-{version}`
pub fn derive_product_id(config: &ProductConfig, starttime: &str, endtime: &str) -> So2Result<ProductId> {
    let start = format_identity_time(starttime)?;
    let end = format_identity_time(endtime)?;
    let id = ProductId::new(format!(
        "{}-{}_{}-{}",
        config.short_name, start, end, config.version
    ));
    log::debug!("Derived product id {} from ({}, {})", id, starttime, endtime);
    Ok(id)
}
