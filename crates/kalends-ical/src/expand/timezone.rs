//! Timezone resolution and UTC conversion for iCalendar date-times.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, TimeZone, Utc};
use chrono_tz::Tz;

use crate::core::Temporal;

/// Error during timezone resolution or conversion.
#[derive(Debug, thiserror::Error)]
pub enum TimezoneError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Invalid datetime.
    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),
}

/// Resolver for timezone identifiers.
///
/// Maintains a cache of resolved timezones. TZIDs from other calendar
/// software frequently use vendor aliases; those are normalized to IANA
/// names before lookup.
#[derive(Debug, Default)]
pub struct TzResolver {
    /// Cache of resolved timezones by TZID.
    cache: HashMap<String, Tz>,
}

impl TzResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// ## Errors
    ///
    /// Returns `TimezoneError::UnknownTimezone` if the TZID cannot be
    /// resolved to an IANA timezone.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, TimezoneError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid);
        let tz = Tz::from_str(&normalized)
            .map_err(|_| TimezoneError::UnknownTimezone(tzid.to_string()))?;

        self.cache.insert(tzid.to_string(), tz);
        Ok(tz)
    }

    /// Converts a temporal value to the UTC instant it names.
    ///
    /// Whole days convert as their midnight; DST gaps shift forward by an
    /// hour, DST folds take the earlier offset.
    ///
    /// ## Errors
    ///
    /// Returns an error when a zoned value references an unknown TZID.
    pub fn to_utc(&mut self, t: &Temporal) -> Result<DateTime<Utc>, TimezoneError> {
        match t {
            Temporal::Utc(dt) => Ok(*dt),
            Temporal::Date(_) | Temporal::Floating(_) => {
                Ok(Utc.from_utc_datetime(&t.civil()))
            }
            Temporal::Zoned { datetime, tzid } => {
                let tz = self.resolve(tzid)?;
                match tz.from_local_datetime(datetime) {
                    LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
                    // DST fold: take the earlier of the two instants.
                    LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
                    // DST gap: the wall-clock time does not exist; shift
                    // forward an hour like most calendar clients.
                    LocalResult::None => {
                        let shifted = *datetime + chrono::Duration::hours(1);
                        match tz.from_local_datetime(&shifted) {
                            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => {
                                Ok(dt.with_timezone(&Utc))
                            }
                            LocalResult::None => Err(TimezoneError::InvalidDateTime(format!(
                                "{datetime} in timezone {tzid}"
                            ))),
                        }
                    }
                }
            }
        }
    }
}

/// Normalizes common vendor timezone identifiers to IANA names.
fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    // Windows display names common in Outlook exports.
    match stripped {
        "Eastern Standard Time" => "America/New_York".to_string(),
        "Central Standard Time" => "America/Chicago".to_string(),
        "Mountain Standard Time" => "America/Denver".to_string(),
        "Pacific Standard Time" => "America/Los_Angeles".to_string(),
        "GMT Standard Time" => "Europe/London".to_string(),
        "W. Europe Standard Time" => "Europe/Berlin".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn civil(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn resolve_iana() {
        let mut resolver = TzResolver::new();
        assert!(resolver.resolve("America/New_York").is_ok());
        assert!(resolver.resolve("Not/AZone").is_err());
    }

    #[test]
    fn resolve_windows_alias() {
        let mut resolver = TzResolver::new();
        let tz = resolver.resolve("Eastern Standard Time").unwrap();
        assert_eq!(tz, chrono_tz::America::New_York);
    }

    #[test]
    fn to_utc_zoned() {
        let mut resolver = TzResolver::new();
        // EST is UTC-5 in November.
        let t = Temporal::zoned(civil(2015, 11, 9, 10, 0, 0), "America/New_York");
        let utc = resolver.to_utc(&t).unwrap();
        assert_eq!(utc.naive_utc(), civil(2015, 11, 9, 15, 0, 0));
    }

    #[test]
    fn to_utc_floating_and_date() {
        let mut resolver = TzResolver::new();
        let t = Temporal::floating(civil(2015, 11, 9, 10, 0, 0));
        assert_eq!(resolver.to_utc(&t).unwrap().naive_utc(), civil(2015, 11, 9, 10, 0, 0));

        let d = Temporal::date(NaiveDate::from_ymd_opt(2015, 11, 9).unwrap());
        assert_eq!(resolver.to_utc(&d).unwrap().naive_utc(), civil(2015, 11, 9, 0, 0, 0));
    }

    #[test]
    fn to_utc_dst_gap_shifts_forward() {
        let mut resolver = TzResolver::new();
        // 2016-03-13 02:30 does not exist in New York (spring forward).
        let t = Temporal::zoned(civil(2016, 3, 13, 2, 30, 0), "America/New_York");
        let utc = resolver.to_utc(&t).unwrap();
        // Shifted to 03:30 EDT = 07:30 UTC.
        assert_eq!(utc.naive_utc(), civil(2016, 3, 13, 7, 30, 0));
    }
}
