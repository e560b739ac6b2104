//! iCalendar DATE and DATE-TIME values (RFC 5545 §3.3.4, §3.3.5).

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Category tag of a [`Temporal`] value.
///
/// DTSTART, DTEND, UNTIL and EXDATE values of one component must share a
/// category (date-only vs date-time); the engine checks this with
/// [`Temporal::kind`] and [`TemporalKind::same_category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    /// Whole-day value (`20151109`).
    Date,
    /// Floating local time (`20151109T100000`).
    Floating,
    /// Local time with TZID reference.
    Zoned,
    /// Absolute instant (`20151109T100000Z`).
    Utc,
}

impl TemporalKind {
    /// Returns whether two kinds share the date-only vs date-time category.
    #[must_use]
    pub const fn same_category(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Date, Self::Date)
                | (
                    Self::Floating | Self::Zoned | Self::Utc,
                    Self::Floating | Self::Zoned | Self::Utc
                )
        )
    }
}

impl fmt::Display for TemporalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Date => "DATE",
            Self::Floating => "DATE-TIME (floating)",
            Self::Zoned => "DATE-TIME (zoned)",
            Self::Utc => "DATE-TIME (UTC)",
        };
        write!(f, "{name}")
    }
}

/// A point on the calendar: either a whole day or a date-time in one of the
/// three RFC 5545 forms (floating, zoned, UTC).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temporal {
    /// DATE value - a whole day without time component.
    Date(NaiveDate),
    /// Floating DATE-TIME - same wall-clock time in any timezone.
    Floating(NaiveDateTime),
    /// Zoned DATE-TIME - local time interpreted in the referenced timezone.
    Zoned {
        datetime: NaiveDateTime,
        /// The IANA timezone identifier carried as a TZID parameter.
        tzid: String,
    },
    /// UTC DATE-TIME - absolute instant, rendered with a 'Z' suffix.
    Utc(DateTime<Utc>),
}

impl Temporal {
    /// Creates a whole-day value.
    #[must_use]
    pub const fn date(d: NaiveDate) -> Self {
        Self::Date(d)
    }

    /// Creates a floating date-time.
    #[must_use]
    pub const fn floating(dt: NaiveDateTime) -> Self {
        Self::Floating(dt)
    }

    /// Creates a zoned date-time.
    #[must_use]
    pub fn zoned(dt: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self::Zoned {
            datetime: dt,
            tzid: tzid.into(),
        }
    }

    /// Creates a UTC date-time.
    #[must_use]
    pub const fn utc(dt: DateTime<Utc>) -> Self {
        Self::Utc(dt)
    }

    /// Returns the category/form tag of this value.
    #[must_use]
    pub const fn kind(&self) -> TemporalKind {
        match self {
            Self::Date(_) => TemporalKind::Date,
            Self::Floating(_) => TemporalKind::Floating,
            Self::Zoned { .. } => TemporalKind::Zoned,
            Self::Utc(_) => TemporalKind::Utc,
        }
    }

    /// Returns whether this is a whole-day value.
    #[must_use]
    pub const fn is_whole_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Returns the timezone ID if this is a zoned value.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Zoned { tzid, .. } => Some(tzid),
            _ => None,
        }
    }

    /// Returns the civil (wall-clock) date-time; whole days map to midnight.
    #[must_use]
    pub fn civil(&self) -> NaiveDateTime {
        match self {
            Self::Date(d) => d.and_time(NaiveTime::MIN),
            Self::Floating(dt) | Self::Zoned { datetime: dt, .. } => *dt,
            Self::Utc(dt) => dt.naive_utc(),
        }
    }

    /// Rebuilds a value of the same form around a new civil date-time.
    ///
    /// Whole-day values keep only the date part.
    #[must_use]
    pub fn with_civil(&self, civil: NaiveDateTime) -> Self {
        match self {
            Self::Date(_) => Self::Date(civil.date()),
            Self::Floating(_) => Self::Floating(civil),
            Self::Zoned { tzid, .. } => Self::Zoned {
                datetime: civil,
                tzid: tzid.clone(),
            },
            Self::Utc(_) => Self::Utc(Utc.from_utc_datetime(&civil)),
        }
    }

    /// Shifts this value by a signed number of seconds.
    ///
    /// Whole-day values only move in whole days; sub-day remainders are
    /// discarded.
    #[must_use]
    pub fn plus_seconds(&self, seconds: i64) -> Self {
        match self {
            Self::Date(d) => {
                let days = seconds.div_euclid(86_400);
                Self::Date(*d + chrono::Duration::days(days))
            }
            _ => self.with_civil(self.civil() + chrono::Duration::seconds(seconds)),
        }
    }

    /// Shifts this value by a signed number of days.
    #[must_use]
    pub fn plus_days(&self, days: i64) -> Self {
        match self {
            Self::Date(d) => Self::Date(*d + chrono::Duration::days(days)),
            _ => self.with_civil(self.civil() + chrono::Duration::days(days)),
        }
    }

    /// Signed civil difference `other - self` in seconds.
    ///
    /// Both values are read on their own wall clocks; the caller is
    /// responsible for only differencing values of the same category
    /// (enforced upstream by component validation).
    #[must_use]
    pub fn seconds_until(&self, other: &Self) -> i64 {
        (other.civil() - self.civil()).num_seconds()
    }

    /// Returns whether two values name the same occurrence start after
    /// normalizing to a common tag.
    ///
    /// Used for EXDATE and RECURRENCE-ID matching, where clients routinely
    /// mix floating and zoned renderings of the same wall-clock instant.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.kind().same_category(other.kind()) && self.civil() == other.civil()
    }

    /// Best-effort conversion of this value into the wall clock of the
    /// given timezone. `None` when the TZID is unknown.
    #[must_use]
    pub fn civil_in_zone(&self, tzid: &str) -> Option<NaiveDateTime> {
        let tz: chrono_tz::Tz = tzid.parse().ok()?;
        match self {
            Self::Utc(dt) => Some(dt.with_timezone(&tz).naive_local()),
            _ => Some(self.civil()),
        }
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y%m%d")),
            Self::Floating(dt) | Self::Zoned { datetime: dt, .. } => {
                write!(f, "{}", dt.format("%Y%m%dT%H%M%S"))
            }
            Self::Utc(dt) => write!(f, "{}", dt.format("%Y%m%dT%H%M%SZ")),
        }
    }
}

impl PartialOrd for Temporal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Temporal {
    /// Orders by civil value first. Within one series every value shares a
    /// form, so civil ordering is instant ordering there; ties across forms
    /// fall back to the form tag and TZID for a total order.
    fn cmp(&self, other: &Self) -> Ordering {
        self.civil()
            .cmp(&other.civil())
            .then_with(|| kind_rank(self).cmp(&kind_rank(other)))
            .then_with(|| self.tzid().unwrap_or("").cmp(other.tzid().unwrap_or("")))
    }
}

const fn kind_rank(t: &Temporal) -> u8 {
    match t.kind() {
        TemporalKind::Date => 0,
        TemporalKind::Floating => 1,
        TemporalKind::Zoned => 2,
        TemporalKind::Utc => 3,
    }
}
