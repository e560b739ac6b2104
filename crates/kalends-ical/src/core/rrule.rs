//! iCalendar RRULE (Recurrence Rule) value type (RFC 5545 §3.3.10, §3.8.5.3).

use std::fmt;

use kalends_core::error::{CoreError, CoreResult};

use super::{Temporal, TemporalKind};

/// Recurrence frequency (RFC 5545 §3.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Self::Secondly,
            "MINUTELY" => Self::Minutely,
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    /// Converts to the chrono weekday.
    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }

    /// Converts from the chrono weekday.
    #[must_use]
    pub const fn from_chrono(wd: chrono::Weekday) -> Self {
        match wd {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday with optional occurrence number, used in BYDAY.
///
/// Examples: `MO` (every Monday), `1MO` (first Monday of the period),
/// `-1FR` (last Friday of the period).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByDay {
    /// Optional occurrence number (-53 to 53, excluding 0).
    pub ordinal: Option<i8>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl ByDay {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal.
    ///
    /// ## Panics
    ///
    /// Panics if ordinal is 0 or outside the range -53..=53.
    #[must_use]
    pub fn nth(ordinal: i8, weekday: Weekday) -> Self {
        assert!(ordinal != 0 && (-53..=53).contains(&ordinal));
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for ByDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// End condition of a recurrence rule.
///
/// RFC 5545 forbids carrying COUNT and UNTIL at the same time; a closed
/// enum makes the exclusivity structural instead of a runtime check.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecurrenceEnd {
    /// The rule never ends.
    #[default]
    Never,
    /// The rule ends after this many occurrences, the seed counting as
    /// occurrence 1.
    Count(u32),
    /// The rule ends at this boundary, inclusive.
    Until(Temporal),
}

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
///
/// Defines the repetition pattern for an event, todo, or journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Recurrence frequency.
    pub freq: Frequency,

    /// Recurrence interval in units of `freq` (default 1).
    pub interval: u32,

    /// End condition (default: never).
    pub end: RecurrenceEnd,

    /// Week start day (default: Monday).
    pub wkst: Weekday,

    /// By-second list (0-60, 60 for leap second).
    pub by_second: Vec<u8>,

    /// By-minute list (0-59).
    pub by_minute: Vec<u8>,

    /// By-hour list (0-23).
    pub by_hour: Vec<u8>,

    /// By-day list with optional occurrence numbers.
    pub by_day: Vec<ByDay>,

    /// By-monthday list (-31 to 31, excluding 0).
    pub by_monthday: Vec<i8>,

    /// By-yearday list (-366 to 366, excluding 0).
    pub by_yearday: Vec<i16>,

    /// By-weekno list (-53 to 53, excluding 0, ISO 8601).
    pub by_weekno: Vec<i8>,

    /// By-month list (1-12).
    pub by_month: Vec<u8>,

    /// By-setpos list (-366 to 366, excluding 0).
    /// Selects positions within the candidate set of each period.
    pub by_setpos: Vec<i16>,
}

impl RecurrenceRule {
    /// Creates a rule with the given frequency and defaults everywhere else.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            end: RecurrenceEnd::Never,
            wkst: Weekday::Monday,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_day: Vec::new(),
            by_monthday: Vec::new(),
            by_yearday: Vec::new(),
            by_weekno: Vec::new(),
            by_month: Vec::new(),
            by_setpos: Vec::new(),
        }
    }

    /// Creates a daily recurrence rule.
    #[must_use]
    pub const fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    /// Creates a weekly recurrence rule.
    #[must_use]
    pub const fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    /// Creates a monthly recurrence rule.
    #[must_use]
    pub const fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    /// Creates a yearly recurrence rule.
    #[must_use]
    pub const fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Ends the rule after `count` occurrences.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.end = RecurrenceEnd::Count(count);
        self
    }

    /// Ends the rule at the given boundary (inclusive).
    #[must_use]
    pub fn with_until(mut self, until: Temporal) -> Self {
        self.end = RecurrenceEnd::Until(until);
        self
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<ByDay>) -> Self {
        self.by_day = days;
        self
    }

    /// Sets the by-monthday list.
    #[must_use]
    pub fn with_by_monthday(mut self, days: Vec<i8>) -> Self {
        self.by_monthday = days;
        self
    }

    /// Sets the by-month list.
    #[must_use]
    pub fn with_by_month(mut self, months: Vec<u8>) -> Self {
        self.by_month = months;
        self
    }

    /// Sets the by-setpos list.
    #[must_use]
    pub fn with_by_setpos(mut self, positions: Vec<i16>) -> Self {
        self.by_setpos = positions;
        self
    }

    /// Sets the week start day.
    #[must_use]
    pub fn with_wkst(mut self, wkst: Weekday) -> Self {
        self.wkst = wkst;
        self
    }

    /// Returns whether the rule ever terminates on its own.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        !matches!(self.end, RecurrenceEnd::Never)
    }

    /// Checks the rule against RFC 5545 constraints and the seed's
    /// temporal category.
    ///
    /// ## Errors
    ///
    /// Returns a validation error when the interval or count is zero, a
    /// BYDAY ordinal appears outside MONTHLY/YEARLY frequency, BYSETPOS is
    /// given without any other by-rule, or the UNTIL boundary's category
    /// does not match the seed's.
    pub fn validate(&self, seed_kind: TemporalKind) -> CoreResult<()> {
        if self.interval < 1 {
            return Err(CoreError::ValidationError(
                "RRULE INTERVAL must be at least 1".to_string(),
            ));
        }

        match &self.end {
            RecurrenceEnd::Count(0) => {
                return Err(CoreError::ValidationError(
                    "RRULE COUNT must be at least 1".to_string(),
                ));
            }
            RecurrenceEnd::Until(until) if !until.kind().same_category(seed_kind) => {
                return Err(CoreError::ValidationError(format!(
                    "RRULE UNTIL is {} but DTSTART is {}",
                    until.kind(),
                    seed_kind
                )));
            }
            _ => {}
        }

        let ordinals_allowed = matches!(self.freq, Frequency::Monthly | Frequency::Yearly);
        if !ordinals_allowed && self.by_day.iter().any(|d| d.ordinal.is_some()) {
            return Err(CoreError::ValidationError(format!(
                "BYDAY ordinals are only valid for MONTHLY or YEARLY rules, not {}",
                self.freq
            )));
        }

        if !self.by_setpos.is_empty() && !self.has_refining_by_rule() {
            return Err(CoreError::ValidationError(
                "BYSETPOS requires at least one other by-rule".to_string(),
            ));
        }

        if self.by_setpos.contains(&0)
            || self.by_monthday.contains(&0)
            || self.by_yearday.contains(&0)
            || self.by_weekno.contains(&0)
        {
            return Err(CoreError::ValidationError(
                "by-rule ordinals must not be zero".to_string(),
            ));
        }

        Ok(())
    }

    fn has_refining_by_rule(&self) -> bool {
        !(self.by_second.is_empty()
            && self.by_minute.is_empty()
            && self.by_hour.is_empty()
            && self.by_day.is_empty()
            && self.by_monthday.is_empty()
            && self.by_yearday.is_empty()
            && self.by_weekno.is_empty()
            && self.by_month.is_empty())
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![format!("FREQ={}", self.freq)];

        if self.interval != 1 {
            parts.push(format!("INTERVAL={}", self.interval));
        }

        match &self.end {
            RecurrenceEnd::Never => {}
            RecurrenceEnd::Count(n) => parts.push(format!("COUNT={n}")),
            RecurrenceEnd::Until(until) => parts.push(format!("UNTIL={until}")),
        }

        if self.wkst != Weekday::Monday {
            parts.push(format!("WKST={}", self.wkst));
        }

        push_list(&mut parts, "BYSECOND", &self.by_second);
        push_list(&mut parts, "BYMINUTE", &self.by_minute);
        push_list(&mut parts, "BYHOUR", &self.by_hour);
        push_list(&mut parts, "BYDAY", &self.by_day);
        push_list(&mut parts, "BYMONTHDAY", &self.by_monthday);
        push_list(&mut parts, "BYYEARDAY", &self.by_yearday);
        push_list(&mut parts, "BYWEEKNO", &self.by_weekno);
        push_list(&mut parts, "BYMONTH", &self.by_month);
        push_list(&mut parts, "BYSETPOS", &self.by_setpos);

        write!(f, "{}", parts.join(";"))
    }
}

fn push_list<T: ToString>(parts: &mut Vec<String>, key: &str, values: &[T]) {
    if !values.is_empty() {
        let joined: Vec<String> = values.iter().map(ToString::to_string).collect();
        parts.push(format!("{key}={}", joined.join(",")));
    }
}
